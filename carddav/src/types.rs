// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

/// Resource href (path).
///
/// A `Href` represents the path to a resource on a `CardDAV` server,
/// such as `/addressbooks/user/contacts/alice.vcf`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Href(String);

impl Href {
    /// Creates a new `Href` from a string.
    #[must_use]
    pub const fn new(href: String) -> Self {
        Self(href)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last non-empty path segment, percent-decoded, i.e. the
    /// resource file name. A segment that doesn't decode to UTF-8 is
    /// returned as is.
    #[must_use]
    pub fn file_name(&self) -> Cow<'_, str> {
        let segment = self
            .0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
    }

    /// Whether both hrefs point at the same path, ignoring a trailing slash.
    #[must_use]
    pub fn same_path(&self, other: &str) -> bool {
        self.0.trim_end_matches('/') == other.trim_end_matches('/')
    }
}

impl Deref for Href {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Href {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Href {
    fn from(href: String) -> Self {
        Self(href)
    }
}

impl From<&str> for Href {
    fn from(href: &str) -> Self {
        Self(href.to_string())
    }
}

/// Entity tag for change detection.
///
/// An `ETag` represents an entity tag returned by the `CardDAV` server,
/// used for optimistic concurrency control and change detection. Weak
/// validators (`W/"..."`) are kept verbatim; tags are only ever compared
/// for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag(String);

impl ETag {
    /// Creates a new `ETag` from a string.
    #[must_use]
    pub const fn new(etag: String) -> Self {
        Self(etag)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the tag and returns the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for ETag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ETag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ETag {
    fn from(etag: &str) -> Self {
        Self(etag.to_string())
    }
}

/// A media type advertised in `supported-address-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDataType {
    /// Content type, e.g. `text/vcard`.
    pub content_type: String,
    /// vCard version, e.g. `3.0` or `4.0`.
    pub version: Option<String>,
}

impl AddressDataType {
    /// Whether this entry advertises `text/vcard; version=4.0`.
    #[must_use]
    pub fn is_vcard4(&self) -> bool {
        self.content_type.eq_ignore_ascii_case("text/vcard")
            && self
                .version
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case("4.0"))
    }
}

/// Address book collection properties.
#[derive(Debug, Clone)]
pub struct AddressBookCollection {
    /// Collection href.
    pub href: Href,
    /// Display name.
    pub display_name: Option<String>,
    /// Collection tag, changes whenever any member changes.
    pub ctag: Option<String>,
    /// Media types the server accepts and serves.
    pub supported_address_data: Vec<AddressDataType>,
}

impl AddressBookCollection {
    /// Creates a new collection with only the href set.
    #[must_use]
    pub const fn new(href: Href) -> Self {
        Self {
            href,
            display_name: None,
            ctag: None,
            supported_address_data: Vec::new(),
        }
    }

    /// Whether the server advertises vCard 4.0 support.
    #[must_use]
    pub fn supports_vcard4(&self) -> bool {
        self.supported_address_data
            .iter()
            .any(AddressDataType::is_vcard4)
    }
}

/// An address object (vCard resource) as reported by the server.
///
/// Depending on the request, only some fields are populated: a listing
/// carries the `ETag` only, a multiget also carries the address data.
#[derive(Debug, Clone)]
pub struct AddressObject {
    /// Resource href.
    pub href: Href,
    /// Entity tag, if the server returned one.
    pub etag: Option<ETag>,
    /// `getcontenttype`, or the `Content-Type` header for plain GETs.
    pub content_type: Option<String>,
    /// Raw vCard payload.
    pub address_data: Option<Vec<u8>>,
}

impl AddressObject {
    /// Creates a new address object with only the href set.
    #[must_use]
    pub const fn new(href: Href) -> Self {
        Self {
            href,
            etag: None,
            content_type: None,
            address_data: None,
        }
    }
}
