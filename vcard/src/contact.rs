// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// vCard format version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Version {
    /// vCard 3.0 (RFC 2426).
    #[default]
    V3_0,
    /// vCard 4.0 (RFC 6350).
    V4_0,
}

impl Version {
    /// Returns the value of the `VERSION` property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3_0 => "3.0",
            Self::V4_0 => "4.0",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single contact (one `BEGIN:VCARD` ... `END:VCARD` block).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Contact {
    /// `UID`
    pub uid: Option<String>,
    /// `FN`
    pub formatted_name: Option<String>,
    /// `N`
    pub name: Option<StructuredName>,
    /// `NICKNAME`
    pub nickname: Option<String>,
    /// `ORG`, one entry per organizational unit.
    pub organization: Vec<String>,
    /// `TITLE`
    pub title: Option<String>,
    /// `EMAIL`
    pub emails: Vec<TypedValue>,
    /// `TEL`
    pub phones: Vec<TypedValue>,
    /// `NOTE`
    pub note: Option<String>,
    /// `PHOTO`
    pub photo: Option<Photo>,
    /// Unfolded content lines of all properties not modelled above.
    pub unknown_properties: Vec<String>,
}

impl Contact {
    /// Creates a contact with only a formatted name.
    #[must_use]
    pub fn with_name(formatted_name: impl Into<String>) -> Self {
        Self {
            formatted_name: Some(formatted_name.into()),
            ..Default::default()
        }
    }

    /// Returns a human readable name, falling back to the structured name.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.formatted_name.clone().or_else(|| {
            self.name.as_ref().map(|n| {
                [n.prefix.as_str(), n.given.as_str(), n.family.as_str()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
        })
    }
}

/// Structured name (`N`).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StructuredName {
    /// Family name.
    pub family: String,
    /// Given name.
    pub given: String,
    /// Additional names.
    pub additional: String,
    /// Honorific prefixes.
    pub prefix: String,
    /// Honorific suffixes.
    pub suffix: String,
}

/// A value with `TYPE` parameters, used by `EMAIL` and `TEL`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TypedValue {
    /// The value.
    pub value: String,
    /// Lowercased `TYPE` parameter values, e.g. `home`, `cell`.
    pub types: Vec<String>,
}

impl TypedValue {
    /// Creates a value without types.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            types: Vec::new(),
        }
    }
}

/// Contact photo.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Photo {
    /// Binary data embedded in the vCard.
    Inline {
        /// Media type such as `image/jpeg`, if known.
        media_type: Option<String>,
        /// Raw image bytes.
        data: Vec<u8>,
    },
    /// Reference to an external resource.
    Uri(String),
}
