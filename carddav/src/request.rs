// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request builders for `CardDAV` operations.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::CardDavError;
use crate::xml::{finish, new_writer, ns, write_empty_pair};

/// PROPFIND request builder.
#[derive(Debug)]
pub struct PropFindRequest {
    props: Vec<Prop>,
}

/// Properties to request in PROPFIND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    /// Display name.
    DisplayName,
    /// Resource type.
    ResourceType,
    /// `ETag`.
    GetETag,
    /// Content type.
    GetContentType,
    /// Collection tag.
    GetCTag,
    /// Media types supported by an address book.
    SupportedAddressData,
}

impl Prop {
    fn qualified_name(self) -> &'static str {
        match self {
            Self::DisplayName => "D:displayname",
            Self::ResourceType => "D:resourcetype",
            Self::GetETag => "D:getetag",
            Self::GetContentType => "D:getcontenttype",
            Self::GetCTag => "CS:getctag",
            Self::SupportedAddressData => "CARD:supported-address-data",
        }
    }
}

impl PropFindRequest {
    /// Creates a new PROPFIND request.
    #[must_use]
    pub fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// Adds a property to the request.
    pub fn add_property(&mut self, prop: Prop) -> &mut Self {
        self.props.push(prop);
        self
    }

    /// Builds the XML body for the PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CardDavError> {
        let mut writer = new_writer();

        // <D:propfind xmlns:D="DAV:" ...>
        let mut propfind = BytesStart::new("D:propfind");
        propfind.push_attribute(("xmlns:D", ns::DAV));
        if self.props.contains(&Prop::SupportedAddressData) {
            propfind.push_attribute(("xmlns:CARD", ns::CARDDAV));
        }
        if self.props.contains(&Prop::GetCTag) {
            propfind.push_attribute(("xmlns:CS", ns::CALENDARSERVER));
        }
        writer.write_event(Event::Start(propfind))?;

        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        for prop in &self.props {
            write_empty_pair(&mut writer, prop.qualified_name())?;
        }
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;
        finish(writer)
    }
}

impl Default for PropFindRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Address book multiget request builder (RFC 6352 §8.7).
#[derive(Debug)]
pub struct AddressBookMultiGetRequest {
    hrefs: Vec<String>,
    vcard4: bool,
}

impl AddressBookMultiGetRequest {
    /// Creates a new address book multiget request.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hrefs: Vec::new(),
            vcard4: false,
        }
    }

    /// Asks the server to return vCard 4.0 address data.
    pub fn vcard4(&mut self, vcard4: bool) -> &mut Self {
        self.vcard4 = vcard4;
        self
    }

    /// Adds an href to the request.
    pub fn add_href(&mut self, href: String) -> &mut Self {
        self.hrefs.push(href);
        self
    }

    /// Builds the XML body for the address book multiget request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CardDavError> {
        let mut writer = new_writer();

        // <CARD:addressbook-multiget xmlns:D="DAV:" xmlns:CARD="urn:ietf:params:xml:ns:carddav">
        let mut multiget = BytesStart::new("CARD:addressbook-multiget");
        multiget.push_attribute(("xmlns:D", ns::DAV));
        multiget.push_attribute(("xmlns:CARD", ns::CARDDAV));
        writer.write_event(Event::Start(multiget))?;

        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        write_empty_pair(&mut writer, "D:getcontenttype")?;
        write_empty_pair(&mut writer, "D:getetag")?;
        if self.vcard4 {
            let mut address_data = BytesStart::new("CARD:address-data");
            address_data.push_attribute(("content-type", "text/vcard"));
            address_data.push_attribute(("version", "4.0"));
            writer.write_event(Event::Empty(address_data))?;
        } else {
            write_empty_pair(&mut writer, "CARD:address-data")?;
        }
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

        for href in &self.hrefs {
            writer.write_event(Event::Start(BytesStart::new("D:href")))?;
            writer.write_event(Event::Text(BytesText::new(href.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("D:href")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("CARD:addressbook-multiget")))?;
        finish(writer)
    }
}

impl Default for AddressBookMultiGetRequest {
    fn default() -> Self {
        Self::new()
    }
}
