// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsers for WebDAV/CardDAV operations.

use quick_xml::events::{BytesStart, Event};

use crate::error::CardDavError;
use crate::types::{AddressBookCollection, AddressDataType, AddressObject, ETag, Href};
use crate::xml::read_element_text;

/// `WebDAV` multistatus response.
#[derive(Debug, Clone)]
pub struct MultiStatusResponse {
    /// The response items.
    pub responses: Vec<ResponseItem>,
}

/// Individual response in multistatus.
#[derive(Debug, Clone)]
pub struct ResponseItem {
    /// Resource href.
    pub href: Href,
    /// Property stats.
    pub prop_stats: Vec<PropStat>,
    /// Response-level status, used by servers for missing resources.
    pub status: Option<String>,
}

/// Property stat with status and value.
#[derive(Debug, Clone)]
pub struct PropStat {
    /// Properties reported under `status`.
    pub props: Properties,
    /// Status line, e.g. `HTTP/1.1 200 OK`.
    pub status: String,
}

/// WebDAV/CardDAV properties.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// `displayname`
    pub display_name: Option<String>,
    /// `getetag`
    pub get_etag: Option<ETag>,
    /// `getctag`
    pub get_ctag: Option<String>,
    /// `getcontenttype`
    pub get_content_type: Option<String>,
    /// `address-data`
    pub address_data: Option<String>,
    /// `supported-address-data`
    pub supported_address_data: Option<Vec<AddressDataType>>,
    /// Whether `resourcetype` contains `collection`.
    pub is_collection: bool,
    /// Whether `resourcetype` contains `addressbook`.
    pub is_addressbook: bool,
}

impl MultiStatusResponse {
    /// Parses multistatus response from XML.
    ///
    /// # Errors
    ///
    /// Returns an error if XML parsing fails.
    pub fn from_xml(xml: &str) -> Result<Self, CardDavError> {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = true;

        let mut responses = Vec::new();
        let mut current_response: Option<ResponseItem> = None;
        let mut current_props = Properties::default();
        let mut in_propstat = false;
        let mut in_prop = false;

        loop {
            match reader.read_event()? {
                Event::Eof => break,

                Event::Start(ref e) => match e.name().local_name().into_inner() {
                    b"response" => {
                        current_response = Some(ResponseItem {
                            href: Href::new(String::new()),
                            prop_stats: Vec::new(),
                            status: None,
                        });
                    }
                    b"href" if current_response.is_some() && !in_propstat => {
                        let href = read_element_text(&mut reader, e)?;
                        if let Some(ref mut resp) = current_response {
                            resp.href = Href::new(href);
                        }
                    }
                    b"propstat" if current_response.is_some() => {
                        in_propstat = true;
                        current_props = Properties::default();
                    }
                    b"prop" if in_propstat => in_prop = true,

                    b"displayname" if in_prop => {
                        current_props.display_name = Some(read_element_text(&mut reader, e)?);
                    }
                    b"getetag" if in_prop => {
                        let etag = read_element_text(&mut reader, e)?;
                        current_props.get_etag = (!etag.is_empty()).then(|| ETag::new(etag));
                    }
                    b"getctag" if in_prop => {
                        let ctag = read_element_text(&mut reader, e)?;
                        current_props.get_ctag = (!ctag.is_empty()).then_some(ctag);
                    }
                    b"getcontenttype" if in_prop => {
                        current_props.get_content_type = Some(read_element_text(&mut reader, e)?);
                    }
                    b"address-data" if in_prop => {
                        current_props.address_data = Some(read_element_text(&mut reader, e)?);
                    }
                    b"resourcetype" if in_prop => {
                        read_resource_type(&mut reader, &mut current_props)?;
                    }
                    b"supported-address-data" if in_prop => {
                        current_props.supported_address_data =
                            Some(read_supported_address_data(&mut reader)?);
                    }
                    b"status" if in_propstat => {
                        let status = read_element_text(&mut reader, e)?;
                        if let Some(ref mut resp) = current_response {
                            resp.prop_stats.push(PropStat {
                                props: std::mem::take(&mut current_props),
                                status,
                            });
                        }
                    }
                    b"status" if current_response.is_some() => {
                        let status = read_element_text(&mut reader, e)?;
                        if let Some(ref mut resp) = current_response {
                            resp.status = Some(status);
                        }
                    }
                    _ => {}
                },

                Event::End(ref e) => match e.name().local_name().into_inner() {
                    b"response" => {
                        if let Some(resp) = current_response.take() {
                            responses.push(resp);
                        }
                    }
                    b"propstat" => in_propstat = false,
                    b"prop" => in_prop = false,
                    _ => {}
                },

                _ => {}
            }
        }

        Ok(Self { responses })
    }

    /// Converts the response for `collection_href` into collection properties.
    ///
    /// Falls back to the first response if no href matches exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the response is empty.
    pub fn into_collection(
        self,
        collection_href: &Href,
    ) -> Result<AddressBookCollection, CardDavError> {
        let position = self
            .responses
            .iter()
            .position(|r| r.href.same_path(collection_href))
            .unwrap_or(0);

        let response = self
            .responses
            .into_iter()
            .nth(position)
            .ok_or_else(|| CardDavError::InvalidResponse("Empty multistatus".to_string()))?;

        let mut collection = AddressBookCollection::new(response.href.clone());
        for props in successful_props(&response) {
            if props.display_name.is_some() {
                collection.display_name.clone_from(&props.display_name);
            }
            if props.get_ctag.is_some() {
                collection.ctag.clone_from(&props.get_ctag);
            }
            if let Some(types) = &props.supported_address_data {
                collection.supported_address_data.clone_from(types);
            }
        }
        Ok(collection)
    }

    /// Converts the multistatus response into address objects.
    ///
    /// The collection itself, sub-collections and responses with a failed
    /// response-level status (e.g. a multiget member that vanished) are
    /// skipped.
    #[must_use]
    pub fn into_objects(self, collection_href: &Href) -> Vec<AddressObject> {
        let mut objects = Vec::new();

        for response in self.responses {
            if response.href.same_path(collection_href) {
                continue;
            }

            if let Some(status) = &response.status
                && !is_success_status(status)
            {
                tracing::warn!(href = %response.href, status, "skipping failed response");
                continue;
            }

            let mut object = AddressObject::new(response.href.clone());
            let mut is_collection = false;
            for props in successful_props(&response) {
                is_collection |= props.is_collection;
                if props.get_etag.is_some() {
                    object.etag.clone_from(&props.get_etag);
                }
                if props.get_content_type.is_some() {
                    object.content_type.clone_from(&props.get_content_type);
                }
                if let Some(data) = &props.address_data {
                    object.address_data = Some(data.as_bytes().to_vec());
                }
            }

            if is_collection {
                tracing::debug!(href = %response.href, "skipping sub-collection");
                continue;
            }
            objects.push(object);
        }

        objects
    }
}

fn successful_props(response: &ResponseItem) -> impl Iterator<Item = &Properties> {
    response
        .prop_stats
        .iter()
        .filter(|p| is_success_status(&p.status))
        .map(|p| &p.props)
}

/// Checks an HTTP status line such as `HTTP/1.1 200 OK` for a 2xx code.
fn is_success_status(status: &str) -> bool {
    status
        .split_whitespace()
        .nth(1)
        .is_some_and(|code| code.starts_with('2'))
}

fn read_resource_type(
    reader: &mut quick_xml::Reader<&[u8]>,
    props: &mut Properties,
) -> Result<(), CardDavError> {
    loop {
        match reader.read_event()? {
            Event::End(ref e) if e.name().local_name().into_inner() == b"resourcetype" => {
                return Ok(());
            }
            Event::Start(ref e) | Event::Empty(ref e) => {
                match e.name().local_name().into_inner() {
                    b"collection" => props.is_collection = true,
                    b"addressbook" => props.is_addressbook = true,
                    _ => {}
                }
            }
            Event::Eof => return Err(CardDavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
    }
}

fn read_supported_address_data(
    reader: &mut quick_xml::Reader<&[u8]>,
) -> Result<Vec<AddressDataType>, CardDavError> {
    let mut types = Vec::new();
    loop {
        match reader.read_event()? {
            Event::End(ref e)
                if e.name().local_name().into_inner() == b"supported-address-data" =>
            {
                return Ok(types);
            }
            Event::Start(ref e) | Event::Empty(ref e)
                if e.name().local_name().into_inner() == b"address-data-type" =>
            {
                types.push(AddressDataType {
                    content_type: attribute(e, "content-type")?
                        .unwrap_or_else(|| "text/vcard".to_string()),
                    version: attribute(e, "version")?,
                });
            }
            Event::Eof => return Err(CardDavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, CardDavError> {
    match e.try_get_attribute(name) {
        Ok(Some(attr)) => std::str::from_utf8(&attr.value)
            .map(|s| Some(s.to_string()))
            .map_err(|e| CardDavError::Xml(format!("UTF-8 error: {e}"))),
        Ok(None) => Ok(None),
        Err(e) => Err(CardDavError::Xml(e.to_string())),
    }
}
