// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! XML helpers shared by request builders and response parsers.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::CardDavError;

/// XML namespaces used by `WebDAV` and `CardDAV`.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";
    /// `CardDAV` namespace.
    pub const CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";
    /// Calendar server extensions namespace (`getctag`).
    pub const CALENDARSERVER: &str = "http://calendarserver.org/ns/";
}

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

pub fn new_writer() -> XmlWriter {
    Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
}

/// Writes `<name></name>`.
pub fn write_empty_pair(writer: &mut XmlWriter, name: &str) -> Result<(), CardDavError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub fn finish(writer: XmlWriter) -> Result<String, CardDavError> {
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| CardDavError::Xml(format!("UTF-8 error: {e}")))
}

/// Reads the raw text content of the element opened by `start`, up to its end tag.
///
/// Entity references are unescaped; a `CDATA` section is returned verbatim.
///
/// # Errors
///
/// Returns an error if XML parsing fails.
pub fn read_element_text(
    reader: &mut quick_xml::Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<String, CardDavError> {
    let end = start.to_end().into_owned();
    let raw = reader.read_text(end.name())?;
    let raw = raw.trim();

    if let Some(cdata) = raw
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
    {
        return Ok(cdata.to_string());
    }

    quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .map_err(|e| CardDavError::Xml(format!("Unescape error: {e}")))
}
