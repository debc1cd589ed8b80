// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! vCard formatter.
//!
//! Writes a [`Contact`] as vCard 3.0 or 4.0 text with CRLF line endings,
//! folding long content lines.
//!
//! # Example
//!
//! ```
//! use davsync_vcard::{Contact, Version, format};
//!
//! let contact = Contact::with_name("Jane Doe");
//! let text = format(&contact, Version::V4_0).unwrap();
//! assert!(text.contains("FN:Jane Doe\r\n"));
//! ```

use std::io::{self, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::contact::{Contact, Photo, TypedValue, Version};

/// Value of the `PRODID` property written into every card.
pub const PRODID: &str = "-//davsync//vcard//EN";

/// Formats a contact to a `String` with default options.
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails.
pub fn format(contact: &Contact, version: Version) -> io::Result<String> {
    FormatOptions::default().write_to_string(contact, version)
}

/// Formatting options.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Maximum line length in octets before folding, `None` disables folding.
    ///
    /// Default: `Some(75)`.
    pub folding: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { folding: Some(75) }
    }
}

impl FormatOptions {
    /// Set the line folding option.
    #[must_use]
    pub fn folding(mut self, folding: Option<usize>) -> Self {
        self.folding = folding;
        self
    }

    /// Writes a contact to any `Write` implementer.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&self, contact: &Contact, version: Version, w: &mut impl Write) -> io::Result<()> {
        Formatter::new(w, *self).write_contact(contact, version)
    }

    /// Writes a contact to a `String`.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_to_string(&self, contact: &Contact, version: Version) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write(contact, version, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// vCard formatter that writes to any `Write` implementer.
#[derive(Debug)]
pub struct Formatter<W: Write> {
    writer: W,
    options: FormatOptions,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter with options.
    #[must_use]
    pub fn new(writer: W, options: FormatOptions) -> Self {
        Self { writer, options }
    }

    /// Consumes this formatter, returning the underlying writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Writes one complete `BEGIN:VCARD` ... `END:VCARD` block.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_contact(&mut self, contact: &Contact, version: Version) -> io::Result<()> {
        self.write_line("BEGIN:VCARD")?;
        self.write_line(&format!("VERSION:{version}"))?;
        self.write_line(&format!("PRODID:{PRODID}"))?;

        if let Some(uid) = &contact.uid {
            self.write_line(&format!("UID:{}", escape(uid)))?;
        }

        // FN is required in both versions
        let formatted_name = contact.display_name().unwrap_or_default();
        self.write_line(&format!("FN:{}", escape(&formatted_name)))?;

        match &contact.name {
            Some(n) => {
                let components = [&n.family, &n.given, &n.additional, &n.prefix, &n.suffix]
                    .map(|c| escape(c))
                    .join(";");
                self.write_line(&format!("N:{components}"))?;
            }
            // N is required in 3.0
            None if version == Version::V3_0 => self.write_line("N:;;;;")?,
            None => {}
        }

        if let Some(nickname) = &contact.nickname {
            self.write_line(&format!("NICKNAME:{}", escape(nickname)))?;
        }
        if !contact.organization.is_empty() {
            let units: Vec<String> = contact.organization.iter().map(|u| escape(u)).collect();
            self.write_line(&format!("ORG:{}", units.join(";")))?;
        }
        if let Some(title) = &contact.title {
            self.write_line(&format!("TITLE:{}", escape(title)))?;
        }
        for email in &contact.emails {
            self.write_typed("EMAIL", email)?;
        }
        for phone in &contact.phones {
            self.write_typed("TEL", phone)?;
        }
        if let Some(note) = &contact.note {
            self.write_line(&format!("NOTE:{}", escape(note)))?;
        }
        if let Some(photo) = &contact.photo {
            self.write_line(&photo_line(photo, version))?;
        }
        for line in &contact.unknown_properties {
            self.write_line(line)?;
        }

        self.write_line("END:VCARD")
    }

    fn write_typed(&mut self, name: &str, typed: &TypedValue) -> io::Result<()> {
        let value = escape(&typed.value);
        if typed.types.is_empty() {
            self.write_line(&format!("{name}:{value}"))
        } else {
            let types = typed.types.join(",");
            self.write_line(&format!("{name};TYPE={types}:{value}"))
        }
    }

    /// Writes a content line followed by CRLF, folding it if needed.
    ///
    /// Folding never splits a multi-byte character; the leading space of a
    /// continuation line counts towards its length.
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let Some(max_len) = self.options.folding else {
            self.writer.write_all(line.as_bytes())?;
            return self.writer.write_all(b"\r\n");
        };

        let mut line_length = 0;
        let mut buf = [0; 4];
        for c in line.chars() {
            let len = c.len_utf8();
            if line_length + len > max_len {
                self.writer.write_all(b"\r\n ")?;
                line_length = 1;
            }
            self.writer.write_all(c.encode_utf8(&mut buf).as_bytes())?;
            line_length += len;
        }
        self.writer.write_all(b"\r\n")
    }
}

fn photo_line(photo: &Photo, version: Version) -> String {
    match (photo, version) {
        (Photo::Inline { media_type, data }, Version::V3_0) => {
            let encoded = STANDARD.encode(data);
            match media_type.as_deref().and_then(|m| m.strip_prefix("image/")) {
                Some(subtype) => format!(
                    "PHOTO;ENCODING=b;TYPE={}:{encoded}",
                    subtype.to_ascii_uppercase()
                ),
                None => format!("PHOTO;ENCODING=b:{encoded}"),
            }
        }
        (Photo::Inline { media_type, data }, Version::V4_0) => format!(
            "PHOTO:data:{};base64,{}",
            media_type.as_deref().unwrap_or_default(),
            STANDARD.encode(data)
        ),
        (Photo::Uri(uri), Version::V3_0) => format!("PHOTO;VALUE=uri:{uri}"),
        (Photo::Uri(uri), Version::V4_0) => format!("PHOTO:{uri}"),
    }
}

/// Applies RFC 6350 §3.4 text escaping.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            c => out.push(c),
        }
    }
    out
}
