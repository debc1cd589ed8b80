// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! vCard parser.
//!
//! The parser works on unfolded content lines (`group.NAME;PARAM=VALUE:value`)
//! and maps the known properties onto [`Contact`]. It accepts both 3.0 and
//! 4.0 input and is lenient about blank lines and line endings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::contact::{Contact, Photo, StructuredName, TypedValue};
use crate::error::VCardError;

/// Parses every vCard contained in `input`.
///
/// # Errors
///
/// Returns an error if the input is not a well-formed sequence of vCards.
pub fn parse(input: &str) -> Result<Vec<Contact>, VCardError> {
    let mut contacts = Vec::new();
    let mut current: Option<Contact> = None;

    for (index, line) in unfold(input).iter().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let line = ContentLine::parse(line).ok_or(VCardError::MissingColon { line: line_no })?;
        let is_vcard = line.value.trim().eq_ignore_ascii_case("VCARD");
        match (line.name.as_str(), current.as_mut()) {
            ("BEGIN", _) if is_vcard => current = Some(Contact::default()),
            ("END", Some(_)) if is_vcard => contacts.extend(current.take()),
            (_, Some(contact)) => apply_property(contact, &line)?,
            (_, None) => return Err(VCardError::OutsideCard { line: line_no }),
        }
    }

    match current {
        Some(_) => Err(VCardError::Unterminated),
        None => Ok(contacts),
    }
}

/// Joins folded lines: a line starting with a space or tab continues the previous one.
fn unfold(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in input.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(continuation) = raw.strip_prefix([' ', '\t'])
            && let Some(last) = lines.last_mut()
        {
            last.push_str(continuation);
        } else {
            lines.push(raw.to_string());
        }
    }
    lines
}

#[derive(Debug)]
struct ContentLine<'a> {
    raw: &'a str,
    /// Uppercased property name without group prefix.
    name: String,
    /// Uppercased parameter names with their values.
    params: Vec<(String, Vec<String>)>,
    value: &'a str,
}

impl<'a> ContentLine<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let colon = find_unquoted(raw, ':')?;
        let (head, rest) = raw.split_at(colon);
        let value = rest.strip_prefix(':')?;

        let mut segments = split_unquoted(head, ';').into_iter();
        let name = segments
            .next()?
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase();

        let params = segments
            .filter(|s| !s.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, values)) => (
                    key.trim().to_ascii_uppercase(),
                    split_unquoted(values, ',')
                        .into_iter()
                        .map(|v| v.trim_matches('"').to_string())
                        .collect(),
                ),
                // vCard 2.1 style bare parameter, e.g. `TEL;HOME:...`
                None => ("TYPE".to_string(), vec![segment.to_string()]),
            })
            .collect();

        Some(Self {
            raw,
            name,
            params,
            value,
        })
    }

    fn param(&self, key: &str) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(move |(k, _)| k == key)
            .flat_map(|(_, values)| values.iter().map(String::as_str))
    }

    fn types(&self) -> Vec<String> {
        self.param("TYPE")
            .flat_map(|t| t.split(','))
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
            .collect()
    }
}

fn apply_property(contact: &mut Contact, line: &ContentLine<'_>) -> Result<(), VCardError> {
    let value = line.value;
    match line.name.as_str() {
        // regenerated by the formatter
        "VERSION" | "PRODID" => {}
        "UID" => contact.uid = Some(unescape(value)),
        "FN" => contact.formatted_name = Some(unescape(value)),
        "N" => {
            let mut parts = split_components(value).into_iter().map(unescape);
            contact.name = Some(StructuredName {
                family: parts.next().unwrap_or_default(),
                given: parts.next().unwrap_or_default(),
                additional: parts.next().unwrap_or_default(),
                prefix: parts.next().unwrap_or_default(),
                suffix: parts.next().unwrap_or_default(),
            });
        }
        "NICKNAME" => contact.nickname = Some(unescape(value)),
        "ORG" => {
            contact.organization = split_components(value)
                .into_iter()
                .map(unescape)
                .filter(|unit| !unit.is_empty())
                .collect();
        }
        "TITLE" => contact.title = Some(unescape(value)),
        "NOTE" => contact.note = Some(unescape(value)),
        "EMAIL" => contact.emails.push(TypedValue {
            value: unescape(value),
            types: line.types(),
        }),
        "TEL" => contact.phones.push(TypedValue {
            value: unescape(value.strip_prefix("tel:").unwrap_or(value)),
            types: line.types(),
        }),
        "PHOTO" => contact.photo = Some(parse_photo(line)?),
        _ => contact.unknown_properties.push(line.raw.to_string()),
    }
    Ok(())
}

fn parse_photo(line: &ContentLine<'_>) -> Result<Photo, VCardError> {
    let value = line.value.trim();

    // vCard 4.0: data:[<media type>][;base64],<data>
    if let Some((meta, data)) = value
        .strip_prefix("data:")
        .and_then(|uri| uri.split_once(','))
    {
        let (media_type, data) = match meta.strip_suffix(";base64") {
            Some(media_type) => (media_type, decode_base64(&line.name, data)?),
            None => (meta, data.as_bytes().to_vec()),
        };
        return Ok(Photo::Inline {
            media_type: (!media_type.is_empty()).then(|| media_type.to_string()),
            data,
        });
    }

    // vCard 3.0: PHOTO;ENCODING=b;TYPE=JPEG:<data>
    let is_inline = line
        .param("ENCODING")
        .any(|e| e.eq_ignore_ascii_case("b") || e.eq_ignore_ascii_case("base64"));
    if is_inline {
        let media_type = line.param("MEDIATYPE").next().map(str::to_string).or_else(|| {
            line.param("TYPE")
                .next()
                .map(|t| format!("image/{}", t.to_ascii_lowercase()))
        });
        return Ok(Photo::Inline {
            media_type,
            data: decode_base64(&line.name, value)?,
        });
    }

    Ok(Photo::Uri(value.to_string()))
}

fn decode_base64(property: &str, data: &str) -> Result<Vec<u8>, VCardError> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(cleaned)
        .map_err(|source| VCardError::Base64 {
            property: property.to_string(),
            source,
        })
}

fn find_unquoted(s: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == needle && !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_unquoted(rest, sep) {
        let (part, tail) = rest.split_at(i);
        parts.push(part);
        rest = tail.strip_prefix(sep).unwrap_or(tail);
    }
    parts.push(rest);
    parts
}

/// Splits a compound value (`N`, `ORG`) on `;` that are not escaped.
fn split_components(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ';' => {
                parts.extend(value.get(start..i));
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.extend(value.get(start..));
    parts
}

/// Reverses RFC 6350 §3.4 text escaping.
pub(crate) fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
