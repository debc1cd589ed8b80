// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use async_trait::async_trait;
use davsync_vcard::{Contact, Photo};

use crate::error::CodecError;
use crate::traits::{AssetFetcher, RecordCodec};
use crate::types::PayloadFormat;

/// vCard codec for [`Contact`] records.
///
/// Photos referenced by URL are downloaded through the asset fetcher while
/// decoding and embedded; a photo that cannot be fetched is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct VCardCodec;

#[async_trait]
impl RecordCodec for VCardCodec {
    type Record = Contact;

    async fn decode(
        &self,
        bytes: &[u8],
        charset: &str,
        assets: &dyn AssetFetcher,
    ) -> Result<Vec<Contact>, CodecError> {
        let text = decode_text(bytes, charset);
        let mut contacts = davsync_vcard::parse(&text)?;
        for contact in &mut contacts {
            embed_photo(contact, assets).await;
        }
        Ok(contacts)
    }

    fn encode(&self, record: &Contact, format: PayloadFormat) -> Result<Vec<u8>, CodecError> {
        let text = davsync_vcard::format(record, format.version())?;
        Ok(text.into_bytes())
    }

    fn set_uid(&self, record: &mut Contact, uid: &str) {
        record.uid = Some(uid.to_string());
    }

    fn file_extension(&self) -> &'static str {
        "vcf"
    }
}

async fn embed_photo(contact: &mut Contact, assets: &dyn AssetFetcher) {
    let url = match &contact.photo {
        Some(Photo::Uri(url)) => url.clone(),
        _ => return,
    };

    contact.photo = match assets.fetch(&url).await {
        Some(data) => Some(Photo::Inline {
            media_type: None,
            data,
        }),
        None => {
            tracing::warn!(%url, "couldn't fetch contact photo, dropping it");
            None
        }
    };
}

/// Decodes text in the given charset.
///
/// UTF-8, US-ASCII and ISO-8859-1 are understood; anything else is read as
/// UTF-8 with replacement characters.
fn decode_text<'a>(bytes: &'a [u8], charset: &str) -> Cow<'a, str> {
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" | "us-ascii" | "ascii" => String::from_utf8_lossy(bytes),
        "iso-8859-1" | "latin1" | "latin-1" | "l1" => {
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
        other => {
            tracing::warn!(charset = other, "unsupported charset, reading as UTF-8");
            String::from_utf8_lossy(bytes)
        }
    }
}
