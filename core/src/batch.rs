// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Download planning: single GET versus `addressbook-multiget`.

use std::slice::Chunks;

use davsync_carddav::ETag;

use crate::error::SyncError;
use crate::traits::RemoteCollection;
use crate::types::RemoteFetchResult;

/// Default number of resources per bulk fetch.
pub const MAX_MULTIGET: usize = 10;

/// `Accept` header of a single fetch, most specific first.
pub const ACCEPT_VCARD: &str =
    "text/vcard;version=4.0, text/vcard;charset=utf-8;q=0.8, text/vcard;q=0.5";

const DEFAULT_CHARSET: &str = "utf-8";

/// A downloaded member that carries everything needed to apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPayload {
    /// Member name.
    pub file_name: String,

    /// Version of the payload.
    pub etag: ETag,

    /// Lowercased charset of the payload.
    pub charset: String,

    /// Raw payload bytes.
    pub data: Vec<u8>,
}

/// Splits a download set into batches and fetches each batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    batch_size: usize,
}

impl Default for BatchPlanner {
    fn default() -> Self {
        Self::new(MAX_MULTIGET)
    }
}

impl BatchPlanner {
    /// Creates a planner; a batch size of zero is treated as one.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Configured batch size.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Partitions `names` in order; only the last batch may be smaller.
    pub fn batches<'a>(&self, names: &'a [String]) -> Chunks<'a, String> {
        names.chunks(self.batch_size)
    }

    /// Fetches one batch.
    ///
    /// A single name is fetched with a plain GET negotiating via
    /// [`ACCEPT_VCARD`]; larger batches use one bulk fetch, asking for vCard
    /// 4.0 only if `supports_vcard4`.
    ///
    /// # Errors
    ///
    /// Fails if the request fails or an entry lacks its `ETag` or payload.
    /// Members removed since the listing are left out.
    pub async fn fetch_batch<R>(
        &self,
        remote: &R,
        batch: &[String],
        supports_vcard4: bool,
    ) -> Result<Vec<FetchedPayload>, SyncError>
    where
        R: RemoteCollection + ?Sized,
    {
        match batch {
            [] => Ok(Vec::new()),
            [name] => {
                tracing::info!(file_name = %name, "downloading single member");
                let result = match remote.fetch_one(name, ACCEPT_VCARD).await {
                    Ok(result) => result,
                    Err(err) if err.is_not_found() => {
                        tracing::warn!(file_name = %name, "member vanished since listing, skipping");
                        return Ok(Vec::new());
                    }
                    Err(err) => return Err(err.into()),
                };
                let etag = result.etag.ok_or_else(|| {
                    SyncError::protocol(format!("received {name} without ETag"))
                })?;
                Ok(vec![FetchedPayload {
                    charset: charset_of(result.content_type.as_deref()),
                    file_name: result.file_name,
                    etag,
                    data: result.payload.unwrap_or_default(),
                }])
            }
            names => {
                tracing::info!(count = names.len(), "downloading members with multi-get");
                remote
                    .fetch_many(names, supports_vcard4)
                    .await?
                    .into_iter()
                    .map(validate_bulk_entry)
                    .collect()
            }
        }
    }
}

fn validate_bulk_entry(result: RemoteFetchResult) -> Result<FetchedPayload, SyncError> {
    let RemoteFetchResult {
        file_name,
        etag,
        content_type,
        payload,
    } = result;

    let etag = etag.ok_or_else(|| {
        SyncError::protocol(format!("received multi-get response for {file_name} without ETag"))
    })?;
    let data = payload.ok_or_else(|| {
        SyncError::protocol(format!(
            "received multi-get response for {file_name} without address data"
        ))
    })?;
    Ok(FetchedPayload {
        charset: charset_of(content_type.as_deref()),
        file_name,
        etag,
        data,
    })
}

/// Charset parameter of a `Content-Type`, UTF-8 if absent or unparsable.
pub(crate) fn charset_of(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .and_then(|m| m.get_param(mime::CHARSET).map(|c| c.as_str().to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_CHARSET.to_string())
}
