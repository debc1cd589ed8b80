// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::batch::FetchedPayload;
use crate::error::SyncError;
use crate::traits::{AssetFetcher, LocalStore, RecordCodec};
use crate::types::{LocalRecord, SyncStats};

/// Stores one downloaded member locally.
///
/// The payload must decode to exactly one record, otherwise the member is
/// skipped. An `existing` record is overwritten in place and keeps its dirty
/// flag; without one a clean record is inserted.
///
/// # Errors
///
/// Only local store failures are returned.
pub async fn apply_fetched<S, C>(
    store: &S,
    codec: &C,
    assets: &dyn AssetFetcher,
    existing: Option<&LocalRecord<S::Payload>>,
    fetched: FetchedPayload,
    stats: &mut SyncStats,
) -> Result<(), SyncError>
where
    S: LocalStore + ?Sized,
    C: RecordCodec<Record = S::Payload> + ?Sized,
{
    let FetchedPayload {
        file_name,
        etag,
        charset,
        data,
    } = fetched;

    let mut records = match codec.decode(&data, &charset, assets).await {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(%file_name, %err, "couldn't decode payload, ignoring");
            return Ok(());
        }
    };
    let payload = match (records.pop(), records.is_empty()) {
        (Some(payload), true) => payload,
        _ => {
            tracing::error!(%file_name, "payload doesn't contain exactly one record, ignoring");
            return Ok(());
        }
    };

    match existing {
        Some(record) => {
            tracing::info!(%file_name, id = record.id, "updating in local store");
            store.update(record, &payload, &etag).await?;
            stats.updates += 1;
        }
        None => {
            tracing::info!(%file_name, "adding to local store");
            store.insert(&payload, &file_name, &etag).await?;
            stats.inserts += 1;
        }
    }
    Ok(())
}
