// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of the reconciliation pipeline against an in-memory
//! address book.

mod batching;
mod conflict;
mod pipeline;

use davsync_core::{SqliteStore, SyncError, SyncManager, SyncOptions, SyncStats, VCardCodec};
use davsync_vcard::Contact;

use crate::common::{FakeRemote, NoAssets};

async fn run_sync(
    store: &SqliteStore<Contact>,
    remote: &FakeRemote,
    options: SyncOptions,
) -> Result<SyncStats, SyncError> {
    SyncManager::new(store, remote, &VCardCodec, &NoAssets)
        .with_options(options)
        .run()
        .await
}

async fn sync(store: &SqliteStore<Contact>, remote: &FakeRemote) -> SyncStats {
    run_sync(store, remote, SyncOptions::default())
        .await
        .expect("sync failed")
}
