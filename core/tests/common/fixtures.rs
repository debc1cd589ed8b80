// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.

use davsync_carddav::ETag;
use davsync_core::{LocalRecord, LocalStore, SqliteStore};
use davsync_vcard::Contact;

/// Opens an empty in-memory store.
pub async fn setup_store() -> SqliteStore<Contact> {
    SqliteStore::open(None)
        .await
        .expect("Failed to create test database")
}

/// A vCard 3.0 payload with the given uid and formatted name.
#[must_use]
pub fn card(uid: &str, name: &str) -> String {
    format!("BEGIN:VCARD\r\nVERSION:3.0\r\nUID:{uid}\r\nFN:{name}\r\nEND:VCARD\r\n")
}

/// Inserts a clean record as if it had been downloaded before.
pub async fn synced_contact(
    store: &SqliteStore<Contact>,
    file_name: &str,
    etag: &str,
    name: &str,
) -> LocalRecord<Contact> {
    let id = store
        .insert(&Contact::with_name(name), file_name, &ETag::from(etag))
        .await
        .unwrap();
    store.get(id).await.unwrap().unwrap()
}
