// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Concurrent modification tests.

use davsync_carddav::{CardDavError, ETag};
use davsync_core::{LocalStore, SyncError, SyncOptions, SyncStats};
use davsync_vcard::Contact;

use super::{run_sync, sync};
use crate::common::{Call, FakeRemote, card, setup_store};

/// Syncs `a.vcf` at version `"1"`, then edits it on both sides.
async fn setup_conflict() -> (davsync_core::SqliteStore<Contact>, FakeRemote, i64) {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    remote.put_member("a.vcf", Some("\"1\""), card("a", "Alice"));
    sync(&store, &remote).await;

    let record = store.find_by_file_name("a.vcf").await.unwrap().unwrap();
    store
        .modify(record.id, &Contact::with_name("Mine"))
        .await
        .unwrap();
    remote.put_member("a.vcf", Some("\"2\""), card("a", "Theirs"));
    remote.clear_calls();
    (store, remote, record.id)
}

#[tokio::test]
async fn conflict_leaves_record_dirty() {
    let (store, remote, id) = setup_conflict().await;

    let stats = sync(&store, &remote).await;

    assert_eq!(
        stats,
        SyncStats {
            unchanged: true,
            ..Default::default()
        }
    );
    assert!(remote.calls().contains(&Call::Put {
        file_name: "a.vcf".into(),
        match_etag: Some(ETag::from("\"1\"")),
        create_only: false,
    }));

    let record = store.get(id).await.unwrap().unwrap();
    assert!(record.dirty);
    assert_eq!(record.etag, Some(ETag::from("\"1\"")));
    assert_eq!(record.payload.formatted_name.as_deref(), Some("Mine"));

    let (etag, data) = remote.member("a.vcf").unwrap();
    assert_eq!(etag, Some(ETag::from("\"2\"")));
    assert!(data.contains("FN:Theirs"));
}

#[tokio::test]
async fn conflict_is_reconciled_by_the_download() {
    let (store, remote, id) = setup_conflict().await;
    remote.set_ctag(Some("ctag-theirs"));

    let stats = sync(&store, &remote).await;

    assert_eq!(
        stats,
        SyncStats {
            updates: 1,
            ..Default::default()
        }
    );
    let record = store.get(id).await.unwrap().unwrap();
    assert!(record.dirty);
    assert_eq!(record.etag, Some(ETag::from("\"2\"")));
    assert_eq!(record.payload.formatted_name.as_deref(), Some("Theirs"));

    // the next attempt uploads against the version it downloaded
    remote.clear_calls();
    sync(&store, &remote).await;

    assert!(remote.calls().contains(&Call::Put {
        file_name: "a.vcf".into(),
        match_etag: Some(ETag::from("\"2\"")),
        create_only: false,
    }));
    let record = store.get(id).await.unwrap().unwrap();
    assert!(!record.dirty);
    assert_eq!(record.etag, remote.member("a.vcf").unwrap().0);
}

#[tokio::test]
async fn conflict_on_create_adopts_server_version() {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    let id = store.create(&Contact::with_name("New")).await.unwrap();
    sync(&store, &remote).await;
    let record = store.get(id).await.unwrap().unwrap();
    let file_name = record.file_name.clone().unwrap();
    let (server_etag, _) = remote.member(&file_name).unwrap();

    // the upload reached the server but its ETag got lost
    store.clear_dirty(&record, None).await.unwrap();
    store
        .modify(id, &Contact::with_name("New 2"))
        .await
        .unwrap();
    remote.clear_calls();

    let stats = sync(&store, &remote).await;

    assert!(remote.calls().contains(&Call::Put {
        file_name: file_name.clone(),
        match_etag: None,
        create_only: true,
    }));
    assert_eq!(stats.updates, 1);
    let record = store.get(id).await.unwrap().unwrap();
    assert!(record.dirty);
    assert_eq!(record.etag, server_etag);
    assert_eq!(record.payload.formatted_name.as_deref(), Some("New"));
}

#[tokio::test]
async fn rejected_update_leaves_record_dirty_and_completes() {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    remote.put_member("a.vcf", Some("\"1\""), card("a", "Alice"));
    sync(&store, &remote).await;
    let record = store.find_by_file_name("a.vcf").await.unwrap().unwrap();
    store
        .modify(record.id, &Contact::with_name("Mine"))
        .await
        .unwrap();
    remote.put_member("new.vcf", Some("\"5\""), card("new", "Newcomer"));
    remote.set_ctag(Some("ctag-new"));
    remote.set_fail_puts(true);

    let stats = sync(&store, &remote).await;

    assert_eq!(
        stats,
        SyncStats {
            inserts: 1,
            skipped: 1,
            ..Default::default()
        }
    );
    let record = store.get(record.id).await.unwrap().unwrap();
    assert!(record.dirty);
    assert_eq!(record.etag, Some(ETag::from("\"1\"")));
    assert!(store.find_by_file_name("new.vcf").await.unwrap().is_some());
    assert_eq!(store.change_token().await.unwrap().as_deref(), Some("ctag-new"));
}

#[tokio::test]
async fn rejected_create_aborts_attempt() {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    let id = store.create(&Contact::with_name("New")).await.unwrap();
    remote.set_fail_puts(true);

    let result = run_sync(&store, &remote, SyncOptions::default()).await;

    assert!(matches!(result, Err(SyncError::Remote(CardDavError::Auth(_)))));
    let record = store.get(id).await.unwrap().unwrap();
    assert!(record.dirty);
    assert!(record.file_name.is_some());
    assert!(store.change_token().await.unwrap().is_none());
    assert!(!remote.calls().contains(&Call::List));
}
