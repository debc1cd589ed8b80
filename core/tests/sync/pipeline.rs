// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Stage ordering, shortcut and deletion tests.

use davsync_carddav::ETag;
use davsync_core::{ACCEPT_VCARD, LocalStore, SyncError, SyncOptions, SyncStats};
use davsync_vcard::Contact;

use super::{run_sync, sync};
use crate::common::{Call, FakeRemote, card, setup_store, synced_contact};

fn remote_with_three() -> FakeRemote {
    let remote = FakeRemote::new();
    remote.put_member("a.vcf", Some("\"1\""), card("a", "Alice"));
    remote.put_member("b.vcf", Some("\"2\""), card("b", "Bob"));
    remote.put_member("c.vcf", Some("\"3\""), card("c", "Carol"));
    remote
}

#[tokio::test]
async fn sync_downloads_into_empty_store() {
    let store = setup_store().await;
    let remote = remote_with_three();

    let stats = sync(&store, &remote).await;

    assert_eq!(
        stats,
        SyncStats {
            inserts: 3,
            ..Default::default()
        }
    );
    assert_eq!(
        remote.calls(),
        vec![
            Call::Discover,
            Call::List,
            Call::FetchMany {
                file_names: vec!["a.vcf".into(), "b.vcf".into(), "c.vcf".into()],
                prefer_vcard4: false,
            },
        ]
    );

    let records = store.list_all().await.unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| !r.dirty && r.etag.is_some()));
    let bob = store.find_by_file_name("b.vcf").await.unwrap().unwrap();
    assert_eq!(bob.payload.formatted_name.as_deref(), Some("Bob"));
    assert_eq!(bob.etag, Some(ETag::from("\"2\"")));
    assert_eq!(store.change_token().await.unwrap().as_deref(), Some("ctag-0"));
}

#[tokio::test]
async fn sync_second_run_takes_shortcut() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    remote.clear_calls();

    let stats = sync(&store, &remote).await;

    assert_eq!(
        stats,
        SyncStats {
            unchanged: true,
            ..Default::default()
        }
    );
    assert_eq!(remote.calls(), vec![Call::Discover]);
}

#[tokio::test]
async fn sync_manual_run_ignores_change_tag() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    remote.clear_calls();

    let options = SyncOptions {
        manual: true,
        ..Default::default()
    };
    let stats = run_sync(&store, &remote, options).await.unwrap();

    assert_eq!(
        stats,
        SyncStats {
            skipped: 3,
            ..Default::default()
        }
    );
    assert_eq!(remote.calls(), vec![Call::Discover, Call::List]);
}

#[tokio::test]
async fn sync_without_change_tag_always_lists() {
    let store = setup_store().await;
    let remote = remote_with_three();
    remote.set_ctag(None);
    sync(&store, &remote).await;
    remote.clear_calls();

    let stats = sync(&store, &remote).await;

    assert!(!stats.unchanged);
    assert_eq!(stats.skipped, 3);
    assert_eq!(remote.calls(), vec![Call::Discover, Call::List]);
    assert_eq!(store.change_token().await.unwrap(), None);
}

#[tokio::test]
async fn sync_downloads_changed_member_with_single_get() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    remote.put_member("a.vcf", Some("\"1b\""), card("a", "Alicia"));
    remote.set_ctag(Some("ctag-changed"));
    remote.clear_calls();

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.updates, 1);
    assert_eq!(stats.skipped, 2);
    assert!(remote.calls().contains(&Call::FetchOne {
        file_name: "a.vcf".into(),
        accept: ACCEPT_VCARD.into(),
    }));

    let alice = store.find_by_file_name("a.vcf").await.unwrap().unwrap();
    assert_eq!(alice.payload.formatted_name.as_deref(), Some("Alicia"));
    assert_eq!(alice.etag, Some(ETag::from("\"1b\"")));
    assert_eq!(
        store.change_token().await.unwrap().as_deref(),
        Some("ctag-changed")
    );
}

#[tokio::test]
async fn sync_deletes_records_gone_from_server() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    remote.remove_member("b.vcf");
    remote.set_ctag(Some("ctag-changed"));

    let stats = sync(&store, &remote).await;

    assert_eq!(
        stats,
        SyncStats {
            deletes: 1,
            skipped: 2,
            ..Default::default()
        }
    );
    assert!(store.find_by_file_name("b.vcf").await.unwrap().is_none());
}

#[tokio::test]
async fn sync_deletion_wins_over_local_modification() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    let bob = store.find_by_file_name("b.vcf").await.unwrap().unwrap();
    store
        .modify(bob.id, &Contact::with_name("Bob 2"))
        .await
        .unwrap();
    remote.remove_member("b.vcf");
    remote.set_ctag(Some("ctag-changed"));
    remote.clear_calls();

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.deletes, 1);
    assert_eq!(stats.inserts + stats.updates, 0);
    assert!(store.find_by_file_name("b.vcf").await.unwrap().is_none());

    let calls = remote.calls();
    assert!(calls.contains(&Call::Put {
        file_name: "b.vcf".into(),
        match_etag: Some(ETag::from("\"2\"")),
        create_only: false,
    }));
    assert!(!calls.iter().any(|call| matches!(
        call,
        Call::FetchOne { .. } | Call::FetchMany { .. }
    )));
    assert_eq!(remote.member_names(), vec!["a.vcf", "c.vcf"]);
}

#[tokio::test]
async fn sync_names_and_uploads_new_record() {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    let id = store.create(&Contact::with_name("New")).await.unwrap();

    let stats = sync(&store, &remote).await;

    let record = store.get(id).await.unwrap().unwrap();
    let file_name = record.file_name.clone().unwrap();
    let uid = file_name.strip_suffix(".vcf").unwrap();
    assert!(uuid::Uuid::parse_str(uid).is_ok());
    assert_eq!(record.payload.uid.as_deref(), Some(uid));
    assert!(!record.dirty);
    assert!(record.etag.is_some());

    let (etag, data) = remote.member(&file_name).unwrap();
    assert_eq!(etag, record.etag);
    assert!(data.contains("VERSION:3.0\r\n"));
    assert!(data.contains(&format!("UID:{uid}\r\n")));
    assert!(remote.calls().contains(&Call::Put {
        file_name: file_name.clone(),
        match_etag: None,
        create_only: true,
    }));

    // the upload moved the change tag past the observed one
    assert_eq!(stats.skipped, 1);
    assert_eq!(store.change_token().await.unwrap().as_deref(), Some("ctag-0"));
    let stats = sync(&store, &remote).await;
    assert_eq!(stats.skipped, 1);
    assert!(!stats.unchanged);
    assert!(sync(&store, &remote).await.unchanged);
}

#[tokio::test]
async fn sync_uploads_vcard4_when_supported() {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    remote.set_supports_vcard4(true);
    let id = store.create(&Contact::with_name("New")).await.unwrap();

    sync(&store, &remote).await;

    let file_name = store.get(id).await.unwrap().unwrap().file_name.unwrap();
    let (_, data) = remote.member(&file_name).unwrap();
    assert!(data.contains("VERSION:4.0\r\n"));
}

#[tokio::test]
async fn sync_pushes_local_deletion() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    let alice = store.find_by_file_name("a.vcf").await.unwrap().unwrap();
    store.mark_deleted(alice.id).await.unwrap();
    remote.clear_calls();

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.deletes, 1);
    assert!(remote.calls().contains(&Call::Delete {
        file_name: "a.vcf".into(),
        match_etag: Some(ETag::from("\"1\"")),
    }));
    assert!(remote.member("a.vcf").is_none());
    assert!(store.get(alice.id).await.unwrap().is_none());
}

#[tokio::test]
async fn sync_ignores_failed_remote_deletion() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    let alice = store.find_by_file_name("a.vcf").await.unwrap().unwrap();
    store.mark_deleted(alice.id).await.unwrap();
    remote.set_fail_deletes(true);

    let stats = sync(&store, &remote).await;

    assert_eq!(
        stats,
        SyncStats {
            deletes: 1,
            unchanged: true,
            ..Default::default()
        }
    );
    assert!(store.get(alice.id).await.unwrap().is_none());
    assert!(remote.member("a.vcf").is_some());
}

#[tokio::test]
async fn sync_deletes_locally_when_server_copy_changed() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    let alice = store.find_by_file_name("a.vcf").await.unwrap().unwrap();
    store.mark_deleted(alice.id).await.unwrap();
    remote.put_member("a.vcf", Some("\"9\""), card("a", "Alice v2"));
    remote.clear_calls();

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.deletes, 1);
    assert!(remote.calls().contains(&Call::Delete {
        file_name: "a.vcf".into(),
        match_etag: Some(ETag::from("\"1\"")),
    }));
    assert!(store.get(alice.id).await.unwrap().is_none());
    let (etag, data) = remote.member("a.vcf").unwrap();
    assert_eq!(etag, Some(ETag::from("\"9\"")));
    assert!(data.contains("FN:Alice v2"));
}

#[tokio::test]
async fn sync_deletes_unnamed_record_locally_only() {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    let id = store.create(&Contact::with_name("Draft")).await.unwrap();
    store.mark_deleted(id).await.unwrap();

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.deletes, 1);
    assert!(
        !remote
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Delete { .. } | Call::Put { .. }))
    );
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn sync_aborts_on_listing_without_etag() {
    let store = setup_store().await;
    let remote = remote_with_three();
    sync(&store, &remote).await;
    remote.put_member("d.vcf", None, card("d", "Dave"));
    remote.set_ctag(Some("ctag-changed"));

    let result = run_sync(&store, &remote, SyncOptions::default()).await;

    assert!(matches!(result, Err(SyncError::Protocol(_))));
    assert_eq!(store.change_token().await.unwrap().as_deref(), Some("ctag-0"));
    assert!(store.find_by_file_name("d.vcf").await.unwrap().is_none());
}

#[tokio::test]
async fn sync_keeps_clean_records_untouched() {
    let store = setup_store().await;
    let remote = remote_with_three();
    let alice = synced_contact(&store, "a.vcf", "\"1\"", "Alice").await;

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.inserts, 2);
    assert_eq!(store.get(alice.id).await.unwrap().unwrap(), alice);
}
