// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Download batching tests.

use davsync_core::{ACCEPT_VCARD, LocalStore, SyncOptions};

use super::{run_sync, sync};
use crate::common::{Call, FakeRemote, card, setup_store};

fn remote_with(count: usize) -> FakeRemote {
    let remote = FakeRemote::new();
    for i in 0..count {
        let uid = format!("{i:02}");
        remote.put_member(
            &format!("{uid}.vcf"),
            Some(format!("\"{i}\"").as_str()),
            card(&uid, &format!("Contact {i}")),
        );
    }
    remote
}

fn fetches(remote: &FakeRemote) -> Vec<Call> {
    remote
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::FetchOne { .. } | Call::FetchMany { .. }))
        .collect()
}

#[tokio::test]
async fn batching_splits_23_into_10_10_3() {
    let store = setup_store().await;
    let remote = remote_with(23);

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.inserts, 23);
    let sizes: Vec<usize> = fetches(&remote)
        .into_iter()
        .map(|call| match call {
            Call::FetchMany { file_names, .. } => file_names.len(),
            other => panic!("unexpected fetch {other:?}"),
        })
        .collect();
    assert_eq!(sizes, vec![10, 10, 3]);
    assert_eq!(store.list_all().await.unwrap().len(), 23);
}

#[tokio::test]
async fn batching_fetches_trailing_single_with_get() {
    let store = setup_store().await;
    let remote = remote_with(11);

    let options = SyncOptions {
        batch_size: 5,
        ..Default::default()
    };
    let stats = run_sync(&store, &remote, options).await.unwrap();

    assert_eq!(stats.inserts, 11);
    let calls = fetches(&remote);
    assert_eq!(calls.len(), 3);
    assert!(matches!(&calls[0], Call::FetchMany { file_names, .. } if file_names.len() == 5));
    assert!(matches!(&calls[1], Call::FetchMany { file_names, .. } if file_names.len() == 5));
    assert_eq!(
        calls[2],
        Call::FetchOne {
            file_name: "10.vcf".into(),
            accept: ACCEPT_VCARD.into(),
        }
    );
}

#[tokio::test]
async fn batching_requests_vcard4_only_when_supported() {
    let store = setup_store().await;
    let remote = remote_with(2);
    remote.set_supports_vcard4(true);

    sync(&store, &remote).await;

    assert_eq!(
        fetches(&remote),
        vec![Call::FetchMany {
            file_names: vec!["00.vcf".into(), "01.vcf".into()],
            prefer_vcard4: true,
        }]
    );
}

#[tokio::test]
async fn batching_skips_undecodable_members() {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    remote.put_member("a.vcf", Some("\"1\""), card("a", "Alice"));
    remote.put_member("b.vcf", Some("\"2\""), "garbage");
    remote.put_member(
        "c.vcf",
        Some("\"3\""),
        format!("{}{}", card("c1", "One"), card("c2", "Two")),
    );

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.inserts, 1);
    let records = store.list_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_name.as_deref(), Some("a.vcf"));
    assert_eq!(store.change_token().await.unwrap().as_deref(), Some("ctag-0"));
}

#[tokio::test]
async fn batching_skips_member_gone_before_single_get() {
    let store = setup_store().await;
    let remote = FakeRemote::new();
    remote.put_vanished_member("gone.vcf", "\"7\"");

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.inserts, 0);
    assert_eq!(
        fetches(&remote),
        vec![Call::FetchOne {
            file_name: "gone.vcf".into(),
            accept: ACCEPT_VCARD.into(),
        }]
    );
    assert!(store.list_all().await.unwrap().is_empty());
    assert_eq!(store.change_token().await.unwrap().as_deref(), Some("ctag-0"));
}

#[tokio::test]
async fn batching_skips_member_gone_before_multiget() {
    let store = setup_store().await;
    let remote = remote_with(1);
    remote.put_vanished_member("gone.vcf", "\"7\"");

    let stats = sync(&store, &remote).await;

    assert_eq!(stats.inserts, 1);
    assert!(matches!(
        fetches(&remote).as_slice(),
        [Call::FetchMany { file_names, .. }] if file_names.len() == 2
    ));
    assert_eq!(store.change_token().await.unwrap().as_deref(), Some("ctag-0"));
}
