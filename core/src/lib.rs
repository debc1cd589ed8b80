// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Two-way synchronization of a local contact store with a `CardDAV`
//! address book.
//!
//! [`SyncManager`] drives one sync attempt over four collaborators: a
//! [`LocalStore`], a [`RemoteCollection`], a [`RecordCodec`] and an
//! [`AssetFetcher`]. Concrete implementations are provided by
//! [`SqliteStore`], [`davsync_carddav::CardDavClient`], [`VCardCodec`] and
//! [`HttpAssetFetcher`].

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc)]

mod apply;
mod asset;
mod batch;
mod codec;
mod config;
mod diff;
mod error;
mod localdb;
mod remote;
mod sync;
mod traits;
mod types;

pub use crate::apply::apply_fetched;
pub use crate::asset::HttpAssetFetcher;
pub use crate::batch::{ACCEPT_VCARD, BatchPlanner, FetchedPayload, MAX_MULTIGET};
pub use crate::codec::VCardCodec;
pub use crate::config::{APP_NAME, Config, SyncConfig};
pub use crate::diff::{Diff, diff};
pub use crate::error::{CodecError, StoreError, SyncError};
pub use crate::localdb::SqliteStore;
pub use crate::sync::SyncManager;
pub use crate::traits::{AssetFetcher, LocalStore, RecordCodec, RemoteCollection};
pub use crate::types::{
    Capabilities, LocalRecord, PayloadFormat, RemoteFetchResult, RemoteListing, SyncOptions,
    SyncStats,
};
