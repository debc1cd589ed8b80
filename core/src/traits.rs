// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Collaborators driven by the sync pipeline.

use async_trait::async_trait;
use davsync_carddav::{CardDavError, ETag};

use crate::error::{CodecError, StoreError};
use crate::types::{Capabilities, LocalRecord, PayloadFormat, RemoteFetchResult, RemoteListing};

/// Local record storage plus the persisted collection change tag.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Structured record type kept in the store.
    type Payload: Send + Sync;

    /// All records.
    async fn list_all(&self) -> Result<Vec<LocalRecord<Self::Payload>>, StoreError>;

    /// Records modified since their last upload.
    async fn list_dirty(&self) -> Result<Vec<LocalRecord<Self::Payload>>, StoreError>;

    /// Records deleted locally but not yet removed.
    async fn list_deleted(&self) -> Result<Vec<LocalRecord<Self::Payload>>, StoreError>;

    /// Records without a remote file name.
    async fn list_unnamed(&self) -> Result<Vec<LocalRecord<Self::Payload>>, StoreError>;

    /// Persists the file name and the payload of `record`, whose payload
    /// already carries the matching unique id.
    async fn assign_name(
        &self,
        record: &LocalRecord<Self::Payload>,
        file_name: &str,
    ) -> Result<(), StoreError>;

    /// Removes a record.
    async fn delete(&self, record: &LocalRecord<Self::Payload>) -> Result<(), StoreError>;

    /// Inserts a clean record downloaded from the server and returns its id.
    async fn insert(
        &self,
        payload: &Self::Payload,
        file_name: &str,
        etag: &ETag,
    ) -> Result<i64, StoreError>;

    /// Overwrites payload and version of an existing record.
    async fn update(
        &self,
        record: &LocalRecord<Self::Payload>,
        payload: &Self::Payload,
        etag: &ETag,
    ) -> Result<(), StoreError>;

    /// Marks a record as uploaded with the version returned by the server.
    async fn clear_dirty(
        &self,
        record: &LocalRecord<Self::Payload>,
        etag: Option<&ETag>,
    ) -> Result<(), StoreError>;

    /// The change tag persisted by the last completed attempt.
    async fn change_token(&self) -> Result<Option<String>, StoreError>;

    /// Persists the change tag observed by this attempt.
    async fn set_change_token(&self, token: Option<&str>) -> Result<(), StoreError>;
}

/// A remote collection addressed by member file names.
///
/// Conditional writes that fail their precondition report
/// [`CardDavError::PreconditionFailed`].
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Reads the change tag and the supported payload formats.
    async fn discover_capabilities(&self) -> Result<Capabilities, CardDavError>;

    /// Lists member names with their versions.
    async fn list(&self) -> Result<Vec<RemoteListing>, CardDavError>;

    /// Fetches one member, negotiating the format with `accept`.
    async fn fetch_one(&self, file_name: &str, accept: &str)
    -> Result<RemoteFetchResult, CardDavError>;

    /// Fetches several members in one request.
    async fn fetch_many(
        &self,
        file_names: &[String],
        prefer_vcard4: bool,
    ) -> Result<Vec<RemoteFetchResult>, CardDavError>;

    /// Uploads a member and returns its new version if the server sent one.
    async fn put(
        &self,
        file_name: &str,
        payload: Vec<u8>,
        format: PayloadFormat,
        match_etag: Option<&ETag>,
        create_only: bool,
    ) -> Result<Option<ETag>, CardDavError>;

    /// Deletes a member.
    async fn delete(&self, file_name: &str, match_etag: Option<&ETag>) -> Result<(), CardDavError>;
}

/// Converts between structured records and wire payloads.
#[async_trait]
pub trait RecordCodec: Send + Sync {
    /// Structured record type.
    type Record: Send + Sync;

    /// Decodes every record contained in `bytes`, fetching external assets
    /// through `assets`.
    async fn decode(
        &self,
        bytes: &[u8],
        charset: &str,
        assets: &dyn AssetFetcher,
    ) -> Result<Vec<Self::Record>, CodecError>;

    /// Encodes one record.
    fn encode(&self, record: &Self::Record, format: PayloadFormat) -> Result<Vec<u8>, CodecError>;

    /// Sets the unique id embedded in the record.
    fn set_uid(&self, record: &mut Self::Record, uid: &str);

    /// File extension of remote resources, without the dot.
    fn file_extension(&self) -> &'static str;
}

/// Best-effort retrieval of externally referenced binary assets.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Returns the asset bytes, or `None` on any failure.
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}
