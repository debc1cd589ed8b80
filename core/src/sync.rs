// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The reconciliation pipeline.

use std::collections::HashMap;
use std::fmt;

use davsync_carddav::ETag;

use crate::apply::apply_fetched;
use crate::batch::BatchPlanner;
use crate::diff::diff;
use crate::error::SyncError;
use crate::traits::{AssetFetcher, LocalStore, RecordCodec, RemoteCollection};
use crate::types::{LocalRecord, PayloadFormat, SyncOptions, SyncStats};

/// Runs sync attempts between a local store and a remote collection.
///
/// An attempt walks through its stages strictly in order and awaits every
/// request before issuing the next one:
///
/// 1. load the persisted change tag,
/// 2. discover the collection capabilities and its current change tag,
/// 3. push local deletions,
/// 4. name new records,
/// 5. upload dirty records,
/// 6. stop early if the change tag didn't move,
/// 7. index local records,
/// 8. list the remote collection,
/// 9. delete, download and apply what changed remotely,
/// 10. persist the observed change tag.
///
/// A failed attempt leaves the persisted change tag untouched, so the next
/// attempt lists the collection again.
pub struct SyncManager<'a, S, R, C>
where
    S: LocalStore + ?Sized,
    R: RemoteCollection + ?Sized,
    C: RecordCodec<Record = S::Payload> + ?Sized,
{
    store: &'a S,
    remote: &'a R,
    codec: &'a C,
    assets: &'a dyn AssetFetcher,
    options: SyncOptions,
}

impl<S, R, C> fmt::Debug for SyncManager<'_, S, R, C>
where
    S: LocalStore + ?Sized,
    R: RemoteCollection + ?Sized,
    C: RecordCodec<Record = S::Payload> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncManager")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a, S, R, C> SyncManager<'a, S, R, C>
where
    S: LocalStore + ?Sized,
    R: RemoteCollection + ?Sized,
    C: RecordCodec<Record = S::Payload> + ?Sized,
{
    /// Binds the collaborators of an attempt.
    pub fn new(
        store: &'a S,
        remote: &'a R,
        codec: &'a C,
        assets: &'a dyn AssetFetcher,
    ) -> Self {
        Self {
            store,
            remote,
            codec,
            assets,
            options: SyncOptions::default(),
        }
    }

    /// Replaces the attempt options.
    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs one sync attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails, the server omits a
    /// mandatory field, or a request fails other than a deletion, an update
    /// of a known record or a conflicting create.
    pub async fn run(&self) -> Result<SyncStats, SyncError> {
        let mut stats = SyncStats::default();

        let persisted = self.store.change_token().await?;
        tracing::info!(manual = self.options.manual, ?persisted, "starting sync");

        let capabilities = self.remote.discover_capabilities().await?;
        let format = capabilities.upload_format();
        tracing::debug!(?format, supports_vcard4 = capabilities.supports_vcard4, "capabilities");

        self.push_deletions(&mut stats).await?;
        self.assign_identities().await?;
        self.push_dirty(format).await?;

        let observed = capabilities.change_token.as_deref();
        if !self.options.manual && observed.is_some() && observed == persisted.as_deref() {
            tracing::info!(ctag = ?observed, "collection unchanged, skipping listing");
            stats.unchanged = true;
        } else {
            let local = self.list_local().await?;
            let remote = self.list_remote().await?;
            self.download(local, remote, capabilities.supports_vcard4, &mut stats)
                .await?;
        }

        self.store.set_change_token(observed).await?;
        tracing::info!(%stats, "sync finished");
        Ok(stats)
    }

    async fn push_deletions(&self, stats: &mut SyncStats) -> Result<(), SyncError> {
        for record in self.store.list_deleted().await? {
            if let Some(file_name) = &record.file_name {
                tracing::info!(%file_name, "deleting on server");
                if let Err(err) = self.remote.delete(file_name, record.etag.as_ref()).await {
                    tracing::warn!(%file_name, %err, "couldn't delete on server, ignoring");
                }
            }

            self.store.delete(&record).await?;
            stats.deletes += 1;
        }
        Ok(())
    }

    async fn assign_identities(&self) -> Result<(), SyncError> {
        for mut record in self.store.list_unnamed().await? {
            let uid = uuid::Uuid::new_v4().to_string();
            let file_name = format!("{uid}.{}", self.codec.file_extension());
            tracing::debug!(id = record.id, %file_name, "assigning file name");

            self.codec.set_uid(&mut record.payload, &uid);
            self.store.assign_name(&record, &file_name).await?;
        }
        Ok(())
    }

    async fn push_dirty(&self, format: PayloadFormat) -> Result<(), SyncError> {
        for record in self.store.list_dirty().await? {
            let Some(file_name) = record.file_name.as_deref() else {
                tracing::warn!(id = record.id, "dirty record has no file name, skipping");
                continue;
            };

            let payload = match self.codec.encode(&record.payload, format) {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::error!(%file_name, %err, "couldn't encode record, leaving it dirty");
                    continue;
                }
            };

            let create_only = record.etag.is_none();
            tracing::info!(%file_name, create_only, "uploading");
            let result = self
                .remote
                .put(file_name, payload, format, record.etag.as_ref(), create_only)
                .await;

            match result {
                Ok(etag) => {
                    tracing::debug!(%file_name, etag = ?etag, "uploaded");
                    self.store.clear_dirty(&record, etag.as_ref()).await?;
                }
                Err(err) if err.is_precondition_failed() => {
                    tracing::info!(
                        %file_name,
                        "changed on server in the meantime, will retry after download"
                    );
                }
                // new records must reach the server before the download
                Err(err) if create_only => return Err(err.into()),
                Err(err) => {
                    tracing::warn!(%file_name, %err, "couldn't upload record, leaving it dirty");
                }
            }
        }
        Ok(())
    }

    async fn list_local(&self) -> Result<HashMap<String, LocalRecord<S::Payload>>, SyncError> {
        let records = self.store.list_all().await?;
        let mut local = HashMap::with_capacity(records.len());
        for record in records {
            match record.file_name.clone() {
                Some(file_name) => {
                    local.insert(file_name, record);
                }
                None => tracing::warn!(id = record.id, "record has no file name, ignoring"),
            }
        }
        tracing::debug!(count = local.len(), "indexed local records");
        Ok(local)
    }

    async fn list_remote(&self) -> Result<HashMap<String, Option<ETag>>, SyncError> {
        let listing = self.remote.list().await?;
        tracing::debug!(count = listing.len(), "listed remote collection");
        Ok(listing
            .into_iter()
            .map(|entry| (entry.file_name, entry.etag))
            .collect())
    }

    async fn download(
        &self,
        mut local: HashMap<String, LocalRecord<S::Payload>>,
        remote: HashMap<String, Option<ETag>>,
        supports_vcard4: bool,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        let versions = local
            .iter()
            .map(|(name, record)| (name.clone(), record.etag.clone()))
            .collect();
        let diff = diff(versions, remote)?;

        for name in &diff.delete {
            if let Some(record) = local.remove(name) {
                self.store.delete(&record).await?;
                stats.deletes += 1;
            }
        }
        stats.skipped += diff.skipped;

        let names = diff.download();
        let planner = BatchPlanner::new(self.options.batch_size);
        for batch in planner.batches(&names) {
            let fetched = planner
                .fetch_batch(self.remote, batch, supports_vcard4)
                .await?;
            for entry in fetched {
                let existing = local.get(&entry.file_name);
                apply_fetched(self.store, self.codec, self.assets, existing, entry, stats).await?;
            }
        }
        Ok(())
    }
}
