// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod contacts;
mod sync_state;


use std::marker::PhantomData;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use davsync_carddav::ETag;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;
use crate::localdb::contacts::{ContactFilter, ContactRecord, Contacts};
use crate::localdb::sync_state::SyncState;
use crate::traits::LocalStore;
use crate::types::LocalRecord;

const CHANGE_TOKEN_KEY: &str = "ctag";

/// SQLite-backed local store. Payloads are kept as JSON.
#[derive(Debug, Clone)]
pub struct SqliteStore<T> {
    pool: SqlitePool,
    contacts: Contacts,
    sync_state: SyncState,
    _payload: PhantomData<fn() -> T>,
}

impl<T> SqliteStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens a sqlite database connection.
    /// If `filename` is `None`, it opens an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if connecting or migrating fails.
    pub async fn open(filename: Option<&Path>) -> Result<Self, StoreError> {
        let (options, pool_options) = if let Some(filename) = filename {
            tracing::info!(path = %filename.display(), "connecting to SQLite database");
            let path = filename
                .to_str()
                .ok_or_else(|| StoreError::InvalidPath(filename.display().to_string()))?;
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            (options, SqlitePoolOptions::new())
        } else {
            tracing::info!("connecting to in-memory SQLite database");
            // an in-memory database lives as long as its only connection
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
            (SqliteConnectOptions::new().in_memory(true), pool_options)
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("src/localdb/migrations") // relative path from the crate root
            .run(&pool)
            .await?;

        tracing::debug!("ensuring tables in the database");
        Ok(Self {
            contacts: Contacts::new(pool.clone()),
            sync_state: SyncState::new(pool.clone()),
            pool,
            _payload: PhantomData,
        })
    }

    /// Creates a new, dirty and unnamed record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn create(&self, payload: &T) -> Result<i64, StoreError> {
        let payload = serde_json::to_string(payload)?;
        let id = self.contacts.insert(None, None, true, &payload).await?;
        tracing::debug!(id, "created local record");
        Ok(id)
    }

    /// Stores a local modification and marks the record dirty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no such live record.
    pub async fn modify(&self, id: i64, payload: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_string(payload)?;
        let affected = self.contacts.update_local(id, &payload).await?;
        ensure_affected(affected, id)
    }

    /// Marks a record deleted; the deletion is pushed on the next sync.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no such record.
    pub async fn mark_deleted(&self, id: i64) -> Result<(), StoreError> {
        let affected = self.contacts.mark_deleted(id).await?;
        ensure_affected(affected, id)
    }

    /// Looks a record up by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the payload is invalid.
    pub async fn get(&self, id: i64) -> Result<Option<LocalRecord<T>>, StoreError> {
        self.contacts.get(id).await?.map(into_local).transpose()
    }

    /// Looks a record up by its remote file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the payload is invalid.
    pub async fn find_by_file_name(
        &self,
        file_name: &str,
    ) -> Result<Option<LocalRecord<T>>, StoreError> {
        self.contacts
            .get_by_file_name(file_name)
            .await?
            .map(into_local)
            .transpose()
    }

    /// Closes the database connection.
    pub async fn close(self) {
        tracing::debug!("closing database connection");
        self.pool.close().await;
    }

    async fn list(&self, filter: ContactFilter) -> Result<Vec<LocalRecord<T>>, StoreError> {
        self.contacts
            .list(filter)
            .await?
            .into_iter()
            .map(into_local)
            .collect()
    }
}

#[async_trait]
impl<T> LocalStore for SqliteStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    type Payload = T;

    async fn list_all(&self) -> Result<Vec<LocalRecord<T>>, StoreError> {
        self.list(ContactFilter::All).await
    }

    async fn list_dirty(&self) -> Result<Vec<LocalRecord<T>>, StoreError> {
        self.list(ContactFilter::Dirty).await
    }

    async fn list_deleted(&self) -> Result<Vec<LocalRecord<T>>, StoreError> {
        self.list(ContactFilter::Deleted).await
    }

    async fn list_unnamed(&self) -> Result<Vec<LocalRecord<T>>, StoreError> {
        self.list(ContactFilter::Unnamed).await
    }

    async fn assign_name(&self, record: &LocalRecord<T>, file_name: &str) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&record.payload)?;
        let affected = self
            .contacts
            .assign_name(record.id, file_name, &payload)
            .await?;
        ensure_affected(affected, record.id)
    }

    async fn delete(&self, record: &LocalRecord<T>) -> Result<(), StoreError> {
        self.contacts.delete(record.id).await?;
        Ok(())
    }

    async fn insert(&self, payload: &T, file_name: &str, etag: &ETag) -> Result<i64, StoreError> {
        let payload = serde_json::to_string(payload)?;
        let id = self
            .contacts
            .insert(Some(file_name), Some(etag.as_str()), false, &payload)
            .await?;
        Ok(id)
    }

    async fn update(
        &self,
        record: &LocalRecord<T>,
        payload: &T,
        etag: &ETag,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(payload)?;
        let affected = self
            .contacts
            .update_remote(record.id, etag.as_str(), &payload)
            .await?;
        ensure_affected(affected, record.id)
    }

    async fn clear_dirty(&self, record: &LocalRecord<T>, etag: Option<&ETag>) -> Result<(), StoreError> {
        let affected = self
            .contacts
            .clear_dirty(record.id, etag.map(ETag::as_str))
            .await?;
        ensure_affected(affected, record.id)
    }

    async fn change_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.sync_state.get(CHANGE_TOKEN_KEY).await?)
    }

    async fn set_change_token(&self, token: Option<&str>) -> Result<(), StoreError> {
        self.sync_state.set(CHANGE_TOKEN_KEY, token).await?;
        Ok(())
    }
}

fn into_local<T: DeserializeOwned>(record: ContactRecord) -> Result<LocalRecord<T>, StoreError> {
    Ok(LocalRecord {
        id: record.id,
        file_name: record.file_name,
        etag: record.etag.map(ETag::new),
        dirty: record.dirty,
        deleted: record.deleted,
        payload: serde_json::from_str(&record.payload)?,
    })
}

fn ensure_affected(affected: u64, id: i64) -> Result<(), StoreError> {
    match affected {
        0 => Err(StoreError::NotFound(id)),
        _ => Ok(()),
    }
}
