// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use davsync_carddav::CardDavError;
use davsync_vcard::VCardError;

/// Errors that abort a sync attempt.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The local store failed.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// The server response is missing a mandatory field.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A remote request failed.
    #[error("remote error: {0}")]
    Remote(#[from] CardDavError),
}

impl SyncError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

/// Local store failures.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database access failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored payload could not be (de)serialized.
    #[error("invalid stored payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// No record with this id exists.
    #[error("record #{0} not found")]
    NotFound(i64),

    /// The database path is not valid UTF-8.
    #[error("invalid database path: {0}")]
    InvalidPath(String),
}

/// Record codec failures. These never abort an attempt.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload could not be parsed.
    #[error("failed to decode payload: {0}")]
    Decode(#[from] VCardError),

    /// The record could not be serialized.
    #[error("failed to encode record: {0}")]
    Encode(#[from] std::io::Error),
}
