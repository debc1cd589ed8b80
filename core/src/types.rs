// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use davsync_carddav::ETag;
use davsync_vcard::Version;

/// A record owned by the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRecord<T> {
    /// Store-assigned identity, never changes.
    pub id: i64,

    /// Remote resource name, e.g. `0c6a….vcf`. `None` until the record has
    /// been named; only named records are addressable remotely.
    pub file_name: Option<String>,

    /// Last known remote version, `None` if never synced.
    pub etag: Option<ETag>,

    /// Modified locally since the last successful upload.
    pub dirty: bool,

    /// Deleted locally. A deleted record is never dirty.
    pub deleted: bool,

    /// The structured record.
    pub payload: T,
}

/// One member of a remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteListing {
    /// Last path segment of the member href.
    pub file_name: String,

    /// Current remote version.
    pub etag: Option<ETag>,
}

/// A remote resource together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFetchResult {
    /// Last path segment of the member href.
    pub file_name: String,

    /// Current remote version.
    pub etag: Option<ETag>,

    /// `Content-Type` of the payload, used to find its charset.
    pub content_type: Option<String>,

    /// Raw payload bytes.
    pub payload: Option<Vec<u8>>,
}

/// Collection state observed at the start of an attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Collection change tag (`getctag`), compared for equality only.
    pub change_token: Option<String>,

    /// The server accepts and serves vCard 4.0.
    pub supports_vcard4: bool,
}

impl Capabilities {
    /// Format used for uploads.
    #[must_use]
    pub fn upload_format(&self) -> PayloadFormat {
        if self.supports_vcard4 {
            PayloadFormat::VCard4
        } else {
            PayloadFormat::VCard3
        }
    }
}

/// Wire format of an uploaded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// vCard 3.0, UTF-8.
    VCard3,

    /// vCard 4.0.
    VCard4,
}

impl PayloadFormat {
    /// `Content-Type` sent with the payload.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::VCard3 => "text/vcard; charset=utf-8",
            Self::VCard4 => "text/vcard; version=4.0",
        }
    }

    /// Corresponding vCard version.
    #[must_use]
    pub const fn version(self) -> Version {
        match self {
            Self::VCard3 => Version::V3_0,
            Self::VCard4 => Version::V4_0,
        }
    }
}

/// Counters of one sync attempt. Purely observational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records created locally from remote data.
    pub inserts: u64,

    /// Local records overwritten with remote data.
    pub updates: u64,

    /// Records deleted on either side.
    pub deletes: u64,

    /// Records whose local and remote versions already matched.
    pub skipped: u64,

    /// The collection was unchanged and listing was skipped.
    pub unchanged: bool,
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} deleted, {} skipped",
            self.inserts, self.updates, self.deletes, self.skipped
        )?;
        if self.unchanged {
            write!(f, " (collection unchanged)")?;
        }
        Ok(())
    }
}

/// Per-attempt options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Ignore the change tag and always list the collection.
    pub manual: bool,

    /// Maximum number of resources per bulk fetch.
    pub batch_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            manual: false,
            batch_size: crate::batch::MAX_MULTIGET,
        }
    }
}
