// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Three-way classification of local and remote member names.

use std::collections::HashMap;

use davsync_carddav::ETag;

use crate::error::SyncError;

/// Outcome of comparing the local and the remote index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Present locally, gone remotely: delete the local record.
    pub delete: Vec<String>,

    /// Present on both sides with different versions: download.
    pub update: Vec<String>,

    /// Present only remotely: download.
    pub add: Vec<String>,

    /// Present on both sides with equal versions.
    pub skipped: u64,
}

impl Diff {
    /// Names to download, sorted.
    #[must_use]
    pub fn download(&self) -> Vec<String> {
        let mut names: Vec<String> = self.update.iter().chain(&self.add).cloned().collect();
        names.sort();
        names
    }
}

/// Compares the local index against the remote listing.
///
/// Every local name is looked up once and its remote entry removed; whatever
/// remains afterwards only exists remotely.
///
/// # Errors
///
/// Returns [`SyncError::Protocol`] if a remote entry has no `ETag`.
pub fn diff(
    local: HashMap<String, Option<ETag>>,
    mut remote: HashMap<String, Option<ETag>>,
) -> Result<Diff, SyncError> {
    let mut result = Diff::default();

    for (name, local_etag) in local {
        let Some(remote_etag) = remote.remove(&name) else {
            tracing::info!(file_name = %name, "not on server anymore, deleting locally");
            result.delete.push(name);
            continue;
        };

        let remote_etag = remote_etag
            .ok_or_else(|| SyncError::protocol(format!("server didn't provide ETag for {name}")))?;
        if local_etag.as_ref() == Some(&remote_etag) {
            result.skipped += 1;
        } else {
            tracing::info!(
                file_name = %name,
                current = %remote_etag,
                last_known = ?local_etag,
                "changed on server"
            );
            result.update.push(name);
        }
    }

    for (name, etag) in remote {
        if etag.is_none() {
            return Err(SyncError::protocol(format!(
                "server didn't provide ETag for {name}"
            )));
        }
        result.add.push(name);
    }
    if !result.add.is_empty() {
        tracing::info!(names = ?result.add, "new members found on server");
    }

    result.delete.sort();
    result.update.sort();
    result.add.sort();
    Ok(result)
}
