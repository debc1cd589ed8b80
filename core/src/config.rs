// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};

use davsync_carddav::CardDavConfig;

use crate::batch::MAX_MULTIGET;
use crate::types::SyncOptions;

/// The name of the application, used for state and config directories.
pub const APP_NAME: &str = "davsync";

const DATABASE_FILE: &str = "davsync.db";

/// Configuration of one synchronized address book.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Server and collection to synchronize with.
    pub carddav: CardDavConfig,

    /// Sync tuning and local storage.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Sync tuning and local storage.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SyncConfig {
    /// Maximum number of resources per `addressbook-multiget`.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Directory holding the local database.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            state_dir: None,
        }
    }
}

const fn default_batch_size() -> usize {
    MAX_MULTIGET
}

impl Config {
    /// Normalize the configuration.
    ///
    /// # Errors
    ///
    /// Fails if the state directory cannot be expanded.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        match &self.sync.state_dir {
            Some(a) => {
                self.sync.state_dir = Some(
                    expand_path(a)
                        .map_err(|e| format!("Failed to expand state directory path: {e}"))?,
                );
            }

            None => match get_state_dir() {
                Ok(a) => self.sync.state_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        }

        if self.sync.batch_size == 0 {
            tracing::warn!("batch_size must be positive, using 1");
            self.sync.batch_size = 1;
        }

        Ok(())
    }

    /// Location of the local database; `None` keeps it in memory.
    #[must_use]
    pub fn database_path(&self) -> Option<PathBuf> {
        self.sync
            .state_dir
            .as_ref()
            .map(|dir| dir.join(DATABASE_FILE))
    }

    /// Options for a sync attempt.
    #[must_use]
    pub fn sync_options(&self, manual: bool) -> SyncOptions {
        SyncOptions {
            manual,
            batch_size: self.sync.batch_size,
        }
    }
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle state directories
    let state_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_STATE_HOME/", "${XDG_STATE_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in state_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_state_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or_else(|| "User-specific home directory not found".into())
}

fn get_state_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_local_dir();
    state_dir.ok_or_else(|| "User-specific state directory not found".into())
}
