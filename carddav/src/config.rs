// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// `CardDAV` authentication method.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Basic authentication (username/password).
    #[serde(rename = "basic")]
    Basic {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Bearer token authentication (OAuth).
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// `CardDAV` address book configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CardDavConfig {
    /// Base URL of the `CardDAV` server, e.g. `https://dav.example.com`.
    pub base_url: String,
    /// Path of the address book collection, e.g. `/dav/addressbooks/user/contacts/`.
    pub addressbook: String,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl CardDavConfig {
    /// Returns the address book path with exactly one trailing slash.
    #[must_use]
    pub fn addressbook_path(&self) -> String {
        format!("{}/", self.addressbook.trim_end_matches('/'))
    }
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("davsync-carddav/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for CardDavConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            addressbook: String::new(),
            auth: AuthMethod::default(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}
