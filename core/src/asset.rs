// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use davsync_carddav::{AuthMethod, CardDavConfig};
use reqwest::{RequestBuilder, Url};

use crate::traits::AssetFetcher;

/// Downloads externally referenced assets such as contact photos.
///
/// Every download uses its own client scoped to the asset's host.
/// Credentials of the address book are only sent if the asset lives on the
/// same host as the collection.
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    collection_host: Option<String>,
    auth: AuthMethod,
    timeout: Duration,
    user_agent: String,
}

impl HttpAssetFetcher {
    /// Creates a fetcher for assets referenced from the given collection.
    #[must_use]
    pub fn new(config: &CardDavConfig) -> Self {
        let collection_host = Url::parse(&config.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase));

        Self {
            collection_host,
            auth: config.auth.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported scheme: {}", url.scheme()).into());
        }
        let host = url.host_str().map(str::to_ascii_lowercase);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;
        let mut request = client.get(url);
        if host.is_some() && host == self.collection_host {
            request = with_auth(request, &self.auth);
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Err("empty response body".into());
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        tracing::debug!(url, "downloading external resource");
        match self.try_fetch(url).await {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::error!(url, %err, "couldn't download external resource");
                None
            }
        }
    }
}

fn with_auth(request: RequestBuilder, auth: &AuthMethod) -> RequestBuilder {
    match auth {
        AuthMethod::Basic { username, password } => request.basic_auth(username, Some(password)),
        AuthMethod::Bearer { token } => request.bearer_auth(token),
        AuthMethod::None => request,
    }
}
