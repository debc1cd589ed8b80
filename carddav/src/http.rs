// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with authentication and `ETag` handling.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use crate::config::{AuthMethod, CardDavConfig};
use crate::error::CardDavError;
use crate::types::{ETag, Href};

/// HTTP client for `CardDAV` operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: CardDavConfig,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: CardDavConfig) -> Result<Self, CardDavError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    /// Builds a request with authentication headers.
    pub fn build_request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut req = self.client.request(method, url);

        match &self.config.auth {
            AuthMethod::Basic { username, password } => {
                req = req.basic_auth(username, Some(password));
            }
            AuthMethod::Bearer { token } => {
                req = req.bearer_auth(token);
            }
            AuthMethod::None => {}
        }

        req
    }

    /// Executes a request and checks for HTTP errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns an error status code.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, CardDavError> {
        let resp = req.send().await?;

        match resp.status() {
            status if status.is_success() => Ok(resp),
            StatusCode::PRECONDITION_FAILED => Err(CardDavError::PreconditionFailed(
                resp.headers()
                    .get("ETag")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown")
                    .to_string(),
            )),
            StatusCode::NOT_FOUND => Err(CardDavError::NotFound(Href::new(
                resp.url().path().to_string(),
            ))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(CardDavError::Auth(resp.status().to_string()))
            }
            status => {
                let text = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read response".to_string());
                Err(CardDavError::Http(format!("{status}: {text}")))
            }
        }
    }

    /// Adds If-Match header for conditional updates and deletions.
    pub fn if_match(req: RequestBuilder, etag: &ETag) -> RequestBuilder {
        req.header("If-Match", etag.as_str())
    }

    /// Adds `If-None-Match: *` so that a PUT only creates and never overwrites.
    pub fn if_none_match_any(req: RequestBuilder) -> RequestBuilder {
        req.header("If-None-Match", "*")
    }

    /// Extracts `ETag` from response headers, if present.
    pub fn extract_etag(resp: &Response) -> Option<ETag> {
        resp.headers()
            .get("ETag")
            .and_then(|v| v.to_str().ok())
            .map(|s| ETag::new(s.to_string()))
    }

    /// Extracts the `Content-Type` header, if present.
    pub fn extract_content_type(resp: &Response) -> Option<String> {
        resp.headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Creates a `WebDAV` extension method such as `PROPFIND` or `REPORT`.
pub fn dav_method(name: &'static str) -> Result<Method, CardDavError> {
    Method::from_bytes(name.as_bytes())
        .map_err(|e| CardDavError::Http(format!("Invalid method: {e}")))
}
