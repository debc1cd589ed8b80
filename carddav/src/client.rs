// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `CardDAV` client for address book operations.

use std::sync::Arc;

use reqwest::Method;

use crate::config::CardDavConfig;
use crate::error::CardDavError;
use crate::http::{HttpClient, dav_method};
use crate::request::{AddressBookMultiGetRequest, Prop, PropFindRequest};
use crate::response::MultiStatusResponse;
use crate::types::{AddressBookCollection, AddressObject, ETag, Href};

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// `CardDAV` client bound to a single address book collection.
///
/// # Example
///
/// ```ignore
/// use davsync_carddav::{AuthMethod, CardDavClient, CardDavConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CardDavConfig {
///     base_url: "https://dav.example.com".to_string(),
///     addressbook: "/dav/addressbooks/user/contacts/".to_string(),
///     auth: AuthMethod::Basic {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     },
///     ..Default::default()
/// };
///
/// let client = CardDavClient::new(config)?;
/// let members = client.list_members().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardDavClient {
    http: Arc<HttpClient>,
    config: CardDavConfig,
}

impl CardDavClient {
    /// Creates a new `CardDAV` client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or HTTP client
    /// initialization fails.
    pub fn new(config: CardDavConfig) -> Result<Self, CardDavError> {
        if config.base_url.is_empty() {
            return Err(CardDavError::Config("base_url is empty".to_string()));
        }

        let http = HttpClient::new(config.clone())?;
        Ok(Self {
            http: Arc::new(http),
            config,
        })
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &CardDavConfig {
        &self.config
    }

    /// Returns the href of the address book collection.
    #[must_use]
    pub fn collection_href(&self) -> Href {
        Href::new(self.config.addressbook_path())
    }

    /// Returns the href of the member resource called `file_name`.
    #[must_use]
    pub fn member_href(&self, file_name: &str) -> Href {
        Href::new(format!(
            "{}{}",
            self.config.addressbook_path(),
            urlencoding::encode(file_name)
        ))
    }

    /// Queries the collection itself: display name, `CTag` and supported media types.
    ///
    /// # Errors
    ///
    /// Returns an error if PROPFIND fails.
    pub async fn collection(&self) -> Result<AddressBookCollection, CardDavError> {
        let href = self.collection_href();

        let mut propfind = PropFindRequest::new();
        propfind.add_property(Prop::DisplayName);
        propfind.add_property(Prop::GetCTag);
        propfind.add_property(Prop::SupportedAddressData);

        let multistatus = self.propfind(&href, &propfind, 0).await?;
        multistatus.into_collection(&href)
    }

    /// Lists the members of the collection with their `ETag`s only.
    ///
    /// # Errors
    ///
    /// Returns an error if PROPFIND fails.
    pub async fn list_members(&self) -> Result<Vec<AddressObject>, CardDavError> {
        let href = self.collection_href();

        let mut propfind = PropFindRequest::new();
        propfind.add_property(Prop::ResourceType);
        propfind.add_property(Prop::GetETag);

        let multistatus = self.propfind(&href, &propfind, 1).await?;
        Ok(multistatus.into_objects(&href))
    }

    /// Downloads a single vCard with a plain GET.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, href: &Href, accept: &str) -> Result<AddressObject, CardDavError> {
        let url = self.full_url(href.as_str());
        let resp = self
            .http
            .execute(
                self.http
                    .build_request(Method::GET, &url)
                    .header("Accept", accept),
            )
            .await?;

        let mut object = AddressObject::new(href.clone());
        object.etag = HttpClient::extract_etag(&resp);
        object.content_type = HttpClient::extract_content_type(&resp);
        object.address_data = Some(resp.bytes().await?.to_vec());
        Ok(object)
    }

    /// Retrieves multiple vCards with an `addressbook-multiget` REPORT.
    ///
    /// # Errors
    ///
    /// Returns an error if the REPORT fails.
    pub async fn multiget(
        &self,
        hrefs: &[Href],
        vcard4: bool,
    ) -> Result<Vec<AddressObject>, CardDavError> {
        if hrefs.is_empty() {
            return Ok(Vec::new());
        }

        let collection = self.collection_href();
        let url = self.full_url(collection.as_str());

        let mut multiget = AddressBookMultiGetRequest::new();
        multiget.vcard4(vcard4);
        for href in hrefs {
            multiget.add_href(href.as_str().to_string());
        }
        let xml_body = multiget.build()?;

        let resp = self
            .http
            .execute(
                self.http
                    .build_request(dav_method("REPORT")?, &url)
                    .header("Content-Type", XML_CONTENT_TYPE)
                    .header("Depth", "1")
                    .body(xml_body),
            )
            .await?;

        let xml = resp.text().await?;
        let multistatus = MultiStatusResponse::from_xml(&xml)?;
        Ok(multistatus.into_objects(&collection))
    }

    /// Uploads a vCard.
    ///
    /// With `if_match` the write only succeeds if the server still has that
    /// version; with `create_only` it only succeeds if no resource exists
    /// yet. A failed precondition is reported as
    /// [`CardDavError::PreconditionFailed`]. Returns the new `ETag` if the
    /// server sent one.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    pub async fn put(
        &self,
        href: &Href,
        body: Vec<u8>,
        content_type: &str,
        if_match: Option<&ETag>,
        create_only: bool,
    ) -> Result<Option<ETag>, CardDavError> {
        let url = self.full_url(href.as_str());

        let mut req = self
            .http
            .build_request(Method::PUT, &url)
            .header("Content-Type", content_type)
            .body(body);
        if let Some(etag) = if_match {
            req = HttpClient::if_match(req, etag);
        }
        if create_only {
            req = HttpClient::if_none_match_any(req);
        }

        let resp = self.http.execute(req).await?;
        Ok(HttpClient::extract_etag(&resp))
    }

    /// Deletes a vCard, optionally only if it still has the given `ETag`.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, href: &Href, if_match: Option<&ETag>) -> Result<(), CardDavError> {
        let url = self.full_url(href.as_str());

        let mut req = self.http.build_request(Method::DELETE, &url);
        if let Some(etag) = if_match {
            req = HttpClient::if_match(req, etag);
        }

        self.http.execute(req).await?;
        Ok(())
    }

    async fn propfind(
        &self,
        href: &Href,
        request: &PropFindRequest,
        depth: u8,
    ) -> Result<MultiStatusResponse, CardDavError> {
        let url = self.full_url(href.as_str());
        let xml_body = request.build()?;

        let resp = self
            .http
            .execute(
                self.http
                    .build_request(dav_method("PROPFIND")?, &url)
                    .header("Content-Type", XML_CONTENT_TYPE)
                    .header("Depth", depth.to_string())
                    .body(xml_body),
            )
            .await?;

        let xml = resp.text().await?;
        MultiStatusResponse::from_xml(&xml)
    }

    /// Builds full URL from href.
    fn full_url(&self, href: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), href)
    }
}
