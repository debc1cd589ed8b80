// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use davsync_carddav::{AddressObject, CardDavClient, CardDavError, ETag, Href};

use crate::traits::RemoteCollection;
use crate::types::{Capabilities, PayloadFormat, RemoteFetchResult, RemoteListing};

#[async_trait]
impl RemoteCollection for CardDavClient {
    async fn discover_capabilities(&self) -> Result<Capabilities, CardDavError> {
        let collection = self.collection().await?;
        tracing::debug!(
            ctag = ?collection.ctag,
            display_name = ?collection.display_name,
            "discovered address book"
        );
        Ok(Capabilities {
            supports_vcard4: collection.supports_vcard4(),
            change_token: collection.ctag,
        })
    }

    async fn list(&self) -> Result<Vec<RemoteListing>, CardDavError> {
        let members = self.list_members().await?;
        Ok(members
            .into_iter()
            .map(|object| RemoteListing {
                file_name: object.href.file_name().into_owned(),
                etag: object.etag,
            })
            .collect())
    }

    async fn fetch_one(
        &self,
        file_name: &str,
        accept: &str,
    ) -> Result<RemoteFetchResult, CardDavError> {
        let object = self.get(&self.member_href(file_name), accept).await?;
        Ok(into_fetch_result(object))
    }

    async fn fetch_many(
        &self,
        file_names: &[String],
        prefer_vcard4: bool,
    ) -> Result<Vec<RemoteFetchResult>, CardDavError> {
        let hrefs: Vec<Href> = file_names
            .iter()
            .map(|name| self.member_href(name))
            .collect();
        let objects = self.multiget(&hrefs, prefer_vcard4).await?;
        Ok(objects.into_iter().map(into_fetch_result).collect())
    }

    async fn put(
        &self,
        file_name: &str,
        payload: Vec<u8>,
        format: PayloadFormat,
        match_etag: Option<&ETag>,
        create_only: bool,
    ) -> Result<Option<ETag>, CardDavError> {
        CardDavClient::put(
            self,
            &self.member_href(file_name),
            payload,
            format.content_type(),
            match_etag,
            create_only,
        )
        .await
    }

    async fn delete(&self, file_name: &str, match_etag: Option<&ETag>) -> Result<(), CardDavError> {
        CardDavClient::delete(self, &self.member_href(file_name), match_etag).await
    }
}

fn into_fetch_result(object: AddressObject) -> RemoteFetchResult {
    RemoteFetchResult {
        file_name: object.href.file_name().into_owned(),
        etag: object.etag,
        content_type: object.content_type,
        payload: object.address_data,
    }
}
