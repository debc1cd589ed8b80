// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory collaborators.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use davsync_carddav::{CardDavError, ETag, Href};
use davsync_core::{
    AssetFetcher, Capabilities, PayloadFormat, RemoteCollection, RemoteFetchResult, RemoteListing,
};

/// A request received by [`FakeRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Discover,
    List,
    FetchOne {
        file_name: String,
        accept: String,
    },
    FetchMany {
        file_names: Vec<String>,
        prefer_vcard4: bool,
    },
    Put {
        file_name: String,
        match_etag: Option<ETag>,
        create_only: bool,
    },
    Delete {
        file_name: String,
        match_etag: Option<ETag>,
    },
}

#[derive(Debug, Clone)]
struct Member {
    etag: Option<ETag>,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    ctag: Option<String>,
    supports_vcard4: bool,
    fail_deletes: bool,
    fail_puts: bool,
    members: BTreeMap<String, Member>,
    vanished: BTreeMap<String, ETag>,
    calls: Vec<Call>,
    version: u64,
}

impl State {
    /// Bumps the collection version and returns a fresh `ETag`.
    fn touch(&mut self) -> ETag {
        self.version += 1;
        if self.ctag.is_some() {
            self.ctag = Some(format!("ctag-{}", self.version));
        }
        ETag::new(format!("\"etag-{}\"", self.version))
    }
}

/// An address book kept in memory.
///
/// Conditional writes behave like a `CardDAV` server: a create-only write to
/// an existing member and a write whose `ETag` doesn't match the current one
/// fail with a precondition error, and so does a deletion whose `ETag`
/// doesn't match. Every write changes the change tag.
#[derive(Debug, Default)]
pub struct FakeRemote {
    state: Mutex<State>,
}

impl FakeRemote {
    /// Creates an empty collection with change tag `ctag-0`.
    #[must_use]
    pub fn new() -> Self {
        let remote = Self::default();
        remote.set_ctag(Some("ctag-0"));
        remote
    }

    pub fn set_ctag(&self, ctag: Option<&str>) {
        self.state.lock().unwrap().ctag = ctag.map(str::to_string);
    }

    pub fn ctag(&self) -> Option<String> {
        self.state.lock().unwrap().ctag.clone()
    }

    pub fn set_supports_vcard4(&self, supported: bool) {
        self.state.lock().unwrap().supports_vcard4 = supported;
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }

    /// Rejects every upload with an authorization error.
    pub fn set_fail_puts(&self, fail: bool) {
        self.state.lock().unwrap().fail_puts = fail;
    }

    /// Lists a member that is already gone when fetched.
    pub fn put_vanished_member(&self, file_name: &str, etag: &str) {
        self.state
            .lock()
            .unwrap()
            .vanished
            .insert(file_name.to_string(), ETag::from(etag));
    }

    /// Stores a member as another client would, without touching the change tag.
    pub fn put_member(&self, file_name: &str, etag: Option<&str>, data: impl Into<Vec<u8>>) {
        self.state.lock().unwrap().members.insert(
            file_name.to_string(),
            Member {
                etag: etag.map(ETag::from),
                data: data.into(),
            },
        );
    }

    /// Removes a member as another client would, without touching the change tag.
    pub fn remove_member(&self, file_name: &str) {
        self.state.lock().unwrap().members.remove(file_name);
    }

    pub fn member(&self, file_name: &str) -> Option<(Option<ETag>, String)> {
        self.state.lock().unwrap().members.get(file_name).map(|m| {
            (
                m.etag.clone(),
                String::from_utf8_lossy(&m.data).into_owned(),
            )
        })
    }

    pub fn member_names(&self) -> Vec<String> {
        self.state.lock().unwrap().members.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl RemoteCollection for FakeRemote {
    async fn discover_capabilities(&self) -> Result<Capabilities, CardDavError> {
        self.record(Call::Discover);
        let state = self.state.lock().unwrap();
        Ok(Capabilities {
            change_token: state.ctag.clone(),
            supports_vcard4: state.supports_vcard4,
        })
    }

    async fn list(&self) -> Result<Vec<RemoteListing>, CardDavError> {
        self.record(Call::List);
        let state = self.state.lock().unwrap();
        let members = state.members.iter().map(|(name, member)| RemoteListing {
            file_name: name.clone(),
            etag: member.etag.clone(),
        });
        let vanished = state.vanished.iter().map(|(name, etag)| RemoteListing {
            file_name: name.clone(),
            etag: Some(etag.clone()),
        });
        Ok(members.chain(vanished).collect())
    }

    async fn fetch_one(
        &self,
        file_name: &str,
        accept: &str,
    ) -> Result<RemoteFetchResult, CardDavError> {
        self.record(Call::FetchOne {
            file_name: file_name.to_string(),
            accept: accept.to_string(),
        });
        let state = self.state.lock().unwrap();
        let member = state
            .members
            .get(file_name)
            .ok_or_else(|| CardDavError::NotFound(Href::from(file_name)))?;
        Ok(RemoteFetchResult {
            file_name: file_name.to_string(),
            etag: member.etag.clone(),
            content_type: Some("text/vcard; charset=utf-8".to_string()),
            payload: Some(member.data.clone()),
        })
    }

    async fn fetch_many(
        &self,
        file_names: &[String],
        prefer_vcard4: bool,
    ) -> Result<Vec<RemoteFetchResult>, CardDavError> {
        self.record(Call::FetchMany {
            file_names: file_names.to_vec(),
            prefer_vcard4,
        });
        let state = self.state.lock().unwrap();
        Ok(file_names
            .iter()
            .filter_map(|name| {
                state.members.get(name).map(|member| RemoteFetchResult {
                    file_name: name.clone(),
                    etag: member.etag.clone(),
                    content_type: None,
                    payload: Some(member.data.clone()),
                })
            })
            .collect())
    }

    async fn put(
        &self,
        file_name: &str,
        payload: Vec<u8>,
        _format: PayloadFormat,
        match_etag: Option<&ETag>,
        create_only: bool,
    ) -> Result<Option<ETag>, CardDavError> {
        self.record(Call::Put {
            file_name: file_name.to_string(),
            match_etag: match_etag.cloned(),
            create_only,
        });

        let mut state = self.state.lock().unwrap();
        if state.fail_puts {
            return Err(CardDavError::Auth("403 Forbidden".to_string()));
        }
        let current = state.members.get(file_name).map(|m| m.etag.clone());
        let conflict = match (current, match_etag) {
            (Some(_), _) if create_only => true,
            (Some(current), Some(expected)) => current.as_ref() != Some(expected),
            (None, Some(_)) => true,
            _ => false,
        };
        if conflict {
            return Err(CardDavError::PreconditionFailed(file_name.to_string()));
        }

        let etag = state.touch();
        state.members.insert(
            file_name.to_string(),
            Member {
                etag: Some(etag.clone()),
                data: payload,
            },
        );
        Ok(Some(etag))
    }

    async fn delete(&self, file_name: &str, match_etag: Option<&ETag>) -> Result<(), CardDavError> {
        self.record(Call::Delete {
            file_name: file_name.to_string(),
            match_etag: match_etag.cloned(),
        });

        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            return Err(CardDavError::Http("connection reset".to_string()));
        }
        if let (Some(member), Some(expected)) = (state.members.get(file_name), match_etag)
            && member.etag.as_ref() != Some(expected)
        {
            return Err(CardDavError::PreconditionFailed(file_name.to_string()));
        }
        if state.members.remove(file_name).is_some() {
            state.touch();
        }
        Ok(())
    }
}

/// Asset fetcher that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAssets;

#[async_trait]
impl AssetFetcher for NoAssets {
    async fn fetch(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }
}
