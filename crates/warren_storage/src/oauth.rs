/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! OAuth2 persistence: clients, authorizations, accesses and refresh
//! pointers, kept in four fixed sub-buckets of the root. Loads join the
//! records they reference; only the joins the protocol requires are fatal.

use crate::buckets::BucketRead;
use crate::errors::{Error, Result};
use crate::paths::join;
use crate::repository::Repository;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::warn;

pub const CLIENTS_BUCKET: &str = "clients";
pub const AUTHORIZE_BUCKET: &str = "authorize";
pub const ACCESS_BUCKET: &str = "access";
pub const REFRESH_BUCKET: &str = "refresh";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub secret: String,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub client: String,
    pub code: String,
    /// Lifetime in seconds, counted from `created_at`.
    pub expires_in: i64,
    pub scope: String,
    pub redirect_uri: String,
    pub state: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl Authorization {
    pub fn expire_at(&self) -> OffsetDateTime {
        self.created_at + Duration::seconds(self.expires_in)
    }

    pub fn is_expired(&self) -> bool {
        self.expire_at() < OffsetDateTime::now_utc()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Access {
    pub client: String,
    /// Code of the authorization this access was granted from, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authorize: String,
    /// Token of the access this one replaced, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub previous: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    pub expires_in: i64,
    pub scope: String,
    pub redirect_uri: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// Pointer record mapping a refresh token to its access token.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Refresh {
    access: String,
}

/// Authorization with its client joined.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedAuthorize {
    pub authorization: Authorization,
    pub client: Option<Client>,
}

/// Access with its client, originating authorization and previous access
/// joined, where available.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedAccess {
    pub access: Access,
    pub client: Option<Client>,
    pub authorization: Option<Authorization>,
    pub previous: Option<Access>,
}

fn encode<T: Serialize>(v: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(v).map_err(Error::encode)
}

fn decode<T: for<'de> Deserialize<'de>>(raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw).map_err(Error::decode)
}

impl Repository {
    fn oauth_bucket(&self, name: &str) -> String {
        join(&self.root, name)
    }

    /// Read one record from an OAuth sub-bucket. A missing bucket is
    /// `InvalidBucket`, a missing key `NotFound`.
    fn oauth_get<T: for<'de> Deserialize<'de>>(
        &self,
        tx: &impl BucketRead,
        bucket_name: &str,
        key: &str,
    ) -> Result<T> {
        let bucket = self.oauth_bucket(bucket_name);
        if !tx.bucket_exists(&bucket)? {
            return Err(Error::InvalidBucket(bucket));
        }
        let raw = tx
            .get(&bucket, key)?
            .ok_or_else(|| Error::not_found(format!("{bucket_name}/{key}")))?;
        decode(&raw)
    }

    // -- clients ------------------------------------------------------

    pub fn list_clients(&self) -> Result<Vec<Client>> {
        self.store()?.view(|tx| {
            let bucket = self.oauth_bucket(CLIENTS_BUCKET);
            if !tx.bucket_exists(&bucket)? {
                return Err(Error::InvalidBucket(bucket));
            }
            let mut clients = Vec::new();
            for (key, raw) in tx.entries_in(&bucket)? {
                match decode::<Client>(&raw) {
                    Ok(c) => clients.push(c),
                    Err(e) => warn!("unable to decode client {key}: {e}"),
                }
            }
            Ok(clients)
        })
    }

    pub fn get_client(&self, id: &str) -> Result<Client> {
        if id.is_empty() {
            return Err(Error::not_found("client id"));
        }
        self.store()?
            .view(|tx| self.oauth_get(tx, CLIENTS_BUCKET, id))
    }

    pub fn create_client(&self, client: &Client) -> Result<()> {
        self.update_client(client)
    }

    /// Store the client under its id, replacing any previous record.
    pub fn update_client(&self, client: &Client) -> Result<()> {
        if client.id.is_empty() {
            return Err(Error::InvalidInput("client id must not be empty".to_string()));
        }
        let raw = encode(client)?;
        self.store()?.update(|tx| {
            tx.create_bucket(&self.root)?;
            let bucket = self.oauth_bucket(CLIENTS_BUCKET);
            tx.create_bucket(&bucket)?;
            tx.put(&bucket, &client.id, &raw)
        })
    }

    pub fn remove_client(&self, id: &str) -> Result<()> {
        self.oauth_remove(CLIENTS_BUCKET, id)
    }

    // -- authorizations -----------------------------------------------

    pub fn save_authorize(&self, auth: &Authorization) -> Result<()> {
        let raw = encode(auth)?;
        self.store()?.update(|tx| {
            tx.create_bucket(&self.root)?;
            let bucket = self.oauth_bucket(AUTHORIZE_BUCKET);
            tx.create_bucket(&bucket)?;
            tx.put(&bucket, &auth.code, &raw)
        })
    }

    /// Load an authorization together with its client. Expired codes fail.
    pub fn load_authorize(&self, code: &str) -> Result<LoadedAuthorize> {
        if code.is_empty() {
            return Err(Error::not_found("authorize code"));
        }
        self.store()?.view(|tx| {
            let authorization: Authorization = self.oauth_get(tx, AUTHORIZE_BUCKET, code)?;
            if authorization.is_expired() {
                return Err(Error::Expired(authorization.expire_at().to_string()));
            }
            let client = self.join_client(tx, &authorization.client, code);
            Ok(LoadedAuthorize {
                authorization,
                client,
            })
        })
    }

    pub fn remove_authorize(&self, code: &str) -> Result<()> {
        self.oauth_remove(AUTHORIZE_BUCKET, code)
    }

    // -- accesses -----------------------------------------------------

    /// Store an access record keyed by its token. A non-empty refresh token
    /// gets its pointer record written in the same transaction, so the two
    /// can never disagree.
    pub fn save_access(&self, access: &Access) -> Result<()> {
        if access.client.is_empty() {
            return Err(Error::InvalidInput(
                "access client must not be empty".to_string(),
            ));
        }
        let raw = encode(access)?;
        let refresh_raw = if access.refresh_token.is_empty() {
            None
        } else {
            Some(encode(&Refresh {
                access: access.access_token.clone(),
            })?)
        };

        self.store()?.update(|tx| {
            tx.create_bucket(&self.root)?;
            if let Some(refresh_raw) = &refresh_raw {
                let bucket = self.oauth_bucket(REFRESH_BUCKET);
                tx.create_bucket(&bucket)?;
                tx.put(&bucket, &access.refresh_token, refresh_raw)?;
            }
            let bucket = self.oauth_bucket(ACCESS_BUCKET);
            tx.create_bucket(&bucket)?;
            tx.put(&bucket, &access.access_token, &raw)
        })
    }

    /// Load an access record and join what it references. The client,
    /// authorization and previous-access joins are best-effort: failures
    /// are logged and the load itself still succeeds.
    pub fn load_access(&self, token: &str) -> Result<LoadedAccess> {
        if token.is_empty() {
            return Err(Error::not_found("access token"));
        }
        self.store()?.view(|tx| {
            let access: Access = self.oauth_get(tx, ACCESS_BUCKET, token)?;
            let client = self.join_client(tx, &access.client, token);

            let mut authorization = None;
            if !access.authorize.is_empty() {
                let joined: Result<Authorization> =
                    self.oauth_get(tx, AUTHORIZE_BUCKET, &access.authorize);
                match joined {
                    Ok(auth) if auth.is_expired() => {
                        warn!(
                            "access {token}: authorization {} expired at {}",
                            access.authorize,
                            auth.expire_at()
                        );
                    }
                    Ok(auth) => authorization = Some(auth),
                    Err(e) => warn!("access {token}: {e}"),
                }
            }

            let mut previous = None;
            if !access.previous.is_empty() {
                let joined: Result<Access> = self.oauth_get(tx, ACCESS_BUCKET, &access.previous);
                match joined {
                    Ok(prev) => previous = Some(prev),
                    Err(e) => warn!("access {token}: previous access: {e}"),
                }
            }

            Ok(LoadedAccess {
                access,
                client,
                authorization,
                previous,
            })
        })
    }

    pub fn remove_access(&self, token: &str) -> Result<()> {
        self.oauth_remove(ACCESS_BUCKET, token)
    }

    // -- refreshes ----------------------------------------------------

    /// Resolve a refresh token to its access record: one lookup for the
    /// pointer, one for the access itself.
    pub fn load_refresh(&self, token: &str) -> Result<LoadedAccess> {
        if token.is_empty() {
            return Err(Error::not_found("refresh token"));
        }
        let pointer: Refresh = self
            .store()?
            .view(|tx| self.oauth_get(tx, REFRESH_BUCKET, token))?;
        self.load_access(&pointer.access)
    }

    pub fn remove_refresh(&self, token: &str) -> Result<()> {
        self.oauth_remove(REFRESH_BUCKET, token)
    }

    // -- shared -------------------------------------------------------

    fn join_client(&self, tx: &impl BucketRead, id: &str, context: &str) -> Option<Client> {
        let joined: Result<Client> = self.oauth_get(tx, CLIENTS_BUCKET, id);
        match joined {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("{context}: client {id}: {e}");
                None
            }
        }
    }

    fn oauth_remove(&self, bucket_name: &str, key: &str) -> Result<()> {
        self.store()?.update(|tx| {
            let bucket = self.oauth_bucket(bucket_name);
            if !tx.bucket_exists(&bucket)? {
                return Err(Error::InvalidBucket(bucket));
            }
            tx.delete(&bucket, key)
        })
    }
}
