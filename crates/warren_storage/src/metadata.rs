/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Per-IRI credential metadata, co-resident with the item under the
//! `__meta_data` key: a bcrypt password hash and a PKCS#8 private key.

use crate::buckets::{BucketRead, META_DATA_KEY};
use crate::errors::{Error, Result};
use crate::keys::PrivateKey;
use crate::paths::item_path;
use crate::repository::Repository;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use warren_vocab::{Iri, PublicKey};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pw: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Vec<u8>>,
}

impl Repository {
    pub fn load_metadata(&self, iri: &Iri) -> Result<Metadata> {
        let path = item_path(iri)?;
        self.store()?.view(|tx| {
            if !tx.bucket_exists(&self.root)? {
                return Err(Error::InvalidBucket(self.root.clone()));
            }
            let (bucket, tail) = tx.descend_lookup(&self.root, &path)?;
            if !tail.is_empty() {
                return Err(Error::not_found(iri.to_string()));
            }
            let raw = tx
                .get(&bucket, META_DATA_KEY)?
                .ok_or_else(|| Error::not_found(iri.to_string()))?;
            serde_json::from_slice(&raw).map_err(Error::decode)
        })
    }

    pub fn save_metadata(&self, iri: &Iri, m: &Metadata) -> Result<()> {
        let path = item_path(iri)?;
        let raw = serde_json::to_vec(m).map_err(Error::encode)?;
        self.store()?.update(|tx| {
            tx.create_bucket(&self.root)?;
            let (bucket, _) = tx.descend_create(&self.root, &path)?;
            tx.put(&bucket, META_DATA_KEY, &raw)
        })
    }

    /// Hash and store a password, keeping whatever else the metadata holds.
    /// Missing metadata counts as empty.
    pub fn password_set(&self, iri: &Iri, pw: &[u8]) -> Result<()> {
        let mut m = self.load_metadata(iri).or_else(tolerate_missing)?;
        let hash = bcrypt::hash(pw, self.bcrypt_cost)
            .map_err(|e| Error::InvalidInput(format!("could not generate password hash: {e}")))?;
        m.pw = Some(hash.into_bytes());
        self.save_metadata(iri, &m)
    }

    /// Compare a password against the stored hash. A mismatch is
    /// `Unauthorized`; a missing hash is `NotFound`.
    pub fn password_check(&self, iri: &Iri, pw: &[u8]) -> Result<()> {
        let m = self.load_metadata(iri)?;
        let hash = m
            .pw
            .as_deref()
            .ok_or_else(|| Error::not_found(iri.to_string()))?;
        let hash = std::str::from_utf8(hash).map_err(Error::decode)?;
        let ok = bcrypt::verify(pw, hash).map_err(Error::decode)?;
        if !ok {
            return Err(Error::Unauthorized(format!("invalid password for {iri}")));
        }
        Ok(())
    }

    /// PKCS#8-encode a private key into the metadata and return the derived
    /// public key record. `None` when no public key can be derived.
    pub fn save_key(&self, iri: &Iri, key: &PrivateKey) -> Result<Option<PublicKey>> {
        let mut m = self.load_metadata(iri).or_else(tolerate_missing)?;
        if m.key.is_some() {
            debug!("actor {iri} already has a private key");
        }
        m.key = Some(key.to_pkcs8_pem()?.into_bytes());
        self.save_metadata(iri, &m)?;

        let pem = match key.public_key_pem() {
            Ok(pem) => pem,
            Err(e) => {
                warn!(
                    "cannot derive a public key from the {} key of {iri}: {e}",
                    key.algorithm()
                );
                return Ok(None);
            }
        };
        Ok(Some(PublicKey {
            id: Iri::from(format!("{iri}#main")),
            owner: iri.clone(),
            public_key_pem: pem,
        }))
    }

    pub fn load_key(&self, iri: &Iri) -> Result<PrivateKey> {
        let m = self.load_metadata(iri)?;
        let pem = m.key.ok_or_else(|| Error::not_found(iri.to_string()))?;
        let pem = std::str::from_utf8(&pem).map_err(|_| Error::decode("failed decoding pem"))?;
        PrivateKey::from_pkcs8_pem(pem)
    }
}

fn tolerate_missing(e: Error) -> Result<Metadata> {
    if e.is_not_found() {
        Ok(Metadata::default())
    } else {
        Err(e)
    }
}
