/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::iri::Iri;
use crate::item::Item;
use crate::object::Object;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(flatten)]
    pub base: Object,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbox: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbox: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Endpoints>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
}

/// Extra delivery and authorization endpoints advertised by an actor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_inbox: Option<Iri>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_authorization_endpoint: Option<Iri>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token_endpoint: Option<Iri>,
}

impl Actor {
    pub fn new(id: Iri, kind: impl Into<String>) -> Self {
        Actor {
            base: Object::new(id, kind),
            ..Actor::default()
        }
    }
}

/// Signing key advertised on an actor document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicKey {
    pub id: Iri,
    pub owner: Iri,
    #[serde(rename = "publicKeyPem")]
    pub public_key_pem: String,
}
