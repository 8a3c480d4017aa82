/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::iri::Iri;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default, skip_serializing_if = "Iri::is_empty")]
    pub id: Iri,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Iri::is_empty")]
    pub href: Iri,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    /// The identifying IRI of the link: its `href`, falling back to `id`.
    pub fn target(&self) -> &Iri {
        if self.href.is_empty() {
            &self.id
        } else {
            &self.href
        }
    }
}
