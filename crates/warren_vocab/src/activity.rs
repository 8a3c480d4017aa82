/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::item::Item;
use crate::object::Object;
use crate::types::is_intransitive_activity_type;
use serde::{Deserialize, Serialize};

/// A transitive or intransitive activity. Intransitive ones (`Arrive`,
/// `Travel`, `Question`) carry no `object`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(flatten)]
    pub base: Object,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Box<Item>>,
}

impl Activity {
    pub fn is_intransitive(&self) -> bool {
        is_intransitive_activity_type(&self.base.kind)
    }
}
