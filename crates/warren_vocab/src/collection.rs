/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::iri::Iri;
use crate::item::Item;
use crate::object::{item_seq, Object};
use crate::types::is_ordered_collection_type;
use serde::{Deserialize, Serialize};

/// Ordered or unordered collection, including the page variants. The type
/// token decides which member list (`items` or `orderedItems`) is live;
/// pages behave as their parent collection kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(flatten)]
    pub base: Object,

    #[serde(default)]
    pub total_items: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<Box<Item>>,

    /// Collection this page belongs to; set on the page variants only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Box<Item>>,

    #[serde(default, with = "item_seq", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,

    #[serde(default, with = "item_seq", skip_serializing_if = "Vec::is_empty")]
    pub ordered_items: Vec<Item>,
}

impl Collection {
    pub fn ordered(id: Iri) -> Self {
        Collection {
            base: Object::new(id, "OrderedCollection"),
            ..Collection::default()
        }
    }

    pub fn unordered(id: Iri) -> Self {
        Collection {
            base: Object::new(id, "Collection"),
            ..Collection::default()
        }
    }

    pub fn is_ordered(&self) -> bool {
        is_ordered_collection_type(&self.base.kind)
    }

    pub fn members(&self) -> &[Item] {
        if self.is_ordered() {
            &self.ordered_items
        } else {
            &self.items
        }
    }

    /// Replace the live member list and bring `total_items` in line with it.
    pub fn set_members(&mut self, members: Vec<Item>) {
        self.total_items = members.len() as u32;
        if self.is_ordered() {
            self.ordered_items = members;
            self.items = Vec::new();
        } else {
            self.items = members;
            self.ordered_items = Vec::new();
        }
    }

    /// Append to the live member list, keeping `total_items` consistent.
    pub fn append(&mut self, it: Item) {
        if self.is_ordered() {
            self.ordered_items.push(it);
        } else {
            self.items.push(it);
        }
        self.total_items += 1;
    }

    pub fn contains(&self, link: &Iri) -> bool {
        self.members().iter().any(|it| it.link().eq_link(link))
    }
}
