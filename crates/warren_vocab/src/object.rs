/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::iri::Iri;
use crate::item::Item;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Base ActivityPub object. Properties this model does not know about are
/// kept verbatim in `extra` so round-tripping never loses data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    #[serde(default, skip_serializing_if = "Iri::is_empty")]
    pub id: Iri,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributed_to: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<Box<Item>>,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published: Option<OffsetDateTime>,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<OffsetDateTime>,

    #[serde(default, with = "item_seq", skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<Item>,

    #[serde(default, with = "item_seq", skip_serializing_if = "Vec::is_empty")]
    pub bto: Vec<Item>,

    #[serde(default, with = "item_seq", skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Item>,

    #[serde(default, with = "item_seq", skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<Item>,

    #[serde(default, with = "item_seq", skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<Item>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Box<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<Box<Item>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Object {
    pub fn new(id: Iri, kind: impl Into<String>) -> Self {
        Object {
            id,
            kind: kind.into(),
            ..Object::default()
        }
    }
}

/// JSON-LD properties that hold either a single item or an array of items.
/// Always serialized back as an array.
pub(crate) mod item_seq {
    use super::{Item, Value};
    use serde::de::Error;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[Item], ser: S) -> Result<S::Ok, S::Error> {
        let mut seq = ser.serialize_seq(Some(items.len()))?;
        for it in items {
            seq.serialize_element(it)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Item>, D::Error> {
        let v = Value::deserialize(de)?;
        match v {
            Value::Null => Ok(Vec::new()),
            Value::Array(vals) => vals
                .into_iter()
                .map(|v| serde_json::from_value(v).map_err(D::Error::custom))
                .collect(),
            single => Ok(vec![serde_json::from_value(single).map_err(D::Error::custom)?]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_valued_tag_becomes_list() {
        let raw = r#"{"id":"https://example.com/a","type":"Note","tag":"https://example.com/t"}"#;
        let ob: Object = serde_json::from_str(raw).unwrap();
        assert_eq!(ob.tag.len(), 1);
        assert_eq!(ob.tag[0].link(), Iri::from("https://example.com/t"));
    }

    #[test]
    fn test_unknown_properties_survive_round_trip() {
        let raw = r#"{"id":"https://example.com/a","type":"Note","source":{"content":"*x*"},"sensitive":true}"#;
        let ob: Object = serde_json::from_str(raw).unwrap();
        assert_eq!(ob.extra.get("sensitive"), Some(&Value::Bool(true)));

        let back: Value = serde_json::to_value(&ob).unwrap();
        assert_eq!(back.get("sensitive"), Some(&Value::Bool(true)));
        assert!(back.get("source").is_some());
    }
}
