/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::activity::Activity;
use crate::actor::Actor;
use crate::collection::Collection;
use crate::iri::Iri;
use crate::link::Link;
use crate::object::Object;
use crate::types::{is_activity_type, is_actor_type, is_collection_type, is_link_type};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Polymorphic ActivityPub entity: a bare IRI reference or a concrete
/// variant recovered from the `type` token of its JSON-LD payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Iri(Iri),
    Link(Link),
    Object(Box<Object>),
    Actor(Box<Actor>),
    Activity(Box<Activity>),
    Collection(Box<Collection>),
}

impl Item {
    /// The identifying IRI: the value itself for bare IRIs, the target for
    /// links, the `id` property otherwise.
    pub fn id(&self) -> &Iri {
        match self {
            Item::Iri(iri) => iri,
            Item::Link(l) => l.target(),
            Item::Object(o) => &o.id,
            Item::Actor(a) => &a.base.id,
            Item::Activity(a) => &a.base.id,
            Item::Collection(c) => &c.base.id,
        }
    }

    pub fn link(&self) -> Iri {
        self.id().clone()
    }

    /// The `type` token; empty for bare IRIs.
    pub fn kind(&self) -> &str {
        match self {
            Item::Iri(_) => "",
            Item::Link(l) => &l.kind,
            Item::Object(o) => &o.kind,
            Item::Actor(a) => &a.base.kind,
            Item::Activity(a) => &a.base.kind,
            Item::Collection(c) => &c.base.kind,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Item::Iri(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Item::Collection(_))
    }

    /// Whether the value carries object properties (anything except bare
    /// IRIs and links).
    pub fn is_object(&self) -> bool {
        !matches!(self, Item::Iri(_) | Item::Link(_))
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Item::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_actor(&self) -> Option<&Actor> {
        match self {
            Item::Actor(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_collection(self) -> Option<Collection> {
        match self {
            Item::Collection(c) => Some(*c),
            _ => None,
        }
    }

    /// A read-only view of the base object properties, for the variants
    /// that have them.
    pub fn object(&self) -> Option<&Object> {
        match self {
            Item::Object(o) => Some(o),
            Item::Actor(a) => Some(&a.base),
            Item::Activity(a) => Some(&a.base),
            Item::Collection(c) => Some(&c.base),
            Item::Iri(_) | Item::Link(_) => None,
        }
    }

    fn from_value(v: Value) -> Result<Item, serde_json::Error> {
        match v {
            Value::String(s) => Ok(Item::Iri(Iri::from(s))),
            Value::Object(ref map) => {
                let kind = map.get("type").and_then(Value::as_str).unwrap_or_default();
                if is_link_type(kind) {
                    serde_json::from_value(v).map(Item::Link)
                } else if is_collection_type(kind) {
                    serde_json::from_value(v).map(|c| Item::Collection(Box::new(c)))
                } else if is_actor_type(kind) {
                    serde_json::from_value(v).map(|a| Item::Actor(Box::new(a)))
                } else if is_activity_type(kind) {
                    serde_json::from_value(v).map(|a| Item::Activity(Box::new(a)))
                } else {
                    // Unknown type tokens decode as plain objects; their
                    // properties are preserved in the extra map.
                    serde_json::from_value(v).map(|o| Item::Object(Box::new(o)))
                }
            }
            other => Err(serde_json::Error::custom(format!(
                "unsupported item payload: {other}"
            ))),
        }
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        match self {
            Item::Iri(iri) => iri.serialize(ser),
            Item::Link(l) => l.serialize(ser),
            Item::Object(o) => o.serialize(ser),
            Item::Actor(a) => a.serialize(ser),
            Item::Activity(a) => a.serialize(ser),
            Item::Collection(c) => c.serialize(ser),
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(de)?;
        Item::from_value(v).map_err(D::Error::custom)
    }
}

impl From<Iri> for Item {
    fn from(iri: Iri) -> Self {
        Item::Iri(iri)
    }
}

impl From<Object> for Item {
    fn from(o: Object) -> Self {
        Item::Object(Box::new(o))
    }
}

impl From<Actor> for Item {
    fn from(a: Actor) -> Self {
        Item::Actor(Box::new(a))
    }
}

impl From<Activity> for Item {
    fn from(a: Activity) -> Self {
        Item::Activity(Box::new(a))
    }
}

impl From<Collection> for Item {
    fn from(c: Collection) -> Self {
        Item::Collection(Box::new(c))
    }
}

impl From<Link> for Item {
    fn from(l: Link) -> Self {
        Item::Link(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_iri_dispatch() {
        let it: Item = serde_json::from_str(r#""https://example.com/~jdoe""#).unwrap();
        assert!(it.is_iri());
        assert_eq!(it.link(), Iri::from("https://example.com/~jdoe"));
    }

    #[test]
    fn test_actor_dispatch() {
        let raw = r#"{"id":"https://example.com/~jdoe","type":"Person","preferredUsername":"jdoe"}"#;
        let it: Item = serde_json::from_str(raw).unwrap();
        let actor = it.as_actor().unwrap();
        assert_eq!(actor.preferred_username.as_deref(), Some("jdoe"));
        assert_eq!(it.kind(), "Person");
    }

    #[test]
    fn test_activity_dispatch_with_iri_object() {
        let raw = r#"{"id":"https://example.com/act/1","type":"Create","actor":"https://example.com/~jdoe","object":"https://example.com/a"}"#;
        let it: Item = serde_json::from_str(raw).unwrap();
        match &it {
            Item::Activity(act) => {
                assert!(act.actor.as_deref().unwrap().is_iri());
                assert!(act.object.as_deref().unwrap().is_iri());
            }
            other => panic!("expected activity, got {other:?}"),
        }
    }

    #[test]
    fn test_question_is_intransitive_activity() {
        let raw = r#"{"id":"https://example.com/q/1","type":"Question","name":"?"}"#;
        let it: Item = serde_json::from_str(raw).unwrap();
        match &it {
            Item::Activity(act) => assert!(act.is_intransitive()),
            other => panic!("expected activity, got {other:?}"),
        }
    }

    #[test]
    fn test_ordered_collection_dispatch() {
        let raw = r#"{"id":"https://example.com/~jdoe/inbox","type":"OrderedCollection","totalItems":1,"orderedItems":["https://example.com/a"]}"#;
        let it: Item = serde_json::from_str(raw).unwrap();
        let col = it.as_collection().unwrap();
        assert!(col.is_ordered());
        assert_eq!(col.total_items, 1);
        assert_eq!(col.members().len(), 1);
    }

    #[test]
    fn test_unknown_type_falls_back_to_object() {
        let raw = r#"{"id":"https://example.com/x","type":"ChatMessage","content":"hi"}"#;
        let it: Item = serde_json::from_str(raw).unwrap();
        assert!(matches!(it, Item::Object(_)));
        assert_eq!(it.kind(), "ChatMessage");
    }

    #[test]
    fn test_round_trip_preserves_unknown_fields() {
        let raw = r#"{"id":"https://example.com/~jdoe","type":"Person","capabilities":{"acceptsChatMessages":false}}"#;
        let it: Item = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_value(&it).unwrap();
        assert!(back.get("capabilities").is_some());
    }
}
