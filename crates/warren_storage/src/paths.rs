/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Translation of IRIs into bucket paths and classification of path tails
//! as storage collections, hidden collections, or plain items.

use crate::errors::{Error, Result};
use warren_vocab::Iri;

/// Collections owned by an actor.
pub const OF_ACTOR: &[&str] = &["inbox", "outbox", "liked", "following", "followers"];

/// Collections owned by any object.
pub const OF_OBJECT: &[&str] = &["replies", "likes", "shares"];

/// Service-level collections at the root of an instance.
pub const TOP_LEVEL: &[&str] = &["actors", "activities", "objects"];

/// Internally managed per-actor sets, materialized lazily on first add.
pub const HIDDEN: &[&str] = &["blocked", "ignored"];

/// Whether `name` is a collection whose bucket is iterated at load time.
pub fn is_storage_collection(name: &str) -> bool {
    OF_ACTOR.contains(&name)
        || OF_OBJECT.contains(&name)
        || TOP_LEVEL.contains(&name)
        || HIDDEN.contains(&name)
}

pub fn is_hidden_collection(name: &str) -> bool {
    HIDDEN.contains(&name)
}

/// The bucket path for an item: `host + path` of its IRI, without scheme,
/// query or fragment.
pub fn item_path(iri: &Iri) -> Result<String> {
    iri.storage_path()
        .ok_or_else(|| Error::InvalidInput(format!("cannot derive a storage path from {iri}")))
}

/// Path segments, skipping empties left by duplicate or trailing slashes.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

pub fn last_segment(path: &str) -> &str {
    segments(path).last().unwrap_or_default()
}

/// Join bucket path components, skipping empty parts.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(is_storage_collection("inbox"));
        assert!(is_storage_collection("shares"));
        assert!(is_storage_collection("actors"));
        assert!(is_storage_collection("blocked"));
        assert!(!is_storage_collection("~jdoe"));

        assert!(is_hidden_collection("ignored"));
        assert!(!is_hidden_collection("inbox"));
    }

    #[test]
    fn test_item_path() {
        let iri = Iri::from("https://example.com/~jdoe/outbox?page=1#frag");
        assert_eq!(item_path(&iri).unwrap(), "example.com/~jdoe/outbox");
        assert!(item_path(&Iri::from("garbage")).is_err());
    }

    #[test]
    fn test_segments_skip_empties() {
        let segs: Vec<_> = segments("example.com//~jdoe/inbox/").collect();
        assert_eq!(segs, vec!["example.com", "~jdoe", "inbox"]);
        assert_eq!(last_segment("example.com/~jdoe/inbox/"), "inbox");
    }
}
