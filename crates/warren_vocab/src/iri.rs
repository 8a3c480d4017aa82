/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Absolute URL identifying an ActivityPub entity.
///
/// The `host + path` part (no scheme, no query, no fragment) doubles as the
/// entity's storage path inside the bucket tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(s: impl Into<String>) -> Self {
        Iri(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A valid id is non-empty and parses as an absolute URL.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && Url::parse(&self.0).is_ok()
    }

    /// The bucket path for this IRI: `host + path`, ignoring scheme, query
    /// and fragment. `None` when the IRI does not parse as an absolute URL.
    pub fn storage_path(&self) -> Option<String> {
        let url = Url::parse(&self.0).ok()?;
        let host = url.host_str()?;
        let path = url.path().trim_end_matches('/');
        Some(format!("{host}{path}"))
    }

    /// Last path segment, e.g. `inbox` for `https://example.com/~jdoe/inbox`.
    pub fn base_name(&self) -> &str {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    /// The IRI with its last path segment removed. Used to infer the owner
    /// of a per-actor collection from the collection IRI.
    pub fn parent(&self) -> Iri {
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > "https://".len() => Iri(trimmed[..idx].to_string()),
            _ => self.clone(),
        }
    }

    /// Append a path segment.
    pub fn join(&self, segment: &str) -> Iri {
        Iri(format!("{}/{}", self.0.trim_end_matches('/'), segment))
    }

    /// Link equality: scheme and trailing slashes are ignored, the host is
    /// compared case-insensitively.
    pub fn eq_link(&self, other: &Iri) -> bool {
        match (Url::parse(&self.0), Url::parse(&other.0)) {
            (Ok(a), Ok(b)) => {
                a.host_str().unwrap_or_default() == b.host_str().unwrap_or_default()
                    && a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
                    && a.query() == b.query()
            }
            _ => self.0.trim_end_matches('/') == other.0.trim_end_matches('/'),
        }
    }

    /// Whether this IRI lives on the same host as `base`.
    pub fn is_local_to(&self, base: &Iri) -> bool {
        match (Url::parse(&self.0), Url::parse(base.as_str())) {
            (Ok(a), Ok(b)) => a.host_str().is_some() && a.host_str() == b.host_str(),
            _ => false,
        }
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Iri(s.to_string())
    }
}

impl From<String> for Iri {
    fn from(s: String) -> Self {
        Iri(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_strips_scheme_query_fragment() {
        let iri = Iri::from("https://example.com/~jdoe/outbox?page=2#top");
        assert_eq!(iri.storage_path().unwrap(), "example.com/~jdoe/outbox");
    }

    #[test]
    fn test_storage_path_root() {
        let iri = Iri::from("https://example.com/");
        assert_eq!(iri.storage_path().unwrap(), "example.com");
        assert!(Iri::from("not a url").storage_path().is_none());
    }

    #[test]
    fn test_eq_link_ignores_scheme_and_trailing_slash() {
        let a = Iri::from("https://example.com/~jdoe/");
        let b = Iri::from("http://example.com/~jdoe");
        assert!(a.eq_link(&b));
        assert!(!a.eq_link(&Iri::from("https://example.com/~alice")));
    }

    #[test]
    fn test_parent_and_base_name() {
        let col = Iri::from("https://example.com/~jdoe/blocked");
        assert_eq!(col.base_name(), "blocked");
        assert_eq!(col.parent(), Iri::from("https://example.com/~jdoe"));
        assert_eq!(col.parent().join("inbox"), Iri::from("https://example.com/~jdoe/inbox"));
    }

    #[test]
    fn test_is_local_to() {
        let base = Iri::from("https://example.com");
        assert!(Iri::from("https://example.com/~jdoe").is_local_to(&base));
        assert!(!Iri::from("https://other.org/~jdoe").is_local_to(&base));
    }
}
