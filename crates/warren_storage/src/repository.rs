/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! The object repository: save, load and delete of ActivityPub items at
//! their IRI-derived bucket paths, with transitive dereferencing of
//! embedded IRI references at load time.

use crate::buckets::{BucketRead, Store, OBJECT_KEY};
use crate::collections;
use crate::errors::{Error, Result};
use crate::filters::Checks;
use crate::paths::{is_storage_collection, item_path, join, last_segment};
use std::path::PathBuf;
use tracing::{debug, warn};
use warren_vocab::{marshal_json, unmarshal_json, CodecError, Iri, Item, Object};

/// Name of the bucket everything lives under.
pub const ROOT_BUCKET: &str = ":";

pub type EncodeItemFn = fn(&Item) -> std::result::Result<Vec<u8>, CodecError>;
pub type DecodeItemFn = fn(&[u8]) -> std::result::Result<Item, CodecError>;

#[derive(Clone, Debug)]
pub struct Config {
    /// Base directory; the database file is `<path>/storage.bdb`.
    pub path: PathBuf,
    /// Root bucket name.
    pub root: String,
    /// Cost used when hashing passwords.
    pub bcrypt_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            path: PathBuf::new(),
            root: ROOT_BUCKET.to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Config {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Config {
            path: path.into(),
            ..Config::default()
        }
    }
}

/// Resolve the database file for a configuration, creating the base
/// directory when missing. An empty path is not usable.
pub(crate) fn storage_file(c: &Config) -> Result<PathBuf> {
    if c.path.as_os_str().is_empty() {
        return Err(Error::not_found("storage path"));
    }
    std::fs::create_dir_all(&c.path)?;
    Ok(c.path.join("storage.bdb"))
}

pub struct Repository {
    pub(crate) store: Option<Store>,
    pub(crate) file: PathBuf,
    pub(crate) root: String,
    pub(crate) bcrypt_cost: u32,
    pub(crate) encode_item: EncodeItemFn,
    pub(crate) decode_item: DecodeItemFn,
}

impl Repository {
    /// Build a closed repository from a configuration; `open` attaches the
    /// engine handle.
    pub fn new(c: Config) -> Result<Self> {
        let file = storage_file(&c)?;
        Ok(Repository {
            store: None,
            file,
            root: c.root,
            bcrypt_cost: c.bcrypt_cost,
            encode_item: marshal_json,
            decode_item: unmarshal_json,
        })
    }

    /// Swap the item codec. Metadata and OAuth records are unaffected.
    pub fn with_codec(mut self, encode: EncodeItemFn, decode: DecodeItemFn) -> Self {
        self.encode_item = encode;
        self.decode_item = decode;
        self
    }

    pub fn open(&mut self) -> Result<()> {
        if self.store.is_none() {
            self.store = Some(Store::open(&self.file)?);
        }
        Ok(())
    }

    /// Sync and release the engine handle. Safe to call on a closed
    /// repository.
    pub fn close(&mut self) {
        self.store = None;
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub(crate) fn store(&self) -> Result<&Store> {
        self.store.as_ref().ok_or(Error::NotOpen)
    }

    // -- save ---------------------------------------------------------

    /// Store the item at its IRI-derived path. A newly created terminal
    /// bucket also gets the item's owned collections pre-created.
    pub fn save(&self, it: Item) -> Result<Item> {
        let link = it.link();
        if !link.is_valid() {
            return Err(Error::InvalidInput(
                "cannot save an item without a valid id".to_string(),
            ));
        }
        let path = item_path(&link)?;
        let encode = self.encode_item;
        let root = self.root.clone();

        let (it, created) = self.store()?.update(|tx| {
            tx.create_bucket(&root)?;
            let (bucket, created) = tx.descend_create(&root, &path)?;
            let mut it = it;
            if created {
                collections::create_owned_collections(tx, &bucket, &mut it, encode)?;
            }
            let raw = encode(&it)?;
            tx.put(&bucket, OBJECT_KEY, &raw)?;
            Ok((it, created))
        })?;

        let op = if created { "Added new" } else { "Updated" };
        debug!("{op} {link}");
        Ok(it)
    }

    // -- load ---------------------------------------------------------

    pub fn load(&self, iri: &Iri) -> Result<Item> {
        self.load_filtered(iri, Checks::none())
    }

    /// Load with a post-filter pipeline. `Check::DerefActor` and
    /// `Check::DerefTarget` additionally request dereferencing of those
    /// properties on intransitive activities.
    pub fn load_filtered(&self, iri: &Iri, checks: Checks) -> Result<Item> {
        let path = item_path(iri)?;
        let it = self.store()?.view(|tx| {
            if !tx.bucket_exists(&self.root)? {
                return Err(Error::InvalidBucket(self.root.clone()));
            }
            let (bucket, tail) = tx.descend_lookup(&self.root, &path)?;

            if is_storage_collection(last_segment(&path)) {
                if !tail.is_empty() {
                    // A hidden collection that was never added to.
                    return Err(Error::not_found(iri.to_string()));
                }
                return self.iterate_in_bucket(tx, &bucket, iri);
            }
            if !tail.is_empty() {
                return Err(Error::not_found(iri.to_string()));
            }

            let it = self.load_item(tx, &bucket, &checks)?;
            if let Item::Collection(col) = &it {
                // An embedded collection record: dereference its members.
                let members = self.load_items_elements(tx, col.members());
                let mut col = (**col).clone();
                col.set_members(members);
                return Ok(Item::from(col));
            }
            Ok(it)
        })?;

        checks
            .run(it)
            .ok_or_else(|| Error::not_found(iri.to_string()))
    }

    /// Load the raw payload of a bucket, decoded but not dereferenced.
    pub(crate) fn load_raw(&self, tx: &impl BucketRead, bucket: &str) -> Result<Item> {
        let raw = tx
            .get(bucket, OBJECT_KEY)?
            .ok_or_else(|| Error::not_found(bucket.to_string()))?;
        (self.decode_item)(&raw).map_err(Error::from)
    }

    /// Single-lookup load used while dereferencing: no property resolution,
    /// one extra hop for stored IRI indirections.
    pub(crate) fn load_one(&self, tx: &impl BucketRead, iri: &Iri) -> Result<Item> {
        let path = item_path(iri)?;
        let (bucket, tail) = tx.descend_lookup(&self.root, &path)?;
        if !tail.is_empty() {
            return Err(Error::not_found(iri.to_string()));
        }
        let it = self.load_raw(tx, &bucket)?;
        if let Item::Iri(ref target) = it {
            if target.eq_link(iri) {
                return Err(Error::not_found(iri.to_string()));
            }
            let path = item_path(target)?;
            let (bucket, tail) = tx.descend_lookup(&self.root, &path)?;
            if !tail.is_empty() {
                return Err(Error::not_found(target.to_string()));
            }
            return self.load_raw(tx, &bucket);
        }
        Ok(it)
    }

    /// Load a bucket's item and resolve its IRI-valued properties by type:
    /// tags for objects and actors, `object` for transitive activities,
    /// `actor`/`target` for intransitive ones when the caller asked.
    fn load_item(&self, tx: &impl BucketRead, bucket: &str, checks: &Checks) -> Result<Item> {
        let it = self.load_raw(tx, bucket)?;
        if it.is_collection() {
            // Members are dereferenced by the caller.
            return Ok(it);
        }
        let mut it = match it {
            Item::Iri(iri) => self.load_one(tx, &iri)?,
            other => other,
        };

        match &mut it {
            Item::Actor(a) => self.resolve_tags(tx, &mut a.base),
            Item::Object(o) => self.resolve_tags(tx, o),
            Item::Activity(act) => {
                if !act.is_intransitive() {
                    if let Some(ob) = act.object.as_deref() {
                        if ob.is_iri() {
                            if let Ok(resolved) = self.load_one(tx, &ob.link()) {
                                act.object = Some(Box::new(resolved));
                            }
                        }
                    }
                }
                if checks.wants_actor() {
                    if let Some(actor) = act.actor.as_deref() {
                        if actor.is_iri() {
                            if let Ok(resolved) = self.load_one(tx, &actor.link()) {
                                act.actor = Some(Box::new(resolved));
                            }
                        }
                    }
                }
                if checks.wants_target() {
                    if let Some(target) = act.target.as_deref() {
                        if target.is_iri() {
                            if let Ok(resolved) = self.load_one(tx, &target.link()) {
                                act.target = Some(Box::new(resolved));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(it)
    }

    fn resolve_tags(&self, tx: &impl BucketRead, ob: &mut Object) {
        for tag in ob.tag.iter_mut() {
            if let Item::Iri(iri) = tag {
                let iri = iri.clone();
                if let Ok(resolved) = self.load_one(tx, &iri) {
                    *tag = resolved;
                }
            }
        }
    }

    /// Resolve a list of member references, skipping entries that do not
    /// load.
    fn load_items_elements(&self, tx: &impl BucketRead, members: &[Item]) -> Vec<Item> {
        let mut out = Vec::new();
        for member in members {
            let Ok(path) = item_path(&member.link()) else {
                continue;
            };
            let Ok((bucket, tail)) = tx.descend_lookup(&self.root, &path) else {
                continue;
            };
            if !tail.is_empty() {
                continue;
            }
            if let Ok(it) = self.load_item(tx, &bucket, &Checks::none()) {
                out.push(it);
            }
        }
        out
    }

    /// Walk a storage-collection bucket: members referenced on the raw
    /// collection record plus any child item buckets, each IRI included at
    /// most once. The result carries the requested IRI as its id, so pages
    /// and their parent collection present the same identity.
    fn iterate_in_bucket(&self, tx: &impl BucketRead, bucket: &str, iri: &Iri) -> Result<Item> {
        let raw = self.load_raw(tx, bucket)?;
        let Some(col) = raw.as_collection() else {
            return Ok(raw);
        };
        let mut col = col.clone();

        let mut items: Vec<Item> = Vec::new();
        for it in self.load_items_elements(tx, col.members()) {
            push_unique(&mut items, it);
        }
        for child in tx.child_buckets(bucket)? {
            let Ok(it) = self.load_item(tx, &child, &Checks::none()) else {
                continue;
            };
            if let Some(inner) = it.as_collection() {
                for member in self.load_items_elements(tx, inner.members()) {
                    push_unique(&mut items, member);
                }
            } else {
                push_unique(&mut items, it);
            }
        }

        col.set_members(items);
        col.base.id = iri.clone();
        Ok(Item::from(col))
    }

    // -- delete -------------------------------------------------------

    /// Remove an item and everything under its bucket. Deleting a
    /// collection removes each referent instead, best-effort.
    pub fn delete(&self, it: &Item) -> Result<()> {
        if let Some(col) = it.as_collection() {
            for member in col.members() {
                if let Err(e) = self.delete_item(&member.link()) {
                    warn!("unable to remove item {}: {e}", member.link());
                }
            }
            return Ok(());
        }
        self.delete_item(&it.link())
    }

    fn delete_item(&self, iri: &Iri) -> Result<()> {
        let path = item_path(iri)?;
        self.store()?.update(|tx| {
            if !tx.bucket_exists(&self.root)? {
                return Err(Error::InvalidBucket(self.root.clone()));
            }
            tx.delete_tree(&join(&self.root, &path))
        })
    }
}

fn push_unique(items: &mut Vec<Item>, it: Item) {
    let link = it.link();
    if !items.iter().any(|existing| existing.link().eq_link(&link)) {
        items.push(it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Check;
    use tempfile::tempdir;
    use warren_vocab::{Activity, Actor, Collection};

    fn open_repo() -> (Repository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut repo = Repository::new(Config::at(dir.path())).unwrap();
        repo.open().unwrap();
        (repo, dir)
    }

    fn note(id: &str) -> Item {
        let mut ob = Object::new(Iri::from(id), "Note");
        ob.content = Some("hello".to_string());
        Item::from(ob)
    }

    #[test]
    fn test_closed_repository_errors() {
        let dir = tempdir().unwrap();
        let repo = Repository::new(Config::at(dir.path())).unwrap();
        assert!(matches!(
            repo.load(&Iri::from("https://example.com/a")),
            Err(Error::NotOpen)
        ));
    }

    #[test]
    fn test_empty_path_is_not_found() {
        assert!(matches!(
            Repository::new(Config::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (repo, _dir) = open_repo();
        let saved = repo.save(note("https://example.com/objects/1")).unwrap();
        let loaded = repo.load(&Iri::from("https://example.com/objects/1")).unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_save_without_id_is_invalid_input() {
        let (repo, _dir) = open_repo();
        let res = repo.save(Item::from(Object::new(Iri::default(), "Note")));
        assert!(matches!(res, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_save_twice_is_idempotent() {
        let (repo, _dir) = open_repo();
        let it = note("https://example.com/objects/1");
        repo.save(it.clone()).unwrap();
        let first = repo.load(&Iri::from("https://example.com/objects/1")).unwrap();
        repo.save(it).unwrap();
        let second = repo.load(&Iri::from("https://example.com/objects/1")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (repo, _dir) = open_repo();
        repo.save(note("https://example.com/objects/1")).unwrap();
        let res = repo.load(&Iri::from("https://example.com/objects/2"));
        assert!(matches!(res, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_save_actor_creates_owned_collections() {
        let (repo, _dir) = open_repo();
        let actor = Actor::new(Iri::from("https://example.com/~jdoe"), "Person");
        let saved = repo.save(Item::from(actor)).unwrap();

        let saved_actor = saved.as_actor().unwrap();
        assert_eq!(
            saved_actor.inbox.as_deref().map(Item::link),
            Some(Iri::from("https://example.com/~jdoe/inbox"))
        );

        let inbox = repo.load(&Iri::from("https://example.com/~jdoe/inbox")).unwrap();
        let col = inbox.as_collection().unwrap();
        assert!(col.is_ordered());
        assert_eq!(col.total_items, 0);
        assert_eq!(
            col.base.attributed_to.as_deref().map(Item::link),
            Some(Iri::from("https://example.com/~jdoe"))
        );
    }

    #[test]
    fn test_load_actor_resolves_tags() {
        let (repo, _dir) = open_repo();
        repo.save(note("https://example.com/tags/rust")).unwrap();

        let mut actor = Actor::new(Iri::from("https://example.com/~jdoe"), "Person");
        actor
            .base
            .tag
            .push(Item::from(Iri::from("https://example.com/tags/rust")));
        repo.save(Item::from(actor)).unwrap();

        let loaded = repo.load(&Iri::from("https://example.com/~jdoe")).unwrap();
        let tag = &loaded.as_actor().unwrap().base.tag[0];
        assert!(!tag.is_iri());
        assert_eq!(tag.kind(), "Note");
    }

    #[test]
    fn test_load_activity_resolves_object_not_actor() {
        let (repo, _dir) = open_repo();
        repo.save(note("https://example.com/objects/1")).unwrap();
        repo.save(Item::from(Actor::new(
            Iri::from("https://example.com/~jdoe"),
            "Person",
        )))
        .unwrap();

        let mut act = Activity::default();
        act.base = Object::new(Iri::from("https://example.com/activities/1"), "Create");
        act.actor = Some(Box::new(Item::from(Iri::from("https://example.com/~jdoe"))));
        act.object = Some(Box::new(Item::from(Iri::from(
            "https://example.com/objects/1",
        ))));
        repo.save(Item::from(act)).unwrap();

        let loaded = repo
            .load(&Iri::from("https://example.com/activities/1"))
            .unwrap();
        match &loaded {
            Item::Activity(a) => {
                assert!(!a.object.as_deref().unwrap().is_iri());
                // actor stays a reference unless dereferencing is requested
                assert!(a.actor.as_deref().unwrap().is_iri());
            }
            other => panic!("expected activity, got {other:?}"),
        }

        let checks = Checks::none().with(Check::DerefActor);
        let loaded = repo
            .load_filtered(&Iri::from("https://example.com/activities/1"), checks)
            .unwrap();
        match &loaded {
            Item::Activity(a) => assert!(!a.actor.as_deref().unwrap().is_iri()),
            other => panic!("expected activity, got {other:?}"),
        }
    }

    #[test]
    fn test_load_collection_members_deduplicated() {
        let (repo, _dir) = open_repo();
        repo.save(note("https://example.com/objects/1")).unwrap();

        let mut col = Collection::ordered(Iri::from("https://example.com/~jdoe/inbox"));
        col.append(Item::from(Iri::from("https://example.com/objects/1")));
        col.append(Item::from(Iri::from("https://example.com/objects/1")));
        repo.save(Item::from(Actor::new(
            Iri::from("https://example.com/~jdoe"),
            "Person",
        )))
        .unwrap();
        repo.create(col).unwrap();

        let loaded = repo.load(&Iri::from("https://example.com/~jdoe/inbox")).unwrap();
        let col = loaded.as_collection().unwrap();
        assert_eq!(col.total_items, 1);
    }

    #[test]
    fn test_delete_removes_item_and_descendants() {
        let (repo, _dir) = open_repo();
        let actor = repo
            .save(Item::from(Actor::new(
                Iri::from("https://example.com/~jdoe"),
                "Person",
            )))
            .unwrap();

        repo.delete(&actor).unwrap();
        assert!(matches!(
            repo.load(&Iri::from("https://example.com/~jdoe")),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            repo.load(&Iri::from("https://example.com/~jdoe/inbox")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_load_filtered_applies_predicates() {
        let (repo, _dir) = open_repo();
        repo.save(note("https://example.com/objects/1")).unwrap();

        let checks = Checks::none().with(Check::matching(|it| it.kind() == "Article"));
        let res = repo.load_filtered(&Iri::from("https://example.com/objects/1"), checks);
        assert!(matches!(res, Err(Error::NotFound(_))));
    }
}
