/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Nested-bucket algebra over a flat redb B+tree.
//!
//! redb exposes named tables, not nested buckets, so the hierarchy lives in
//! two tables: a registry of bucket paths and an entry table keyed by
//! `(bucket path, key)`. A bucket exists iff its path is registered, which
//! preserves the create/lookup descent semantics of a nested store:
//! lazily created chains, empty buckets, and subtree deletion.

use crate::errors::{Error, Result};
use crate::paths::{is_hidden_collection, join, segments};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;

const BUCKETS: TableDefinition<&str, ()> = TableDefinition::new("buckets");
const ENTRIES: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("entries");

/// Reserved key holding the encoded item payload of a bucket.
pub const OBJECT_KEY: &str = "__raw";
/// Reserved key holding the credential metadata of a bucket.
pub const META_DATA_KEY: &str = "__meta_data";

/// Handle over the single database file. Writes run through [`Store::update`]
/// (one writer, atomic commit), reads through [`Store::view`] (snapshot).
pub struct Store {
    db: Database,
}

impl Store {
    pub fn open(file: &Path) -> Result<Self> {
        let db = Database::create(file)?;

        // Ensure both tables exist so later snapshots can open them.
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(BUCKETS)?;
            let _ = txn.open_table(ENTRIES)?;
        }
        txn.commit()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(file, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(Store { db })
    }

    /// Run `f` inside one write transaction. `Ok` commits, `Err` aborts and
    /// leaves the store unchanged.
    pub fn update<T>(&self, f: impl FnOnce(&mut WriteTx<'_>) -> Result<T>) -> Result<T> {
        let txn = self.db.begin_write()?;
        let out = {
            let mut tx = WriteTx {
                buckets: txn.open_table(BUCKETS)?,
                entries: txn.open_table(ENTRIES)?,
            };
            f(&mut tx)
        };
        match out {
            Ok(v) => {
                txn.commit()?;
                Ok(v)
            }
            Err(e) => {
                let _ = txn.abort();
                Err(e)
            }
        }
    }

    /// Run `f` on a consistent read snapshot.
    pub fn view<T>(&self, f: impl FnOnce(&ReadTx) -> Result<T>) -> Result<T> {
        let txn = self.db.begin_read()?;
        let tx = ReadTx {
            buckets: txn.open_table(BUCKETS)?,
            entries: txn.open_table(ENTRIES)?,
        };
        f(&tx)
    }
}

/// Read operations shared by write transactions and snapshots.
pub trait BucketRead {
    fn bucket_exists(&self, path: &str) -> Result<bool>;
    fn get(&self, path: &str, key: &str) -> Result<Option<Vec<u8>>>;
    /// Full paths of the direct child buckets of `path`.
    fn child_buckets(&self, path: &str) -> Result<Vec<String>>;
    /// All `(key, value)` entries stored directly in `path`.
    fn entries_in(&self, path: &str) -> Result<Vec<(String, Vec<u8>)>>;

    /// Descend the bucket chain for `path` starting at `root`, stopping at
    /// the first missing segment. Returns the deepest existing bucket and
    /// the unconsumed tail. A non-empty tail is an error unless its first
    /// component names a hidden collection, which is materialized lazily
    /// and therefore expected to be absent.
    fn descend_lookup(&self, root: &str, path: &str) -> Result<(String, String)> {
        let mut bucket = root.to_string();
        let mut remainder: Vec<&str> = Vec::new();
        let mut missing = false;
        for seg in segments(path) {
            if missing {
                remainder.push(seg);
                continue;
            }
            let candidate = join(&bucket, seg);
            if self.bucket_exists(&candidate)? {
                bucket = candidate;
            } else {
                missing = true;
                remainder.push(seg);
            }
        }
        let tail = remainder.join("/");
        if !remainder.is_empty() && !is_hidden_collection(remainder[0]) {
            return Err(Error::not_found(remainder[0].to_string()));
        }
        Ok((bucket, tail))
    }
}

pub struct WriteTx<'txn> {
    buckets: redb::Table<'txn, &'static str, ()>,
    entries: redb::Table<'txn, (&'static str, &'static str), &'static [u8]>,
}

impl WriteTx<'_> {
    /// Register a bucket path. Returns `true` when it did not exist before.
    pub fn create_bucket(&mut self, path: &str) -> Result<bool> {
        Ok(self.buckets.insert(path, ())?.is_none())
    }

    /// Descend from `root`, creating every missing bucket on the way.
    /// Returns the terminal bucket path and whether it was newly created.
    pub fn descend_create(&mut self, root: &str, path: &str) -> Result<(String, bool)> {
        let mut bucket = root.to_string();
        let mut created = false;
        for seg in segments(path) {
            bucket = join(&bucket, seg);
            created = self.create_bucket(&bucket)?;
        }
        Ok((bucket, created))
    }

    pub fn put(&mut self, path: &str, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert((path, key), value)?;
        Ok(())
    }

    pub fn delete(&mut self, path: &str, key: &str) -> Result<()> {
        self.entries.remove(&(path, key))?;
        Ok(())
    }

    /// Delete a bucket, its entries, and every descendant bucket.
    pub fn delete_tree(&mut self, path: &str) -> Result<()> {
        let mut doomed = vec![path.to_string()];
        doomed.extend(self.descendant_buckets(path)?);

        for bucket in &doomed {
            self.buckets.remove(bucket.as_str())?;
            let keys: Vec<String> = self
                .entries_in(bucket)?
                .into_iter()
                .map(|(k, _)| k)
                .collect();
            for key in keys {
                self.entries.remove(&(bucket.as_str(), key.as_str()))?;
            }
        }
        Ok(())
    }

    fn descendant_buckets(&self, path: &str) -> Result<Vec<String>> {
        let prefix = format!("{path}/");
        let mut found = Vec::new();
        for entry in self.buckets.range(prefix.as_str()..)? {
            let (key, _) = entry?;
            let key = key.value();
            if !key.starts_with(&prefix) {
                break;
            }
            found.push(key.to_string());
        }
        Ok(found)
    }
}

impl BucketRead for WriteTx<'_> {
    fn bucket_exists(&self, path: &str) -> Result<bool> {
        Ok(self.buckets.get(path)?.is_some())
    }

    fn get(&self, path: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(&(path, key))?.map(|v| v.value().to_vec()))
    }

    fn child_buckets(&self, path: &str) -> Result<Vec<String>> {
        scan_children(&self.buckets, path)
    }

    fn entries_in(&self, path: &str) -> Result<Vec<(String, Vec<u8>)>> {
        scan_entries(&self.entries, path)
    }
}

pub struct ReadTx {
    buckets: redb::ReadOnlyTable<&'static str, ()>,
    entries: redb::ReadOnlyTable<(&'static str, &'static str), &'static [u8]>,
}

impl BucketRead for ReadTx {
    fn bucket_exists(&self, path: &str) -> Result<bool> {
        Ok(self.buckets.get(path)?.is_some())
    }

    fn get(&self, path: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(&(path, key))?.map(|v| v.value().to_vec()))
    }

    fn child_buckets(&self, path: &str) -> Result<Vec<String>> {
        scan_children(&self.buckets, path)
    }

    fn entries_in(&self, path: &str) -> Result<Vec<(String, Vec<u8>)>> {
        scan_entries(&self.entries, path)
    }
}

fn scan_children(
    table: &impl ReadableTable<&'static str, ()>,
    path: &str,
) -> Result<Vec<String>> {
    let prefix = format!("{path}/");
    let mut children = Vec::new();
    for entry in table.range(prefix.as_str()..)? {
        let (key, _) = entry?;
        let key = key.value();
        if !key.starts_with(&prefix) {
            break;
        }
        // Deeper descendants sort between their parent and its next sibling;
        // keep direct children only and keep scanning.
        if !key[prefix.len()..].contains('/') {
            children.push(key.to_string());
        }
    }
    Ok(children)
}

fn scan_entries(
    table: &impl ReadableTable<(&'static str, &'static str), &'static [u8]>,
    path: &str,
) -> Result<Vec<(String, Vec<u8>)>> {
    let mut out = Vec::new();
    for entry in table.range((path, "")..)? {
        let (key, value) = entry?;
        let (bucket, entry_key) = key.value();
        if bucket != path {
            break;
        }
        out.push((entry_key.to_string(), value.value().to_vec()));
    }
    Ok(out)
}
