/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Store lifecycle: first-run creation of the bucket skeleton, and removal.

use crate::buckets::Store;
use crate::errors::{Error, Result};
use crate::oauth::{ACCESS_BUCKET, AUTHORIZE_BUCKET, CLIENTS_BUCKET, REFRESH_BUCKET};
use crate::paths::join;
use crate::repository::{storage_file, Config};
use tracing::info;

/// Create the database file, the root bucket and the four OAuth
/// sub-buckets. Safe to run on an already bootstrapped store.
pub fn bootstrap(c: &Config) -> Result<()> {
    let file = storage_file(c)?;
    let store = Store::open(&file)?;
    store.update(|tx| {
        tx.create_bucket(&c.root)?;
        for name in [CLIENTS_BUCKET, AUTHORIZE_BUCKET, ACCESS_BUCKET, REFRESH_BUCKET] {
            tx.create_bucket(&join(&c.root, name))?;
        }
        Ok(())
    })?;
    info!("bootstrapped storage at {}", file.display());
    Ok(())
}

/// Remove the storage directory tree. The next bootstrap starts from an
/// empty store.
pub fn clean(c: &Config) -> Result<()> {
    if c.path.as_os_str().is_empty() {
        return Err(Error::not_found("storage path"));
    }
    match std::fs::remove_dir_all(&c.path) {
        Ok(()) => {
            info!("removed storage at {}", c.path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}
