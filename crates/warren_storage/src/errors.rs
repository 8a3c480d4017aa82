/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Error kinds surfaced by the storage layer. Callers are expected to match
//! on the variant, never on the message text.

use thiserror::Error;
use warren_vocab::CodecError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("repository is not open")]
    NotOpen,

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid bucket {0}")]
    InvalidBucket(String),

    #[error("non writable bucket {0}")]
    NotWritable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("expired at {0}")]
    Expired(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("could not encode: {0}")]
    Encode(String),

    #[error("could not decode: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("storage engine: {0}")]
    Engine(#[source] Box<redb::Error>),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn encode(e: impl std::fmt::Display) -> Self {
        Error::Encode(e.to_string())
    }

    pub fn decode(e: impl std::fmt::Display) -> Self {
        Error::Decode(e.to_string())
    }

    /// Missing data that some paths tolerate (first metadata save, hidden
    /// collections, best-effort joins).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<redb::Error> for Error {
    fn from(e: redb::Error) -> Self {
        Error::Engine(Box::new(e))
    }
}

impl From<redb::DatabaseError> for Error {
    fn from(e: redb::DatabaseError) -> Self {
        Error::Engine(Box::new(e.into()))
    }
}

impl From<redb::TransactionError> for Error {
    fn from(e: redb::TransactionError) -> Self {
        Error::Engine(Box::new(e.into()))
    }
}

impl From<redb::TableError> for Error {
    fn from(e: redb::TableError) -> Self {
        Error::Engine(Box::new(e.into()))
    }
}

impl From<redb::StorageError> for Error {
    fn from(e: redb::StorageError) -> Self {
        Error::Engine(Box::new(e.into()))
    }
}

impl From<redb::CommitError> for Error {
    fn from(e: redb::CommitError) -> Self {
        Error::Engine(Box::new(e.into()))
    }
}
