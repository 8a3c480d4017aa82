/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::item::Item;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("could not encode item: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("could not decode item: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Default JSON-LD encoder for ActivityPub items.
pub fn marshal_json(it: &Item) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(it).map_err(CodecError::Encode)
}

/// Default JSON-LD decoder; the concrete variant is recovered from the
/// payload's `type` token.
pub fn unmarshal_json(data: &[u8]) -> Result<Item, CodecError> {
    serde_json::from_slice(data).map_err(CodecError::Decode)
}
