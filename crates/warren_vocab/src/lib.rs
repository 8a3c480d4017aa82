/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod activity;
pub mod actor;
pub mod codec;
pub mod collection;
pub mod iri;
pub mod item;
pub mod link;
pub mod object;
pub mod types;

pub use activity::Activity;
pub use actor::{Actor, Endpoints, PublicKey};
pub use codec::{marshal_json, unmarshal_json, CodecError};
pub use collection::Collection;
pub use iri::Iri;
pub use item::Item;
pub use link::Link;
pub use object::Object;
pub use types::*;
