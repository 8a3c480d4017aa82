/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Structural validation of activities before they hit the repository:
//! type-token checks on the activity and its actor/object/target, and a
//! locality check on bare references against the instance base IRI.

use crate::errors::{Error, Result};
use warren_vocab::{
    is_activity_type, is_actor_type, is_collection_type, is_link_type, Iri, Item,
};

#[derive(Clone, Debug)]
pub struct Validator {
    base_iri: Iri,
}

impl Validator {
    pub fn new(base_iri: Iri) -> Self {
        Validator { base_iri }
    }

    /// Whether the IRI belongs to this instance (host match against the
    /// configured base).
    pub fn is_local_iri(&self, iri: &Iri) -> bool {
        iri.is_local_to(&self.base_iri)
    }

    pub fn validate_link(&self, iri: &Iri) -> Result<()> {
        if !self.is_local_iri(iri) {
            return Err(Error::InvalidInput(format!("IRI is not valid: {iri} is not local")));
        }
        Ok(())
    }

    /// An activity must carry an activity type token and valid actor and
    /// object references; a target, when present, validates as an object.
    pub fn validate_activity(&self, it: &Item) -> Result<()> {
        if let Item::Iri(iri) = it {
            return self.validate_link(iri);
        }
        let Item::Activity(act) = it else {
            return Err(Error::InvalidInput(format!(
                "activity is not valid: invalid type {}",
                it.kind()
            )));
        };
        if !is_activity_type(&act.base.kind) {
            return Err(Error::InvalidInput(format!(
                "activity is not valid: invalid type {}",
                act.base.kind
            )));
        }
        match act.actor.as_deref() {
            Some(actor) => self.validate_actor(actor)?,
            None => {
                return Err(Error::InvalidInput(
                    "activity is not valid: missing actor".to_string(),
                ))
            }
        }
        if let Some(object) = act.object.as_deref() {
            self.validate_object(object)?;
        } else if !act.is_intransitive() {
            return Err(Error::InvalidInput(
                "activity is not valid: missing object".to_string(),
            ));
        }
        if let Some(target) = act.target.as_deref() {
            self.validate_target(target)?;
        }
        Ok(())
    }

    pub fn validate_actor(&self, it: &Item) -> Result<()> {
        if let Item::Iri(iri) = it {
            return self.validate_link(iri);
        }
        if !is_actor_type(it.kind()) {
            return Err(Error::InvalidInput(format!(
                "actor is not valid: invalid type {}",
                it.kind()
            )));
        }
        Ok(())
    }

    pub fn validate_object(&self, it: &Item) -> Result<()> {
        if let Item::Iri(iri) = it {
            return self.validate_link(iri);
        }
        if is_actor_type(it.kind()) || is_activity_type(it.kind()) {
            return Ok(());
        }
        // Plain objects, links and collections all qualify as objects.
        if it.is_object() || is_link_type(it.kind()) || is_collection_type(it.kind()) {
            return Ok(());
        }
        Err(Error::InvalidInput(format!(
            "object is not valid: invalid type {}",
            it.kind()
        )))
    }

    /// Anything addressable can be a target; the reference just has to be
    /// local or a well-formed object.
    pub fn validate_target(&self, it: &Item) -> Result<()> {
        self.validate_object(it)
    }
}
