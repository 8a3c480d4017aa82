/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Post-load predicate pipeline. The repository applies these after a load;
//! it never evaluates query expressions itself.

use warren_vocab::Item;

type MatchFn = Box<dyn Fn(&Item) -> bool + Send + Sync>;

pub enum Check {
    /// Keep only items the predicate accepts.
    Match(MatchFn),
    /// Dereference the `actor` property of loaded intransitive activities.
    DerefActor,
    /// Dereference the `target` property of loaded intransitive activities.
    DerefTarget,
}

impl Check {
    pub fn matching(f: impl Fn(&Item) -> bool + Send + Sync + 'static) -> Self {
        Check::Match(Box::new(f))
    }
}

#[derive(Default)]
pub struct Checks(Vec<Check>);

impl Checks {
    pub fn none() -> Self {
        Checks(Vec::new())
    }

    pub fn with(mut self, check: Check) -> Self {
        self.0.push(check);
        self
    }

    pub fn wants_actor(&self) -> bool {
        self.0.iter().any(|c| matches!(c, Check::DerefActor))
    }

    pub fn wants_target(&self) -> bool {
        self.0.iter().any(|c| matches!(c, Check::DerefTarget))
    }

    fn accepts(&self, it: &Item) -> bool {
        self.0.iter().all(|c| match c {
            Check::Match(f) => f(it),
            _ => true,
        })
    }

    /// Apply the predicates: collections have their member list filtered
    /// (with the total re-derived), single items pass or are dropped.
    pub fn run(&self, it: Item) -> Option<Item> {
        if self.0.is_empty() {
            return Some(it);
        }
        match it {
            Item::Collection(mut col) => {
                let members: Vec<Item> = col
                    .members()
                    .iter()
                    .filter(|m| self.accepts(m))
                    .cloned()
                    .collect();
                col.set_members(members);
                Some(Item::Collection(col))
            }
            other => self.accepts(&other).then_some(other),
        }
    }
}

impl From<Vec<Check>> for Checks {
    fn from(checks: Vec<Check>) -> Self {
        Checks(checks)
    }
}
