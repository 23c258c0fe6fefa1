// src/table.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-type uniqueness index
//!
//! A table holds one presence set per uniqueness rule. `add` accepts a record
//! only when none of its keys is already present, and then marks all of them.

use std::collections::HashSet;
use std::fmt;

use crate::key::{KeyFn, UniqueBy};
use crate::record::Record;

pub struct Table {
    name: String,
    /// One (key function, presence set) pair per rule
    indexes: Vec<(KeyFn, HashSet<String>)>,
    /// Rows accepted since the last clear
    accepted: usize,
}

impl Table {
    pub fn new(name: impl Into<String>, unique_by: &[UniqueBy]) -> Self {
        Self {
            name: name.into(),
            indexes: unique_by
                .iter()
                .map(|rule| (rule.key_fn(), HashSet::new()))
                .collect(),
            accepted: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert `record`'s keys if none collides
    ///
    /// Returns `false` and leaves every set untouched when any key is present.
    pub fn add(&mut self, record: &Record) -> bool {
        let keys: Vec<String> = self.indexes.iter().map(|(key, _)| key(record)).collect();

        let collides = self
            .indexes
            .iter()
            .zip(&keys)
            .any(|((_, present), key)| present.contains(key));
        if collides {
            tracing::trace!("{}: key collision on {:?}", self.name, keys);
            return false;
        }

        for ((_, present), key) in self.indexes.iter_mut().zip(keys) {
            present.insert(key);
        }
        self.accepted += 1;
        true
    }

    pub fn clear(&mut self) {
        for (_, present) in &mut self.indexes {
            present.clear();
        }
        self.accepted = 0;
    }

    /// Number of rows accepted since the last clear
    pub fn len(&self) -> usize {
        self.accepted
    }

    pub fn is_empty(&self) -> bool {
        self.accepted == 0
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("rules", &self.indexes.len())
            .field("accepted", &self.accepted)
            .finish()
    }
}
