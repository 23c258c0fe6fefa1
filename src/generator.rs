// src/generator.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resumable unique-row producer
//!
//! A `RowGenerator` is created for one build call and resumed once per seed
//! element. Each resume supplies the override for the next row, so overrides
//! are not known up front.
//!
//! # Algorithm
//! 1. Call the factory for a fresh candidate (on every attempt, retries included)
//! 2. Merge the override on top, override attributes winning
//! 3. Offer the merged record to the table
//! 4. Accepted: return it. Rejected: spend one retry and go back to 1 with the
//!    same override
//!
//! The retry budget belongs to the generator, not to a row: every collision
//! across all rows of one build call draws from the same budget.

use crate::error::{Error, Result};
use crate::record::{merge, Record};
use crate::table::Table;

/// Zero-argument record producer supplied by the schema
pub type Factory = Box<dyn FnMut() -> Record>;

pub struct RowGenerator<'a> {
    table: &'a mut Table,
    factory: &'a mut Factory,
    /// Effective budget, reported in the exhaustion error
    retries: usize,
    failures_remaining: usize,
    exhausted: bool,
    produced: usize,
}

impl<'a> RowGenerator<'a> {
    /// Create a generator ready to receive its first override
    pub fn new(table: &'a mut Table, factory: &'a mut Factory, retries: usize) -> Self {
        Self {
            table,
            factory,
            retries,
            failures_remaining: retries,
            exhausted: false,
            produced: 0,
        }
    }

    /// Produce the next unique row with `partial` applied
    ///
    /// Once this has failed the generator is spent: every later call returns
    /// the same error without touching the factory or the table.
    pub fn produce_next(&mut self, partial: &Record) -> Result<Record> {
        if self.exhausted {
            return Err(self.exhaustion());
        }

        loop {
            let candidate = merge((self.factory)(), partial);
            if self.table.add(&candidate) {
                self.produced += 1;
                return Ok(candidate);
            }

            if self.failures_remaining == 0 {
                self.exhausted = true;
                return Err(self.exhaustion());
            }
            self.failures_remaining -= 1;
            tracing::trace!(
                "{}: retrying row {} ({} retries left)",
                self.table.name(),
                self.produced,
                self.failures_remaining
            );
        }
    }

    /// Retries still available to this generator
    pub fn failures_remaining(&self) -> usize {
        self.failures_remaining
    }

    /// Rows produced so far
    pub fn produced(&self) -> usize {
        self.produced
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn exhaustion(&self) -> Error {
        Error::RetriesExhausted {
            type_name: self.table.name().to_string(),
            retries: self.retries,
        }
    }
}
