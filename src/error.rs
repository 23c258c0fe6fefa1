// src/error.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for record generation
//!
//! Retry exhaustion is the only failure the engine itself produces. The other
//! variants report caller mistakes that a typed API can catch at the call site.

use std::convert::Infallible;
use thiserror::Error;

/// Result type alias for record-press operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A generator hit its retry budget before producing a unique row
    #[error("failed to create unique \"{type_name}\" row after {retries} retries")]
    RetriesExhausted {
        /// Schema type the generator was bound to
        type_name: String,
        /// Effective retry budget for the invocation
        retries: usize,
    },

    /// Build function requested for a type the schema does not declare
    #[error("unknown record type \"{0}\"")]
    UnknownType(String),

    /// JSON seed that is not an object, an array of objects, or null
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
