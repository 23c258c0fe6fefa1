// src/record.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Records, seeds and batches
//!
//! A record is a JSON object. Seeds carry the per-row overrides a build call
//! applies on top of factory output, and batches label one build call's rows
//! with the type that produced them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One generated row: attribute name to JSON value
pub type Record = Map<String, Value>;

/// Shallow merge: every attribute of `partial` replaces the same attribute of `base`
pub fn merge(mut base: Record, partial: &Record) -> Record {
    for (key, value) in partial {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Overrides for one build call
///
/// A single override produces one row; a sequence produces one row per element,
/// in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Seed {
    One(Record),
    Many(Vec<Record>),
}

impl Seed {
    /// One row with no overrides
    pub fn empty() -> Self {
        Seed::One(Record::new())
    }

    /// `count` rows sharing the same override
    pub fn repeat(partial: Record, count: usize) -> Self {
        Seed::Many(vec![partial; count])
    }

    /// Number of rows this seed asks for
    pub fn len(&self) -> usize {
        match self {
            Seed::One(_) => 1,
            Seed::Many(partials) => partials.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_overrides(self) -> Vec<Record> {
        match self {
            Seed::One(partial) => vec![partial],
            Seed::Many(partials) => partials,
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Seed::empty()
    }
}

impl From<()> for Seed {
    fn from(_: ()) -> Self {
        Seed::empty()
    }
}

impl From<Record> for Seed {
    fn from(partial: Record) -> Self {
        Seed::One(partial)
    }
}

impl From<Vec<Record>> for Seed {
    fn from(partials: Vec<Record>) -> Self {
        Seed::Many(partials)
    }
}

impl TryFrom<Value> for Seed {
    type Error = Error;

    /// Objects become a single override, arrays one override per element,
    /// and `null` the empty seed.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Seed::empty()),
            Value::Object(partial) => Ok(Seed::One(partial)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(partial) => Ok(partial),
                    Value::Null => Ok(Record::new()),
                    other => Err(Error::InvalidSeed(format!(
                        "element {} is {}, expected an object",
                        index,
                        kind(&other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Seed::Many),
            other => Err(Error::InvalidSeed(format!(
                "expected an object or array, got {}",
                kind(&other)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Rows produced by one build call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(rename = "type")]
    pub type_name: String,
    pub rows: Vec<Record>,
}
