// src/key.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uniqueness rules and the key functions derived from them
//!
//! Each rule is resolved once, when its table is built, into a closure that
//! maps a record to a canonical string. Attribute values are serialized as
//! JSON, so structurally equal values produce the same key.

use std::fmt;
use std::rc::Rc;

use serde_json::{Number, Value};

use crate::constants::MISSING_ATTRIBUTE_KEY;
use crate::record::Record;

/// Canonical key extractor for one uniqueness rule
pub type KeyFn = Box<dyn Fn(&Record) -> String>;

/// A rule a record's key must not collide on
#[derive(Clone)]
pub enum UniqueBy {
    /// One attribute
    ///
    /// A record without the attribute keys differently from one holding an
    /// explicit `null`, so the two do not collide.
    ByAttribute(String),
    /// Several attributes compared jointly, in order
    ///
    /// Missing attributes take the `null` slot in the tuple.
    ByComposite(Vec<String>),
    /// Caller-computed key, used verbatim
    ByFunction(Rc<dyn Fn(&Record) -> String>),
}

impl UniqueBy {
    pub fn attribute(name: impl Into<String>) -> Self {
        UniqueBy::ByAttribute(name.into())
    }

    pub fn composite<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UniqueBy::ByComposite(names.into_iter().map(Into::into).collect())
    }

    pub fn function<F>(key: F) -> Self
    where
        F: Fn(&Record) -> String + 'static,
    {
        UniqueBy::ByFunction(Rc::new(key))
    }

    /// Resolve this rule into its key function
    pub fn key_fn(&self) -> KeyFn {
        match self {
            UniqueBy::ByAttribute(name) => {
                let name = name.clone();
                Box::new(move |record| attribute_key(record, &name))
            }
            UniqueBy::ByComposite(names) => {
                let names = names.clone();
                Box::new(move |record| composite_key(record, &names))
            }
            UniqueBy::ByFunction(key) => {
                let key = Rc::clone(key);
                Box::new(move |record| key(record))
            }
        }
    }
}

impl fmt::Debug for UniqueBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueBy::ByAttribute(name) => f.debug_tuple("ByAttribute").field(name).finish(),
            UniqueBy::ByComposite(names) => f.debug_tuple("ByComposite").field(names).finish(),
            UniqueBy::ByFunction(_) => f.write_str("ByFunction(..)"),
        }
    }
}

impl From<&str> for UniqueBy {
    fn from(name: &str) -> Self {
        UniqueBy::attribute(name)
    }
}

impl From<String> for UniqueBy {
    fn from(name: String) -> Self {
        UniqueBy::ByAttribute(name)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for UniqueBy {
    fn from(names: [S; N]) -> Self {
        UniqueBy::composite(names)
    }
}

impl From<Vec<String>> for UniqueBy {
    fn from(names: Vec<String>) -> Self {
        UniqueBy::ByComposite(names)
    }
}

fn attribute_key(record: &Record, name: &str) -> String {
    match record.get(name) {
        Some(value) => canonical(value).to_string(),
        None => MISSING_ATTRIBUTE_KEY.to_string(),
    }
}

fn composite_key(record: &Record, names: &[String]) -> String {
    let tuple: Vec<Value> = names
        .iter()
        .map(|name| record.get(name).map(canonical).unwrap_or(Value::Null))
        .collect();
    Value::Array(tuple).to_string()
}

/// Copy of `value` with object keys in sorted order at every depth
///
/// serde_json keeps insertion order when `preserve_order` is enabled anywhere
/// in the dependency graph.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|key| (key.clone(), canonical(&map[key])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        Value::Number(number) => canonical_number(number),
        scalar => scalar.clone(),
    }
}

/// Integral floats key as integers, so `1.0` collides with `1` and `-0.0` with `0`
fn canonical_number(number: &Number) -> Value {
    if !number.is_f64() {
        return Value::Number(number.clone());
    }
    match number.as_f64() {
        Some(f) if f == 0.0 => Value::from(0u64),
        Some(f) if f.is_finite() && f.fract() == 0.0 => {
            if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Value::from(f as i64)
            } else if f > 0.0 && f < u64::MAX as f64 {
                Value::from(f as u64)
            } else {
                Value::Number(number.clone())
            }
        }
        _ => Value::Number(number.clone()),
    }
}
