// src/lib.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture record generation with enforced uniqueness
//!
//! This library provides:
//! - Per-type uniqueness tables keyed by attribute, composite or computed keys
//! - Resumable generators that merge per-row overrides onto factory output
//!   and retry collisions against a bounded budget
//! - A `RecordPress` that binds a schema of factories together and collects
//!   generated rows into batches until they are dumped
//!
//! # Example
//! ```rust
//! use record_press::{Entity, Error, RecordPress, Schema};
//! use serde_json::json;
//!
//! let mut next_id = 0;
//! let schema = Schema::new().entity(
//!     "users",
//!     Entity::new(move || {
//!         next_id += 1;
//!         json!({ "id": next_id }).as_object().cloned().unwrap_or_default()
//!     })
//!     .unique_by("id"),
//! );
//!
//! let mut press = RecordPress::new(schema);
//! press
//!     .press(|build| {
//!         let users = build.rows("users", json!([{ "name": "ann" }, { "name": "bob" }]))?;
//!         assert_eq!(users[1]["name"], "bob");
//!         Ok::<_, Error>(())
//!     })
//!     .unwrap();
//!
//! let batches = press.dump();
//! assert_eq!(batches[0].rows.len(), 2);
//! ```

// Core modules
pub mod constants;
pub mod error;
pub mod generator;
pub mod key;
pub mod press;
pub mod random;
pub mod record;
pub mod table;

// Re-export main API
pub use error::{Error, Result};
pub use generator::{Factory, RowGenerator};
pub use key::UniqueBy;
pub use press::{Build, BuildOptions, Entity, PressConfig, RecordPress, Schema};
pub use record::{Batch, Record, Seed};
pub use table::Table;
