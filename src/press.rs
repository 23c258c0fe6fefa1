// src/press.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema-driven orchestration of tables and generators
//!
//! A `RecordPress` owns one table and one factory per schema type. Each
//! `press` hands the builder a `Build` handle; every build call runs a fresh
//! generator and records its rows as a batch. `dump` drains the batches and
//! resets every table.

use std::collections::BTreeMap;
use std::fmt;

use crate::constants::DEFAULT_MAX_RETRIES;
use crate::error::{Error, Result};
use crate::generator::{Factory, RowGenerator};
use crate::key::UniqueBy;
use crate::record::{Batch, Record, Seed};
use crate::table::Table;

/// Factory and uniqueness rules for one record type
pub struct Entity {
    factory: Factory,
    unique_by: Vec<UniqueBy>,
}

impl Entity {
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> Record + 'static,
    {
        Self {
            factory: Box::new(factory),
            unique_by: Vec::new(),
        }
    }

    /// Add a uniqueness rule; rules are enforced independently
    pub fn unique_by(mut self, rule: impl Into<UniqueBy>) -> Self {
        self.unique_by.push(rule.into());
        self
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("unique_by", &self.unique_by)
            .finish_non_exhaustive()
    }
}

/// Type name to entity
#[derive(Debug, Default)]
pub struct Schema {
    entities: BTreeMap<String, Entity>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type; a repeated name replaces the earlier entity
    pub fn entity(mut self, name: impl Into<String>, entity: Entity) -> Self {
        self.entities.insert(name.into(), entity);
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Press-wide settings
#[derive(Debug, Clone)]
pub struct PressConfig {
    /// Retry budget for build calls that do not set their own
    pub default_retries: usize,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            default_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Per-call settings for a build function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Overrides the press default for this call only
    pub retries: Option<usize>,
}

impl BuildOptions {
    pub fn retries(retries: usize) -> Self {
        Self {
            retries: Some(retries),
        }
    }
}

struct Slot {
    table: Table,
    factory: Factory,
}

pub struct RecordPress {
    slots: BTreeMap<String, Slot>,
    batches: Vec<Batch>,
    config: PressConfig,
}

impl RecordPress {
    pub fn new(schema: Schema) -> Self {
        Self::with_config(schema, PressConfig::default())
    }

    pub fn with_config(schema: Schema, config: PressConfig) -> Self {
        let slots = schema
            .entities
            .into_iter()
            .map(|(name, entity)| {
                let table = Table::new(name.clone(), &entity.unique_by);
                let slot = Slot {
                    table,
                    factory: entity.factory,
                };
                (name, slot)
            })
            .collect::<BTreeMap<_, _>>();

        tracing::debug!(
            "RecordPress created: types={:?}, default_retries={}",
            slots.keys().collect::<Vec<_>>(),
            config.default_retries
        );

        Self {
            slots,
            batches: Vec::new(),
            config,
        }
    }

    /// Run `builder` once with a handle to every type's build function
    ///
    /// Errors returned by the builder, including retry exhaustion, are passed
    /// through untouched. Batches from build calls that completed before the
    /// error are kept.
    pub fn press<F, E>(&mut self, builder: F) -> std::result::Result<&mut Self, E>
    where
        F: FnOnce(&mut Build<'_>) -> std::result::Result<(), E>,
    {
        let mut build = Build {
            slots: &mut self.slots,
            batches: &mut self.batches,
            default_retries: self.config.default_retries,
        };
        builder(&mut build)?;
        Ok(self)
    }

    /// Reset every table and take all batches in creation order
    pub fn dump(&mut self) -> Vec<Batch> {
        for slot in self.slots.values_mut() {
            slot.table.clear();
        }
        let batches = std::mem::take(&mut self.batches);
        tracing::debug!(
            "RecordPress dump: {} batches, {} rows",
            batches.len(),
            batches.iter().map(|b| b.rows.len()).sum::<usize>()
        );
        batches
    }

    /// Batches waiting for the next dump
    pub fn pending(&self) -> usize {
        self.batches.len()
    }

    pub fn table(&self, type_name: &str) -> Option<&Table> {
        self.slots.get(type_name).map(|slot| &slot.table)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn config(&self) -> &PressConfig {
        &self.config
    }
}

impl fmt::Debug for RecordPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordPress")
            .field("tables", &self.slots.values().map(|s| &s.table).collect::<Vec<_>>())
            .field("pending", &self.batches.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Build functions for every type, valid for one `press`
pub struct Build<'p> {
    slots: &'p mut BTreeMap<String, Slot>,
    batches: &'p mut Vec<Batch>,
    default_retries: usize,
}

impl Build<'_> {
    /// Build one row per seed element with the default retry budget
    pub fn rows<S>(&mut self, type_name: &str, seed: S) -> Result<Vec<Record>>
    where
        S: TryInto<Seed>,
        Error: From<S::Error>,
    {
        self.rows_with(type_name, seed, BuildOptions::default())
    }

    /// Build one row per seed element
    ///
    /// Rows come back in seed order and are also appended to the press as one
    /// batch. On exhaustion no batch is recorded, but rows already accepted by
    /// the table stay indexed until the next dump.
    pub fn rows_with<S>(
        &mut self,
        type_name: &str,
        seed: S,
        options: BuildOptions,
    ) -> Result<Vec<Record>>
    where
        S: TryInto<Seed>,
        Error: From<S::Error>,
    {
        let slot = self
            .slots
            .get_mut(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
        let overrides = seed.try_into()?.into_overrides();
        let retries = options.retries.unwrap_or(self.default_retries);

        let mut generator = RowGenerator::new(&mut slot.table, &mut slot.factory, retries);
        let rows = overrides
            .iter()
            .map(|partial| generator.produce_next(partial))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Built {} \"{}\" rows ({} retries used)",
            rows.len(),
            type_name,
            retries - generator.failures_remaining()
        );

        self.batches.push(Batch {
            type_name: type_name.to_string(),
            rows: rows.clone(),
        });
        Ok(rows)
    }

    /// Build a single row with no overrides
    pub fn one(&mut self, type_name: &str) -> Result<Record> {
        // an empty seed always yields exactly one row
        let mut rows = self.rows(type_name, Seed::empty())?;
        Ok(rows.remove(0))
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::Cell;
    use std::rc::Rc;

    fn init_tracing() {
        use tracing_subscriber::{fmt, EnvFilter};
        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    /// Factory producing strictly increasing ids
    fn counter() -> impl FnMut() -> Record {
        let next = Rc::new(Cell::new(0u64));
        move || {
            let id = next.get();
            next.set(id + 1);
            record(json!({ "id": id }))
        }
    }

    fn users_press() -> RecordPress {
        RecordPress::new(Schema::new().entity("users", Entity::new(counter()).unique_by("id")))
    }

    #[test]
    fn test_absent_seed_builds_one_row() {
        init_tracing();
        let mut press = users_press();
        press
            .press(|build| {
                let rows = build.rows("users", ())?;
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0]["id"], json!(0));
                Ok::<_, Error>(())
            })
            .unwrap();
        assert_eq!(press.pending(), 1);
    }

    #[test]
    fn test_rows_follow_seed_order() {
        init_tracing();
        let mut press = users_press();
        press
            .press(|build| {
                let rows = build.rows(
                    "users",
                    json!([{"name": "a"}, {"name": "b"}, {"name": "c"}]),
                )?;
                let names: Vec<_> = rows.iter().map(|r| r["name"].clone()).collect();
                assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
                Ok::<_, Error>(())
            })
            .unwrap();
    }

    #[test]
    fn test_unknown_type() {
        let mut press = users_press();
        let err = press
            .press(|build| build.rows("pets", ()).map(|_| ()))
            .unwrap_err();
        assert_eq!(err, Error::UnknownType("pets".to_string()));
        assert_eq!(press.pending(), 0);
    }

    #[test]
    fn test_invalid_seed() {
        let mut press = users_press();
        let err = press
            .press(|build| build.rows("users", json!("nope")).map(|_| ()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSeed(_)));
    }

    #[test]
    fn test_each_call_is_its_own_batch() {
        init_tracing();
        let mut press = users_press();
        press
            .press(|build| {
                build.rows("users", Seed::repeat(Record::new(), 2))?;
                build.one("users")?;
                Ok::<_, Error>(())
            })
            .unwrap();

        let batches = press.dump();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].rows.len(), 2);
        assert_eq!(batches[1].rows.len(), 1);
        assert!(batches.iter().all(|b| b.type_name == "users"));
    }

    #[test]
    fn test_retries_option_overrides_default() {
        init_tracing();
        let schema = Schema::new().entity(
            "users",
            Entity::new(|| record(json!({"id": 0}))).unique_by("id"),
        );
        let mut press = RecordPress::with_config(schema, PressConfig { default_retries: 10 });

        let err = press
            .press(|build| {
                build.rows_with("users", Seed::repeat(Record::new(), 2), BuildOptions::retries(2))?;
                Ok::<_, Error>(())
            })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to create unique \"users\" row after 2 retries"
        );

        let err = press
            .press(|build| build.one("users").map(|_| ()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to create unique \"users\" row after 10 retries"
        );
    }

    #[test]
    fn test_failed_call_records_no_batch_but_keeps_keys() {
        init_tracing();
        let ids = Rc::new(Cell::new(0u64));
        let source = ids.clone();
        let schema = Schema::new().entity(
            "users",
            Entity::new(move || record(json!({"id": source.get()}))).unique_by("id"),
        );
        let mut press = RecordPress::new(schema);

        let result = press.press(|build| {
            build.rows_with("users", Seed::repeat(Record::new(), 2), BuildOptions::retries(0))?;
            Ok::<_, Error>(())
        });
        assert!(result.is_err());
        assert_eq!(press.pending(), 0);
        assert_eq!(press.table("users").map(Table::len), Some(1));

        // id 0 is still taken until the next dump
        let result =
            press.press(|build| build.rows_with("users", (), BuildOptions::retries(0)).map(|_| ()));
        assert!(result.is_err());

        ids.set(1);
        press.press(|build| build.one("users").map(|_| ())).unwrap();
        assert_eq!(press.pending(), 1);
    }

    #[test]
    fn test_dump_clears_every_table() {
        init_tracing();
        let schema = Schema::new()
            .entity("users", Entity::new(|| record(json!({"id": 1}))).unique_by("id"))
            .entity("pets", Entity::new(|| record(json!({"id": 1}))).unique_by("id"));
        let mut press = RecordPress::new(schema);

        press
            .press(|build| {
                build.one("users")?;
                build.one("pets")?;
                Ok::<_, Error>(())
            })
            .unwrap();
        assert_eq!(press.dump().len(), 2);
        assert!(press.table("users").unwrap().is_empty());
        assert!(press.table("pets").unwrap().is_empty());

        // only pets pressed since the last dump; users still gets cleared
        press.press(|build| build.one("pets").map(|_| ())).unwrap();
        press.dump();
        press
            .press(|build| {
                build.one("users")?;
                build.one("pets")?;
                Ok::<_, Error>(())
            })
            .unwrap();
    }

    #[test]
    fn test_empty_sequence_records_empty_batch() {
        init_tracing();
        let mut press = users_press();
        press
            .press(|build| {
                let rows = build.rows("users", Seed::Many(Vec::new()))?;
                assert!(rows.is_empty());
                Ok::<_, Error>(())
            })
            .unwrap();

        let batches = press.dump();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].type_name, "users");
        assert!(batches[0].rows.is_empty());
    }

    #[test]
    fn test_float_factory_collides_with_integer_override() {
        init_tracing();
        let schema = Schema::new().entity(
            "users",
            Entity::new(|| record(json!({"id": 1.0}))).unique_by("id"),
        );
        let mut press = RecordPress::new(schema);

        let err = press
            .press(|build| {
                build.one("users")?;
                build.rows_with("users", json!({"id": 1}), BuildOptions::retries(3))?;
                Ok::<_, Error>(())
            })
            .unwrap_err();
        assert_eq!(
            err,
            Error::RetriesExhausted {
                type_name: "users".to_string(),
                retries: 3
            }
        );
        assert_eq!(press.pending(), 1);
    }

    #[test]
    fn test_schema_and_build_introspection() {
        let schema = Schema::new();
        assert!(schema.is_empty());
        let schema = schema
            .entity("users", Entity::new(counter()))
            .entity("pets", Entity::new(counter()))
            .entity("users", Entity::new(counter()).unique_by("id"));
        assert_eq!(schema.len(), 2);

        let mut press = RecordPress::with_config(schema, PressConfig { default_retries: 7 });
        assert_eq!(press.config().default_retries, 7);
        press
            .press(|build| {
                assert_eq!(build.types().collect::<Vec<_>>(), vec!["pets", "users"]);
                Ok::<_, Error>(())
            })
            .unwrap();
    }

    #[test]
    fn test_press_is_chainable() {
        let mut press = users_press();
        let batches = press
            .press(|build| build.one("users").map(|_| ()))
            .unwrap()
            .press(|build| build.one("users").map(|_| ()))
            .unwrap()
            .dump();
        assert_eq!(batches.len(), 2);
        assert_eq!(press.types().collect::<Vec<_>>(), vec!["users"]);
    }
}
