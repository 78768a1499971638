use std::collections::{HashMap, HashSet};

use crate::core::{HarnessError, Result};
use crate::modules::schema::Table;

use super::entity::{construct, Entity, Record, Row};

type Constructor = fn(Record) -> std::result::Result<Row, serde_json::Error>;

/// One registered model: its fixture name, its table and how to build rows
#[derive(Debug, Clone)]
pub struct ModelEntry {
    pub name: &'static str,
    pub table: Table,
    constructor: Constructor,
}

impl ModelEntry {
    pub fn construct(&self, record: Record) -> std::result::Result<Row, serde_json::Error> {
        (self.constructor)(record)
    }
}

/// Explicit model lookup used by the fixture loader and the schema resetter
///
/// Populated once at startup; registration order is the tie-breaker for
/// table creation and flush order.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E`, replacing any earlier registration under the same name
    pub fn register<E: Entity>(&mut self) -> &mut Self {
        let entry = ModelEntry {
            name: E::MODEL,
            table: E::table(),
            constructor: construct::<E>,
        };

        match self.entries.iter_mut().find(|e| e.name == E::MODEL) {
            Some(existing) => {
                tracing::warn!(model = E::MODEL, "Model registered twice; keeping the latest");
                *existing = entry;
            }
            None => self.entries.push(entry),
        }
        self
    }

    pub fn with<E: Entity>(mut self) -> Self {
        self.register::<E>();
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.entries.iter().map(|e| &e.table)
    }

    /// Tables ordered so every table comes after the tables it references
    ///
    /// References to tables outside the registry are ignored. Among tables
    /// that are free to go next, registration order wins.
    pub fn creation_order(&self) -> Result<Vec<&Table>> {
        let known: HashSet<&str> = self.tables().map(|t| t.name.as_str()).collect();
        let mut placed: HashSet<&str> = HashSet::with_capacity(known.len());
        let mut ordered: Vec<&Table> = Vec::with_capacity(self.entries.len());

        while ordered.len() < self.entries.len() {
            let before = ordered.len();
            for table in self.tables() {
                if placed.contains(table.name.as_str()) {
                    continue;
                }
                let ready = table
                    .dependencies()
                    .all(|dep| placed.contains(dep) || !known.contains(dep));
                if ready {
                    placed.insert(table.name.as_str());
                    ordered.push(table);
                }
            }

            if ordered.len() == before {
                let stuck: Vec<&str> = self
                    .tables()
                    .map(|t| t.name.as_str())
                    .filter(|name| !placed.contains(name))
                    .collect();
                return Err(HarnessError::schema(format!(
                    "Foreign-key cycle between tables: {}",
                    stuck.join(", ")
                )));
            }
        }

        Ok(ordered)
    }

    /// Position of each table in `creation_order`, used to order inserts
    pub fn table_ranks(&self) -> Result<HashMap<String, usize>> {
        Ok(self
            .creation_order()?
            .into_iter()
            .enumerate()
            .map(|(rank, table)| (table.name.clone(), rank))
            .collect())
    }
}
