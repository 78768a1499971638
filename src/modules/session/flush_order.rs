// Insert ordering for flushed rows
//
// Tables go in foreign-key order. Inside a table that references itself, a
// row goes after the staged row it points at; otherwise staging order holds.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::core::Result;
use crate::modules::registry::{ModelRegistry, Row};

/// `(column, referenced column)` of a foreign key back into the same table
type SelfReference = (String, String);

#[derive(Debug, Clone, Default)]
pub struct FlushOrder {
    ranks: HashMap<String, usize>,
    self_references: HashMap<String, Vec<SelfReference>>,
}

impl FlushOrder {
    /// # Errors
    /// `Schema` when the registered tables reference each other in a cycle
    pub fn from_registry(registry: &ModelRegistry) -> Result<Self> {
        let ranks = registry.table_ranks()?;
        let self_references = registry
            .tables()
            .filter_map(|table| {
                let references: Vec<SelfReference> = table
                    .self_references()
                    .filter_map(|column| {
                        column
                            .references
                            .as_ref()
                            .map(|fk| (column.name.clone(), fk.column.clone()))
                    })
                    .collect();
                (!references.is_empty()).then(|| (table.name.clone(), references))
            })
            .collect();

        Ok(Self {
            ranks,
            self_references,
        })
    }

    /// Tables unknown to the registry go last
    pub fn rank(&self, table: &str) -> usize {
        self.ranks.get(table).copied().unwrap_or(usize::MAX)
    }

    pub fn arrange(&self, mut rows: Vec<Row>) -> Vec<Row> {
        rows.sort_by_key(|row| self.rank(&row.table));

        let mut arranged = Vec::with_capacity(rows.len());
        let mut rows = rows.into_iter().peekable();
        while let Some(first) = rows.next() {
            let mut group = vec![first];
            while let Some(row) = rows.next_if(|row| row.table == group[0].table) {
                group.push(row);
            }

            match self.self_references.get(&group[0].table) {
                Some(references) => arranged.extend(parents_first(group, references)),
                None => arranged.extend(group),
            }
        }
        arranged
    }
}

fn reference_key(column: &str, value: &Value) -> String {
    format!("{}={}", column, value)
}

/// Rows of one table, each placed after the staged row it references
///
/// References to rows that are not staged are left to the store. Rows in a
/// reference cycle keep their staging order.
fn parents_first(rows: Vec<Row>, references: &[SelfReference]) -> Vec<Row> {
    let staged: HashSet<String> = rows
        .iter()
        .flat_map(|row| {
            references.iter().filter_map(move |(_, target)| {
                row.get(target).map(|value| reference_key(target, value))
            })
        })
        .collect();

    let mut inserted: HashSet<String> = HashSet::with_capacity(staged.len());
    let mut ordered = Vec::with_capacity(rows.len());
    let mut waiting = rows;

    while !waiting.is_empty() {
        let before = waiting.len();
        let mut blocked = Vec::new();

        for row in waiting {
            let ready = references.iter().all(|(column, target)| match row.get(column) {
                None | Some(Value::Null) => true,
                Some(value) => {
                    let key = reference_key(target, value);
                    !staged.contains(&key)
                        || inserted.contains(&key)
                        || row.get(target) == Some(value)
                }
            });

            if ready {
                for (_, target) in references {
                    if let Some(value) = row.get(target) {
                        inserted.insert(reference_key(target, value));
                    }
                }
                ordered.push(row);
            } else {
                blocked.push(row);
            }
        }

        if blocked.len() == before {
            tracing::warn!(rows = before, "Self-referencing rows form a cycle");
            ordered.extend(blocked);
            break;
        }
        waiting = blocked;
    }

    ordered
}
