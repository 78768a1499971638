use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::modules::schema::Table;

/// Field name → value mapping, as written in a fixture file
pub type Record = serde_json::Map<String, Value>;

/// A persisted model the harness can create tables for and load fixtures into
///
/// # Example
/// ```
/// use fixture_harness::{Column, ColumnType, Entity, Table};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl Entity for User {
///     const MODEL: &'static str = "app.models.User";
///
///     fn table() -> Table {
///         Table::new("users")
///             .column(Column::new("id", ColumnType::Integer).primary_key())
///             .column(Column::new("name", ColumnType::Text).not_null())
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + 'static {
    /// Name fixture files use in their `model` field
    const MODEL: &'static str;

    fn table() -> Table;
}

/// Values ready for one INSERT, in table column order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub table: String,
    pub values: Vec<(String, Value)>,
}

impl Row {
    /// # Errors
    /// When `entity` does not serialize, or holds an integer no signed
    /// 64-bit column can store
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(entity)?;
        let row = Self::project(&E::table(), value);

        if let Some((column, value)) = row
            .values
            .iter()
            .find(|(_, value)| value.is_u64() && value.as_i64().is_none())
        {
            return Err(serde::ser::Error::custom(format!(
                "value {} for column '{}' is out of range for a signed 64-bit integer",
                value, column
            )));
        }
        Ok(row)
    }

    /// Keep the fields the table has a column for; absent fields are left to the store
    pub fn project(table: &Table, value: Value) -> Self {
        let values = match value {
            Value::Object(mut fields) => table
                .columns
                .iter()
                .filter_map(|column| {
                    fields
                        .remove(&column.name)
                        .map(|value| (column.name.clone(), value))
                })
                .collect(),
            _ => Vec::new(),
        };

        Row {
            table: table.name.clone(),
            values,
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Build an `E` from a fixture record and turn it into an insertable row
pub(crate) fn construct<E: Entity>(record: Record) -> Result<Row, serde_json::Error> {
    let entity: E = serde_json::from_value(Value::Object(record))?;
    Row::from_entity(&entity)
}
