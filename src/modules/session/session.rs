// Unit of work over a single store transaction
//
// Rows are staged in memory and written on flush. The transaction is begun
// lazily and stays open until commit or rollback.

use std::sync::Arc;

use serde_json::Value;
use sqlx::any::{Any, AnyArguments};
use sqlx::{AnyConnection, AnyPool};
use sqlx::query::Query;
use sqlx::Transaction;

use crate::config::Dialect;
use crate::core::{HarnessError, Result};
use crate::modules::registry::{Entity, Row};

use super::flush_order::FlushOrder;

pub struct Session {
    pool: AnyPool,
    dialect: Dialect,
    order: Arc<FlushOrder>,
    tx: Option<Transaction<'static, Any>>,
    pending: Vec<Row>,
}

impl Session {
    /// `order` arranges flushed rows so referenced rows go in first
    pub fn new(pool: AnyPool, dialect: Dialect, order: Arc<FlushOrder>) -> Self {
        Self {
            pool,
            dialect,
            order,
            tx: None,
            pending: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Stage a typed entity for the next flush
    pub fn add<E: Entity>(&mut self, entity: &E) -> Result<()> {
        let row = Row::from_entity(entity).map_err(|source| HarnessError::InvalidEntity {
            model: E::MODEL.to_string(),
            source,
        })?;
        self.stage(row);
        Ok(())
    }

    pub fn stage(&mut self, row: Row) {
        self.pending.push(row);
    }

    pub fn stage_all(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.pending.extend(rows);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    async fn transaction(&mut self) -> Result<&mut Transaction<'static, Any>> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => {
                let tx = self.pool.begin().await?;
                tracing::trace!("Transaction started");
                tx
            }
        };
        Ok(self.tx.insert(tx))
    }

    /// Connection of the active transaction, for queries inside the test body
    ///
    /// # Example
    /// ```no_run
    /// # async fn example(session: &mut fixture_harness::Session) -> fixture_harness::Result<()> {
    /// let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
    ///     .fetch_one(session.connection().await?)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connection(&mut self) -> Result<&mut AnyConnection> {
        let tx = self.transaction().await?;
        Ok(&mut **tx)
    }

    /// Write every staged row inside the active transaction
    ///
    /// Rows are written in dependency order (see [`FlushOrder`]). On failure
    /// the remaining rows are discarded and the transaction must be rolled
    /// back.
    ///
    /// # Errors
    /// - `FlushValidation` when the store rejects an insert
    /// - `Database` when no transaction can be started
    pub async fn flush(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let rows = self.order.arrange(std::mem::take(&mut self.pending));

        let dialect = self.dialect;
        let tx = self.transaction().await?;
        for row in &rows {
            insert_row(&mut **tx, dialect, row).await.map_err(|source| {
                tracing::debug!(table = %row.table, error = %source, "Insert rejected");
                HarnessError::FlushValidation(source)
            })?;
        }

        tracing::debug!(rows = rows.len(), "Flushed pending rows");
        Ok(rows.len())
    }

    /// Flush, then commit the active transaction
    pub async fn commit(&mut self) -> Result<()> {
        self.flush().await?;
        if let Some(tx) = self.tx.take() {
            tx.commit().await.map_err(HarnessError::FlushValidation)?;
            tracing::debug!("Transaction committed");
        }
        Ok(())
    }

    /// Discard staged rows and roll back the active transaction, if any
    pub async fn rollback(&mut self) -> Result<()> {
        let discarded = self.pending.len();
        self.pending.clear();

        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            tracing::debug!(discarded, "Transaction rolled back");
        }
        Ok(())
    }
}

async fn insert_row(
    conn: &mut AnyConnection,
    dialect: Dialect,
    row: &Row,
) -> std::result::Result<(), sqlx::Error> {
    let (sql, binds) = insert_statement(dialect, row);
    let mut query = sqlx::query(&sql);
    for value in binds {
        query = bind_value(query, value);
    }
    query.execute(conn).await?;
    Ok(())
}

/// SQL for one row plus the values to bind, in placeholder order
///
/// NULLs are written inline so no untyped NULL ever reaches the driver.
fn insert_statement(dialect: Dialect, row: &Row) -> (String, Vec<&Value>) {
    let table = dialect.quote(&row.table);
    if row.values.is_empty() {
        let sql = match dialect {
            Dialect::MySql => format!("INSERT INTO {} () VALUES ()", table),
            Dialect::Sqlite => format!("INSERT INTO {} DEFAULT VALUES", table),
        };
        return (sql, Vec::new());
    }

    let mut columns = Vec::with_capacity(row.values.len());
    let mut placeholders = Vec::with_capacity(row.values.len());
    let mut binds = Vec::with_capacity(row.values.len());
    for (column, value) in &row.values {
        columns.push(dialect.quote(column));
        if value.is_null() {
            placeholders.push("NULL");
        } else {
            placeholders.push("?");
            binds.push(value);
        }
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    );
    (sql, binds)
}

fn bind_value<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: &Value,
) -> Query<'q, Any, AnyArguments<'q>> {
    match value {
        Value::Bool(flag) => query.bind(*flag),
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(integer), _) => query.bind(integer),
            (None, Some(real)) if number.is_f64() => query.bind(real),
            // Unsigned beyond i64::MAX, kept exact
            _ => query.bind(number.to_string()),
        },
        Value::String(text) => query.bind(text.clone()),
        // Arrays and objects are stored as JSON text
        other => query.bind(other.to_string()),
    }
}
