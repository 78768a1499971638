// Schema reset
//
// Drops and recreates every registered table. Refuses to touch a store
// whose connection string does not look like a test database.

use crate::config::DatabaseConfig;
use crate::core::{HarnessError, Result};
use crate::modules::registry::ModelRegistry;
use crate::modules::session::Database;

/// Fail with `NotATestEnvironment` unless the connection string carries `marker`
pub fn ensure_test_target(config: &DatabaseConfig, marker: &str) -> Result<()> {
    if config.is_test_target(marker) {
        return Ok(());
    }

    tracing::error!(
        target_url = %config.redacted_url(),
        marker = %marker,
        "Refusing to reset a schema outside a test database"
    );
    Err(HarnessError::NotATestEnvironment {
        target: config.redacted_url(),
        marker: marker.to_string(),
    })
}

/// Wipe and recreate the schema for every model in `registry`
///
/// # Behavior
/// - Checks the environment guard before any connection is opened
/// - Drops tables in reverse dependency order (`DROP TABLE IF EXISTS`)
/// - Creates tables in dependency order
/// - Repeated calls always leave an empty, freshly created schema
///
/// # Errors
/// - `NotATestEnvironment` when the guard fails (nothing is executed)
/// - `Schema` when the registered tables reference each other in a cycle
/// - `Database` when any DDL statement fails
pub async fn reset_schema(
    database: &mut Database,
    registry: &ModelRegistry,
    marker: &str,
) -> Result<()> {
    ensure_test_target(database.config(), marker)?;

    let dialect = database.dialect();
    let tables = registry.creation_order()?;
    let pool = database.pool().await?;
    let mut conn = pool.acquire().await?;

    for table in tables.iter().rev() {
        sqlx::query(&table.drop_sql(dialect))
            .execute(&mut *conn)
            .await?;
    }

    for table in &tables {
        sqlx::query(&table.create_sql(dialect))
            .execute(&mut *conn)
            .await?;
    }

    tracing::info!(
        target_url = %database.config().redacted_url(),
        tables = tables.len(),
        "Schema reset"
    );

    Ok(())
}
