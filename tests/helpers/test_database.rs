// Test database helpers
//
// Throwaway SQLite databases in the system temp directory.

use std::path::{Path, PathBuf};

use fixture_harness::{HarnessConfig, TeardownPolicy, TestHarness};
use sqlx::AnyPool;
use tempfile::TempDir;

use super::test_data::sample_registry;

/// A SQLite file inside its own temporary directory
///
/// The directory and everything SQLite puts next to the file go away on drop.
pub struct TempDatabase {
    _dir: TempDir,
    path: PathBuf,
    url: String,
}

impl TempDatabase {
    /// Database whose file name carries the `harness_test` marker
    pub fn new(label: &str) -> Self {
        Self::in_temp_dir(&format!("harness_test_{}.db", label))
    }

    /// A database whose name carries no test marker
    pub fn production(label: &str) -> Self {
        Self::in_temp_dir(&format!("harness_prod_{}.db", label))
    }

    fn in_temp_dir(file_name: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix("fixture-harness-")
            .tempdir()
            .expect("Failed to create temporary directory for test database");
        let path = dir.path().join(file_name);
        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self {
            _dir: dir,
            path,
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// Harness configuration rooted at `tests/`, so fixture references read
/// `fixtures/<name>.yaml`
pub fn harness_config(url: &str) -> HarnessConfig {
    HarnessConfig::new(url)
        .with_app_root(concat!(env!("CARGO_MANIFEST_DIR"), "/tests"))
        .with_test_marker("harness_test")
        .with_max_connections(2)
}

/// Harness over the blog models, backed by `db`
pub fn test_harness(db: &TempDatabase, policy: TeardownPolicy) -> fixture_harness::Result<TestHarness> {
    fixture_harness::init_test_tracing();
    TestHarness::new(
        harness_config(db.url()).with_teardown_policy(policy),
        sample_registry(),
    )
}

pub async fn count_rows(pool: &AnyPool, table: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
}

/// `(id, name, email)` of every user, by id
pub async fn user_rows(pool: &AnyPool) -> Result<Vec<(i64, String, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String, String)>("SELECT id, name, email FROM users ORDER BY id")
        .fetch_all(pool)
        .await
}

/// `(id, user_id, title)` of every post, by id
pub async fn post_rows(pool: &AnyPool) -> Result<Vec<(i64, i64, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, i64, String)>("SELECT id, user_id, title FROM posts ORDER BY id")
        .fetch_all(pool)
        .await
}

/// `(id, parent_id)` of every node, by id
pub async fn node_rows(pool: &AnyPool) -> Result<Vec<(i64, Option<i64>)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, Option<i64>)>("SELECT id, parent_id FROM nodes ORDER BY id")
        .fetch_all(pool)
        .await
}
