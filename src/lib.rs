//! Integration-test harness for JSON HTTP APIs backed by a relational store.
//!
//! Before each test the schema is recreated and fixture files are loaded;
//! the test body runs inside a synthetic request scope; afterwards pending
//! writes are flushed, the transaction is rolled back and connections are
//! released. JSON:API payloads can be compared in an order-independent form.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use config::{DatabaseConfig, Dialect, HarnessConfig, TeardownPolicy};
pub use crate::core::{init_test_tracing, HarnessError, Result};
pub use modules::canonical::{
    assert_canonical_eq, assert_entities_contain, canonical_repr, canonicalize, compare_entities,
    entities_contain, is_superset, EntityMismatch,
};
pub use modules::client::{assert_status_ok, read_json, TestClient};
pub use modules::fixtures::{load_fixtures, FixtureGroup, FixtureLoader, FixtureSet, LoadReport};
pub use modules::lifecycle::{LifecycleState, TestCase, TestContext, TestHarness};
pub use modules::registry::{Entity, ModelEntry, ModelRegistry, Record, Row};
pub use modules::schema::{ensure_test_target, reset_schema, Column, ColumnType, ForeignKey, Table};
pub use modules::scope::{close_scope, AppContext, RequestId, RequestScope};
pub use modules::session::{Database, Session};
