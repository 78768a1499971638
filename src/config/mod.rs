use crate::core::{HarnessError, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub mod database;

pub use database::{DatabaseConfig, Dialect};

/// What teardown does with the connection pool once the transaction is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeardownPolicy {
    /// Close every pooled connection; the next setup reconnects
    #[default]
    Dispose,
    /// Keep the pool open across tests
    Keep,
}

impl FromStr for TeardownPolicy {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dispose" => Ok(TeardownPolicy::Dispose),
            "keep" => Ok(TeardownPolicy::Keep),
            other => Err(HarnessError::configuration(format!(
                "Invalid HARNESS_TEARDOWN_POLICY '{}' (expected 'dispose' or 'keep')",
                other
            ))),
        }
    }
}

/// Main harness configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    pub database: DatabaseConfig,
    /// Directory fixture references are resolved against
    pub app_root: PathBuf,
    /// Substring the connection string must contain before a schema reset
    pub test_marker: String,
    pub teardown_policy: TeardownPolicy,
    /// URI given to synthesized request scopes
    pub base_uri: String,
}

impl HarnessConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        HarnessConfig {
            database: DatabaseConfig::new(database_url),
            app_root: default_app_root(),
            test_marker: "test".to_string(),
            teardown_policy: TeardownPolicy::default(),
            base_uri: "http://localhost".to_string(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = HarnessConfig {
            database: DatabaseConfig::from_env()?,
            app_root: env::var("HARNESS_APP_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_app_root()),
            test_marker: env::var("HARNESS_TEST_MARKER").unwrap_or_else(|_| "test".to_string()),
            teardown_policy: env::var("HARNESS_TEARDOWN_POLICY")
                .unwrap_or_else(|_| "dispose".to_string())
                .parse()?,
            base_uri: env::var("HARNESS_BASE_URI")
                .unwrap_or_else(|_| "http://localhost".to_string()),
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(HarnessError::configuration(
                "Max connections must be greater than 0",
            ));
        }

        if self.test_marker.trim().is_empty() {
            return Err(HarnessError::configuration("Test marker must not be empty"));
        }

        self.database.dialect()?;

        Ok(())
    }

    pub fn with_app_root(mut self, app_root: impl Into<PathBuf>) -> Self {
        self.app_root = app_root.into();
        self
    }

    pub fn with_test_marker(mut self, marker: impl Into<String>) -> Self {
        self.test_marker = marker.into();
        self
    }

    pub fn with_teardown_policy(mut self, policy: TeardownPolicy) -> Self {
        self.teardown_policy = policy;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.database.max_connections = max_connections;
        self
    }
}

fn default_app_root() -> PathBuf {
    env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
