use std::path::PathBuf;

use crate::modules::lifecycle::LifecycleState;

/// Harness-wide Result type
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Main harness error type
///
/// Wrapping variants always keep the original error as `source()` and repeat
/// its message, so test output shows the root cause.
#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    /// Schema reset refused: the connection string lacks the test marker
    #[error("Not a test environment: '{target}' does not contain the marker '{marker}'")]
    NotATestEnvironment { target: String, marker: String },

    /// A fixture group names a model nobody registered
    #[error("Fixture model not found: '{model}' referenced in {}", path.display())]
    FixtureModelNotFound { model: String, path: PathBuf },

    /// The store rejected a fixture record while committing a file
    #[error("Fixture constraint violation in {}: {source}", path.display())]
    FixtureConstraintViolation {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    /// The store rejected staged writes on flush or commit
    #[error("Flush validation error: {0}")]
    FlushValidation(#[source] sqlx::Error),

    /// A record could not be turned into an instance of its model
    #[error("Invalid record #{index} for model '{model}': {source}")]
    InvalidRecord {
        model: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// An entity staged by the test body could not be turned into a row
    #[error("Invalid entity for model '{model}': {source}")]
    InvalidEntity {
        model: String,
        #[source]
        source: serde_json::Error,
    },

    /// Fixture file is not valid YAML or has the wrong shape
    #[error("Fixture parse error in {}: {source}", path.display())]
    FixtureParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Fixture file could not be read
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema metadata errors (e.g. foreign-key cycles)
    #[error("Schema error: {0}")]
    Schema(String),

    /// Lifecycle operation invoked from the wrong state
    #[error("Invalid lifecycle transition: cannot {action} while {from}")]
    InvalidTransition {
        from: LifecycleState,
        action: &'static str,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// Helper functions for common error scenarios
impl HarnessError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        HarnessError::Configuration(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        HarnessError::Schema(msg.into())
    }

    /// Returns the underlying `sqlx` error when the store rejected an operation
    pub fn as_database_error(&self) -> Option<&sqlx::Error> {
        match self {
            HarnessError::FixtureConstraintViolation { source, .. } => Some(source),
            HarnessError::FlushValidation(source) => Some(source),
            HarnessError::Database(source) => Some(source),
            _ => None,
        }
    }
}
