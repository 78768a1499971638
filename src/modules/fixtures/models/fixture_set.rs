use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{HarnessError, Result};
use crate::modules::registry::Record;

/// Records for one model, in file order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureGroup {
    /// Registered model name, e.g. `app.models.User`
    pub model: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Parsed contents of one fixture file
///
/// The file is a YAML list:
///
/// ```yaml
/// - model: app.models.User
///   records:
///     - id: 1
///       name: John
///     - id: 2
///       name: Jane
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixtureSet {
    pub path: PathBuf,
    pub groups: Vec<FixtureGroup>,
}

impl FixtureSet {
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Result<Self> {
        let path = path.into();
        let groups: Option<Vec<FixtureGroup>> =
            serde_yaml::from_str(contents).map_err(|source| HarnessError::FixtureParse {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            groups: groups.unwrap_or_default(),
        })
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| HarnessError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(path, &contents)
    }

    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }
}
