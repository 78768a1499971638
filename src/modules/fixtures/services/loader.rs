// Fixture loading
//
// Reads fixture files in declaration order, builds rows through the model
// registry and commits each file in one flush.

use std::path::{Path, PathBuf};

use crate::core::{HarnessError, Result};
use crate::modules::fixtures::models::FixtureSet;
use crate::modules::registry::{ModelRegistry, Row};
use crate::modules::session::Session;

/// What a load wrote to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub files: usize,
    pub records: usize,
}

pub struct FixtureLoader<'a> {
    registry: &'a ModelRegistry,
    base_path: &'a Path,
}

impl<'a> FixtureLoader<'a> {
    pub fn new(registry: &'a ModelRegistry, base_path: &'a Path) -> Self {
        Self {
            registry,
            base_path,
        }
    }

    /// Relative references resolve against the application root
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Load every referenced file, in order, committing after each file
    ///
    /// # Errors
    /// - `Io` / `FixtureParse` when a file cannot be read or parsed
    /// - `FixtureModelNotFound` when a group names an unregistered model
    /// - `InvalidRecord` when a record does not fit its model
    /// - `FixtureConstraintViolation` when the store rejects the commit
    ///
    /// Files committed before the failing one stay committed; the caller
    /// owns the rollback of anything still pending.
    pub async fn load<S: AsRef<str>>(
        &self,
        session: &mut Session,
        references: &[S],
    ) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for reference in references {
            let path = self.resolve_path(reference.as_ref());
            report.records += self.load_file(session, &path).await?;
            report.files += 1;
        }

        if report.files > 0 {
            tracing::info!(
                files = report.files,
                records = report.records,
                "Fixtures loaded"
            );
        }
        Ok(report)
    }

    pub async fn load_file(&self, session: &mut Session, path: &Path) -> Result<usize> {
        let set = FixtureSet::read(path).await?;
        let rows = self.build_rows(&set)?;
        let count = rows.len();

        session.stage_all(rows);
        session.commit().await.map_err(|err| match err {
            HarnessError::FlushValidation(source) => HarnessError::FixtureConstraintViolation {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        tracing::debug!(path = %path.display(), records = count, "Fixture file committed");
        Ok(count)
    }

    /// Build every row of a file before anything is staged, so a bad group
    /// leaves the session untouched
    fn build_rows(&self, set: &FixtureSet) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(set.record_count());

        for group in &set.groups {
            let entry = self.registry.resolve(&group.model).ok_or_else(|| {
                HarnessError::FixtureModelNotFound {
                    model: group.model.clone(),
                    path: set.path.clone(),
                }
            })?;

            for (index, record) in group.records.iter().enumerate() {
                let row = entry.construct(record.clone()).map_err(|source| {
                    HarnessError::InvalidRecord {
                        model: group.model.clone(),
                        index,
                        source,
                    }
                })?;
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

/// Load `references` (relative to `base_path`) into `session`
pub async fn load_fixtures<S: AsRef<str>>(
    session: &mut Session,
    registry: &ModelRegistry,
    base_path: &Path,
    references: &[S],
) -> Result<LoadReport> {
    FixtureLoader::new(registry, base_path)
        .load(session, references)
        .await
}
