use async_trait::async_trait;

use crate::core::Result;
use crate::modules::scope::{AppContext, RequestScope};

use super::harness::TestHarness;

/// Per-test-type declarations and hooks
///
/// ```
/// use fixture_harness::TestCase;
///
/// struct UserApiTest;
///
/// impl TestCase for UserApiTest {
///     const FIXTURES: &'static [&'static str] = &["tests/fixtures/users.yaml"];
/// }
/// ```
#[async_trait(?Send)]
pub trait TestCase {
    /// Fixture files to load, relative to the application root
    const FIXTURES: &'static [&'static str] = &[];

    /// Bring the schema to a clean state; defaults to a full reset
    async fn create_schema(&self, harness: &mut TestHarness) -> Result<()> {
        harness.reset_schema().await
    }

    /// Request scope for the test body; return `None` to run without one
    fn create_scope(&self, app: &AppContext) -> Option<RequestScope> {
        Some(RequestScope::open(app))
    }
}
