// Test lifecycle controller
//
// Drives schema reset, fixture loading and the request scope on setup, and
// flush / rollback / disposal on teardown. Teardown always runs every step.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use sqlx::AnyPool;

use crate::config::{HarnessConfig, TeardownPolicy};
use crate::core::{HarnessError, Result};
use crate::modules::fixtures::{FixtureLoader, LoadReport};
use crate::modules::registry::ModelRegistry;
use crate::modules::schema;
use crate::modules::scope::{close_scope, AppContext, RequestScope};
use crate::modules::session::{Database, FlushOrder, Session};

use super::state::LifecycleState;
use super::test_case::TestCase;

/// State owned by one running test
pub struct TestContext {
    session: Session,
    scope: Option<RequestScope>,
    fixtures: Vec<String>,
    report: LoadReport,
}

impl TestContext {
    pub fn session(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn scope(&self) -> Option<&RequestScope> {
        self.scope.as_ref()
    }

    /// Fixture references declared by the test case
    pub fn fixtures(&self) -> &[String] {
        &self.fixtures
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }
}

pub struct TestHarness {
    config: HarnessConfig,
    registry: Arc<ModelRegistry>,
    order: Arc<FlushOrder>,
    database: Database,
    app: AppContext,
    state: LifecycleState,
}

impl TestHarness {
    /// # Errors
    /// - `Configuration` when the config does not validate
    /// - `Schema` when the registered tables reference each other in a cycle
    pub fn new(config: HarnessConfig, registry: ModelRegistry) -> Result<Self> {
        config.validate()?;
        let order = FlushOrder::from_registry(&registry)?;
        let database = Database::new(config.database.clone())?;
        let app = AppContext::new(config.base_uri.clone());

        Ok(Self {
            config,
            registry: Arc::new(registry),
            order: Arc::new(order),
            database,
            app,
            state: LifecycleState::Idle,
        })
    }

    pub fn with_app_context(mut self, app: AppContext) -> Self {
        self.app = app;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Whether the connection pool is currently open
    pub fn is_connected(&self) -> bool {
        self.database.is_connected()
    }

    /// Connection pool, reconnecting if a teardown disposed it
    pub async fn pool(&mut self) -> Result<AnyPool> {
        self.database.pool().await
    }

    /// Drop and recreate every registered table, behind the test-database guard
    pub async fn reset_schema(&mut self) -> Result<()> {
        schema::reset_schema(&mut self.database, &self.registry, &self.config.test_marker).await
    }

    /// Open a fresh session on the pool
    pub async fn session(&mut self) -> Result<Session> {
        let pool = self.database.pool().await?;
        Ok(Session::new(
            pool,
            self.database.dialect(),
            Arc::clone(&self.order),
        ))
    }

    fn transition(&mut self, next: LifecycleState) {
        tracing::debug!(from = %self.state, to = %next, "Lifecycle transition");
        self.state = next;
    }

    fn advance(&mut self) {
        self.transition(self.state.next());
    }

    /// Reset the schema, load `T::FIXTURES` and open the request scope
    ///
    /// On failure nothing is left behind: pending work is rolled back,
    /// connections are released and the harness is `Idle` again. A panic in
    /// a hook gets the same cleanup and is then resumed.
    pub async fn setup<T: TestCase>(&mut self, case: &T) -> Result<TestContext> {
        if self.state != LifecycleState::Idle {
            return Err(HarnessError::InvalidTransition {
                from: self.state,
                action: "set up",
            });
        }

        self.advance();
        let schema = AssertUnwindSafe(case.create_schema(self)).catch_unwind().await;
        match schema {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(error = %err, "Schema reset failed");
                self.abort_setup(None).await;
                return Err(err);
            }
            Err(panic) => {
                tracing::error!("Schema hook panicked");
                self.abort_setup(None).await;
                std::panic::resume_unwind(panic)
            }
        }

        let mut session = match self.session().await {
            Ok(session) => session,
            Err(err) => {
                self.abort_setup(None).await;
                return Err(err);
            }
        };

        let fixtures: Vec<String> = T::FIXTURES.iter().map(|f| f.to_string()).collect();
        let loaded = FixtureLoader::new(&self.registry, &self.config.app_root)
            .load(&mut session, &fixtures)
            .await;
        let report = match loaded {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(error = %err, "Fixture loading failed");
                self.abort_setup(Some(session)).await;
                return Err(err);
            }
        };
        self.advance();

        let app = &self.app;
        let opened = std::panic::catch_unwind(AssertUnwindSafe(|| case.create_scope(app)));
        let scope = match opened {
            Ok(scope) => scope,
            Err(panic) => {
                tracing::error!("Scope hook panicked");
                self.abort_setup(Some(session)).await;
                std::panic::resume_unwind(panic)
            }
        };
        self.advance();

        // Handing the context out starts the body
        self.advance();
        Ok(TestContext {
            session,
            scope,
            fixtures,
            report,
        })
    }

    async fn abort_setup(&mut self, session: Option<Session>) {
        if let Some(mut session) = session {
            if let Err(err) = session.rollback().await {
                tracing::error!(error = %err, "Rollback after failed setup failed");
            }
        }
        self.release_connections().await;
        self.transition(LifecycleState::Idle);
    }

    async fn release_connections(&mut self) {
        match self.config.teardown_policy {
            TeardownPolicy::Dispose => self.database.dispose().await,
            TeardownPolicy::Keep => tracing::trace!("Keeping connection pool"),
        }
    }

    /// Flush, roll back, release connections and close the scope
    ///
    /// Every step runs even when an earlier one failed; the first failure is
    /// returned. A write the store rejects is reported as `FlushValidation`.
    pub async fn teardown(&mut self, ctx: TestContext) -> Result<()> {
        if self.state != LifecycleState::Running {
            return Err(HarnessError::InvalidTransition {
                from: self.state,
                action: "tear down",
            });
        }
        self.advance();

        let TestContext {
            mut session, scope, ..
        } = ctx;
        let mut first_error: Option<HarnessError> = None;

        if let Err(err) = session.flush().await {
            tracing::warn!(error = %err, "Flush at teardown failed");
            first_error = Some(err);
        }

        if let Err(err) = session.rollback().await {
            tracing::error!(error = %err, "Rollback at teardown failed");
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
        drop(session);

        self.release_connections().await;
        close_scope(scope);
        self.advance();

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Run `body` between `setup` and `teardown`
    ///
    /// Teardown runs on every exit path: success, error and panic. A panic is
    /// resumed after teardown; a body error takes precedence over a teardown
    /// error.
    ///
    /// # Example
    /// ```no_run
    /// # use fixture_harness::{HarnessConfig, ModelRegistry, TestCase, TestHarness};
    /// struct Smoke;
    /// impl TestCase for Smoke {}
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let mut harness = TestHarness::new(
    ///     HarnessConfig::new("sqlite:///tmp/app_test.db"),
    ///     ModelRegistry::new(),
    /// )?;
    /// harness
    ///     .run(&Smoke, |ctx| {
    ///         Box::pin(async move {
    ///             assert!(ctx.scope().is_some());
    ///             Ok::<_, anyhow::Error>(())
    ///         })
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<T, R, E, F>(&mut self, case: &T, body: F) -> std::result::Result<R, E>
    where
        T: TestCase,
        E: From<HarnessError> + std::fmt::Display,
        F: for<'c> FnOnce(&'c mut TestContext) -> LocalBoxFuture<'c, std::result::Result<R, E>>,
    {
        let mut ctx = self.setup(case).await?;
        let outcome = AssertUnwindSafe(body(&mut ctx)).catch_unwind().await;
        let teardown = self.teardown(ctx).await;

        match outcome {
            Ok(Ok(value)) => {
                teardown?;
                Ok(value)
            }
            Ok(Err(err)) => {
                if let Err(teardown_err) = teardown {
                    tracing::error!(error = %teardown_err, "Teardown failed after test error");
                }
                tracing::debug!(error = %err, "Test body returned an error");
                Err(err)
            }
            Err(panic) => {
                if let Err(teardown_err) = teardown {
                    tracing::error!(error = %teardown_err, "Teardown failed after test panic");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}
