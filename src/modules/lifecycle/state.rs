use std::fmt;

/// Phase of the per-test lifecycle
///
/// `Idle → SchemaReset → FixturesLoaded → ScopeOpen → Running → TearingDown → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    SchemaReset,
    FixturesLoaded,
    ScopeOpen,
    Running,
    TearingDown,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::SchemaReset => "schema_reset",
            LifecycleState::FixturesLoaded => "fixtures_loaded",
            LifecycleState::ScopeOpen => "scope_open",
            LifecycleState::Running => "running",
            LifecycleState::TearingDown => "tearing_down",
        }
    }

    /// State reached by the next forward step; teardown wraps back to `Idle`
    pub fn next(&self) -> LifecycleState {
        match self {
            LifecycleState::Idle => LifecycleState::SchemaReset,
            LifecycleState::SchemaReset => LifecycleState::FixturesLoaded,
            LifecycleState::FixturesLoaded => LifecycleState::ScopeOpen,
            LifecycleState::ScopeOpen => LifecycleState::Running,
            LifecycleState::Running => LifecycleState::TearingDown,
            LifecycleState::TearingDown => LifecycleState::Idle,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
