pub mod harness;
pub mod state;
pub mod test_case;

pub use harness::{TestContext, TestHarness};
pub use state::LifecycleState;
pub use test_case::TestCase;
