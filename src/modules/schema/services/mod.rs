pub mod resetter;

pub use resetter::{ensure_test_target, reset_schema};
