pub mod fixture_set;

pub use fixture_set::{FixtureGroup, FixtureSet};
