pub mod models;
pub mod services;

pub use models::{FixtureGroup, FixtureSet};
pub use services::{load_fixtures, FixtureLoader, LoadReport};
