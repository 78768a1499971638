pub mod loader;

pub use loader::{load_fixtures, FixtureLoader, LoadReport};
