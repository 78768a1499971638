// Test helper modules
//
// Shared by the integration tests through `#[path = "../helpers/mod.rs"]`.
// Every test gets its own SQLite file whose name carries the test marker.
//
// Example:
//   #[tokio::test]
//   async fn test_users_are_loaded() -> anyhow::Result<()> {
//       let db = TempDatabase::new("users");
//       let mut harness = test_harness(&db, TeardownPolicy::Keep)?;
//       harness.reset_schema().await?;
//       ...
//   }

#![allow(dead_code)]

pub mod test_data;
pub mod test_database;

pub use test_data::*;
pub use test_database::*;
