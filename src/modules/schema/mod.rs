pub mod models;
pub mod services;

pub use models::{Column, ColumnType, ForeignKey, Table};
pub use services::{ensure_test_target, reset_schema};
