pub mod table;

pub use table::{Column, ColumnType, ForeignKey, Table};
