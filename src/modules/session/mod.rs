pub mod database;
pub mod flush_order;
#[allow(clippy::module_inception)]
pub mod session;

pub use database::Database;
pub use flush_order::FlushOrder;
pub use session::Session;
