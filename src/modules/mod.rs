pub mod canonical;
pub mod client;
pub mod fixtures;
pub mod lifecycle;
pub mod registry;
pub mod schema;
pub mod scope;
pub mod session;
