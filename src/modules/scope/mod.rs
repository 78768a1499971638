pub mod app_context;
pub mod request_scope;

pub use app_context::AppContext;
pub use request_scope::{close_scope, RequestId, RequestScope};
