pub mod test_client;

pub use test_client::{assert_status_ok, read_json, TestClient};
