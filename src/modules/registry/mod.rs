pub mod entity;
pub mod model_registry;

pub use entity::{Entity, Record, Row};
pub use model_registry::{ModelEntry, ModelRegistry};
