pub mod assertions;
pub mod comparator;

pub use assertions::{
    assert_canonical_eq, assert_entities_contain, canonical_repr, entities_contain, is_superset,
    EntityMismatch,
};
pub use comparator::{canonicalize, compare_entities};
