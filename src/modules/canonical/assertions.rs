// Entity assertions
//
// Helpers for comparing JSON entity lists returned by the API under test.

use serde_json::Value;

use super::comparator::canonicalize;

/// Why an entity list did not match expectations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntityMismatch {
    #[error("Entity lengths don't match: actual {actual}, expected {expected}")]
    Length { actual: usize, expected: usize },

    #[error("No actual entity for id {id}")]
    Missing { id: Value },

    #[error("Actual does not have everything expected: {actual}, {expected}")]
    Fields { actual: Value, expected: Value },
}

/// Whether every key/value pair of `expected` is present in `actual`
///
/// Non-object values must be equal.
pub fn is_superset(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected
            .iter()
            .all(|(key, value)| actual.get(key) == Some(value)),
        _ => actual == expected,
    }
}

fn entity_id(entity: &Value) -> &Value {
    entity.get("id").unwrap_or(&Value::Null)
}

/// Match entities by `id`: same count, and each actual entity is a
/// superset of the expected one with the same id
pub fn entities_contain(actual: &[Value], expected: &[Value]) -> Result<(), EntityMismatch> {
    if actual.len() != expected.len() {
        return Err(EntityMismatch::Length {
            actual: actual.len(),
            expected: expected.len(),
        });
    }

    for wanted in expected {
        let id = entity_id(wanted);
        // Later entities win when ids repeat
        let found = actual
            .iter()
            .rev()
            .find(|candidate| entity_id(candidate) == id)
            .ok_or_else(|| EntityMismatch::Missing { id: id.clone() })?;

        if !is_superset(found, wanted) {
            return Err(EntityMismatch::Fields {
                actual: found.clone(),
                expected: wanted.clone(),
            });
        }
    }

    Ok(())
}

/// Panicking form of [`entities_contain`] for use in tests
///
/// # Panics
/// If the lists differ in length, an expected id is missing, or a matched
/// entity lacks an expected key/value pair
///
/// # Example
/// ```
/// use fixture_harness::assert_entities_contain;
/// use serde_json::json;
///
/// assert_entities_contain(
///     &[json!({"id": 1, "name": "John", "extra": "x"})],
///     &[json!({"id": 1, "name": "John"})],
/// );
/// ```
#[track_caller]
pub fn assert_entities_contain(actual: &[Value], expected: &[Value]) {
    if let Err(mismatch) = entities_contain(actual, expected) {
        panic!("{}", mismatch);
    }
}

/// Canonical form of a payload, for `assert_eq!` comparisons
pub fn canonical_repr(payload: &Value) -> Value {
    canonicalize(payload)
}

/// Assert two payloads are equal once their collections are put in canonical order
///
/// # Panics
/// If the canonical forms differ
#[track_caller]
pub fn assert_canonical_eq(actual: &Value, expected: &Value) {
    let actual = canonicalize(actual);
    let expected = canonicalize(expected);
    assert_eq!(
        actual, expected,
        "Payloads differ in canonical form.\nactual: {}\nexpected: {}",
        actual, expected
    );
}
