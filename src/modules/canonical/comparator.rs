use std::cmp::Ordering;

use serde_json::Value;

/// Order-independent form of a JSON:API style payload
///
/// Every top-level array is sorted by `id`, then `type`, then the element's
/// JSON text; everything else is copied unchanged. The input is not modified.
/// Applying it twice gives the same result as applying it once.
///
/// # Example
/// ```
/// use fixture_harness::canonicalize;
/// use serde_json::json;
///
/// let payload = json!({
///     "data": {"id": 2, "type": "x"},
///     "included": [{"id": 3, "type": "x"}, {"id": 1, "type": "y"}, {"id": 1, "type": "x"}]
/// });
/// assert_eq!(
///     canonicalize(&payload),
///     json!({
///         "data": {"id": 2, "type": "x"},
///         "included": [{"id": 1, "type": "x"}, {"id": 1, "type": "y"}, {"id": 3, "type": "x"}]
///     })
/// );
/// ```
pub fn canonicalize(payload: &Value) -> Value {
    match payload {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), canonical_field(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn canonical_field(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut sorted = items.clone();
            sorted.sort_by(compare_entities);
            Value::Array(sorted)
        }
        other => other.clone(),
    }
}

/// Total order over entities: `id`, then `type`, then full JSON text
pub fn compare_entities(a: &Value, b: &Value) -> Ordering {
    compare_keys(a.get("id"), b.get("id"))
        .then_with(|| compare_keys(a.get("type"), b.get("type")))
        .then_with(|| a.to_string().cmp(&b.to_string()))
}

fn compare_keys(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_values(a, b),
        _ => rank(a).cmp(&rank(b)),
    }
}

// Missing < null < bool < number < string < array < object
fn rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) => 5,
        Some(Value::Object(_)) => 6,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                a.cmp(&b)
            } else if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                a.cmp(&b)
            } else {
                let a = a.as_f64().unwrap_or_default();
                let b = b.as_f64().unwrap_or_default();
                a.total_cmp(&b)
            }
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ if rank(Some(a)) != rank(Some(b)) => rank(Some(a)).cmp(&rank(Some(b))),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
