//! Engine Wire Format
//!
//! The engine's client transport has no boolean or array types. Booleans
//! travel as 0/1 and arrays as maps keyed `"1"`, `"2"`, ... Receivers probe
//! keys in order until the first gap.

use serde_json::{Map, Value};

/// Coerce a JSON value into the engine's transmissible shape.
pub fn to_networked(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::from(u8::from(*b)),
        Value::Array(items) => Value::Object(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| ((i + 1).to_string(), to_networked(item)))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_networked(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

/// Rebuild a sequence from a 1-indexed map. Plain arrays pass through.
///
/// Stops at the first missing key, so `{"1":a,"2":b,"4":d}` yields `[a, b]`.
pub fn to_array(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::Object(map) => {
            let mut out = Vec::new();
            let mut index = 1usize;
            while let Some(item) = map.get(&index.to_string()) {
                out.push(item.clone());
                index += 1;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Read a networked flag (`true`, `1`, `1.0`). Anything else is false.
pub fn read_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}
