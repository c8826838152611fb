//! Semantic JSON equivalence.
//!
//! Two documents are equivalent when they describe the same tree: object key
//! order and whitespace are irrelevant, numbers compare by value, arrays stay
//! order-sensitive.

use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::error::{Error, Result};

fn parse(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| Error::Parse(e.to_string()))
}

/// Compare two JSON texts. Malformed input is an error, never a match.
pub fn equivalent(a: &str, b: &str) -> Result<bool> {
    let a = parse(a)?;
    let b = parse(b)?;
    Ok(values_equivalent(&a, &b))
}

/// Decide whether a change from `old` to `new` can be ignored.
///
/// Fails closed: if either side does not parse, the diff is kept.
pub fn suppress_diff(old: &str, new: &str) -> bool {
    match equivalent(old, new) {
        Ok(same) => same,
        Err(e) => {
            warn!("Cannot compare template bodies, keeping diff: {}", e);
            false
        }
    }
}

pub fn values_equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equivalent(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, l)| y.get(key).is_some_and(|r| values_equivalent(l, r)))
        }
        _ => false,
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

// Integers are never widened to f64, which would merge neighbours above 2^53.
fn float_equals_integer(f: f64, i: i128) -> bool {
    f.is_finite() && f.fract() == 0.0 && f as i128 == i
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x == y,
        (Some(x), None) => b.as_f64().is_some_and(|f| float_equals_integer(f, x)),
        (None, Some(y)) => a.as_f64().is_some_and(|f| float_equals_integer(f, y)),
        (None, None) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Render a value as compact JSON with object keys sorted at every level.
pub fn canonicalize(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&sorted(value))?)
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
