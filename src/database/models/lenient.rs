//! Deserializers for numeric fields that clients send in more than one shape.
//!
//! Integers, floats and numeric strings are all accepted and kept as a JSON
//! number; `null` counts as absent. Anything else is a type error.

use serde::de::{Deserialize, Deserializer, Error};
use serde_json::{Number, Value};

pub fn number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n)),
        Some(Value::String(s)) => parse_number(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a number, found \"{}\"", s))),
        Some(other) => Err(D::Error::custom(format!("expected a number, found {}", other))),
    }
}

/// Like [`number`] but an absent value counts as zero.
pub fn count<'de, D>(deserializer: D) -> Result<Number, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(deserializer)?.unwrap_or_else(zero))
}

pub fn zero() -> Number {
    Number::from(0)
}

fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(Number::from(n));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}
