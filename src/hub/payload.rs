//! Lenient payload field extraction
//!
//! Producers send loosely shaped JSON. Nothing here fails: a missing or
//! wrong-typed field yields the caller's default.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A JSON object, the shape of every payload and document snapshot
pub type Document = Map<String, Value>;

/// Treat anything but a JSON object as an empty one
pub fn into_object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        Value::Null => Document::new(),
        other => {
            tracing::debug!(payload = %other, "Non-object payload treated as empty");
            Document::new()
        }
    }
}

/// Interpret a JSON value as a non-negative integer count
pub fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| {
            if f.is_finite() && f >= 0.0 {
                Some(f.trunc() as u64)
            } else {
                None
            }
        }),
        _ => None,
    }
}

/// First non-zero count among `keys`, else `default`.
///
/// Zero is skipped like an absent field, so `{likeCount: 0, count: 3}`
/// yields 3 and `{}` yields the default.
pub fn count(body: &Document, keys: &[&str], default: u64) -> u64 {
    keys.iter()
        .filter_map(|k| body.get(*k).and_then(as_count))
        .find(|n| *n > 0)
        .unwrap_or(default)
}

/// Monetary or point value under `key`, defaulting to zero
pub fn amount(body: &Document, key: &str) -> u64 {
    body.get(key).and_then(as_count).unwrap_or(0)
}

/// Serde adapter: lenient count, zero when absent or malformed
pub fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_count(&value).unwrap_or(0))
}

/// Serde adapter: lenient optional count, `None` when null or malformed
pub fn de_opt_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_count(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        into_object(value)
    }

    #[test]
    fn test_into_object() {
        assert_eq!(into_object(json!({"a": 1})).len(), 1);
        assert!(into_object(Value::Null).is_empty());
        assert!(into_object(json!([1, 2])).is_empty());
        assert!(into_object(json!("text")).is_empty());
    }

    #[test]
    fn test_as_count() {
        assert_eq!(as_count(&json!(5)), Some(5));
        assert_eq!(as_count(&json!(2.9)), Some(2));
        assert_eq!(as_count(&json!("7")), Some(7));
        assert_eq!(as_count(&json!(-3)), None);
        assert_eq!(as_count(&json!(null)), None);
        assert_eq!(as_count(&json!({"n": 1})), None);
    }

    #[test]
    fn test_count_falls_through_keys() {
        let body = doc(json!({"likeCount": 5}));
        assert_eq!(count(&body, &["likeCount", "count"], 1), 5);

        let body = doc(json!({"likeCount": 0, "count": 3}));
        assert_eq!(count(&body, &["likeCount", "count"], 1), 3);

        let body = doc(json!({"likeCount": "lots"}));
        assert_eq!(count(&body, &["likeCount", "count"], 1), 1);
    }

    #[test]
    fn test_amount_defaults_to_zero() {
        assert_eq!(amount(&doc(json!({})), "diamondCount"), 0);
        assert_eq!(amount(&doc(json!({"diamondCount": 10})), "diamondCount"), 10);
    }
}
