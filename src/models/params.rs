//! Query parameter values
//!
//! A closed set of value kinds that survive the canonical key encoding.

use std::collections::BTreeMap;

use serde_json::Value;

/// Parameter bag attached to a cache key, kept sorted by name.
pub type QueryParams = BTreeMap<String, ParamValue>;

// == Param Value ==
/// A single query parameter value (limit, offset, sort order, filters, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    // == Canonical Form ==
    /// Returns the text emitted into a canonical key.
    ///
    /// Integers and booleans are written literally; floats and nested values
    /// use compact JSON with sorted object keys. Strings are written raw
    /// unless the raw text would parse back as JSON, in which case they are
    /// JSON-quoted.
    pub fn to_canonical(&self) -> String {
        match self {
            ParamValue::String(s) if serde_json::from_str::<Value>(s).is_ok() => {
                Value::String(s.clone()).to_string()
            }
            ParamValue::String(s) => s.clone(),
            ParamValue::Integer(i) => i.to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Float(_) | ParamValue::List(_) | ParamValue::Map(_) => {
                self.to_json().to_string()
            }
        }
    }

    /// Parses text produced by [`ParamValue::to_canonical`].
    ///
    /// A JSON string yields its contents; text that is not JSON at all is
    /// kept as a raw string.
    pub fn parse_canonical(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => ParamValue::from_json(value),
            Err(_) => ParamValue::String(raw.to_string()),
        }
    }

    // == JSON Conversion ==
    /// Converts to a `serde_json::Value`. Non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Integer(i) => Value::from(*i),
            ParamValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::List(items) => Value::Array(items.iter().map(ParamValue::to_json).collect()),
            ParamValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Converts from a `serde_json::Value`. JSON `null` becomes the string `"null"`.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::String("null".to_string()),
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Integer(i),
                None => n
                    .as_f64()
                    .map(ParamValue::Float)
                    .unwrap_or_else(|| ParamValue::String(n.to_string())),
            },
            Value::String(s) => ParamValue::String(s),
            Value::Array(items) => {
                ParamValue::List(items.into_iter().map(ParamValue::from_json).collect())
            }
            Value::Object(map) => ParamValue::Map(
                map.into_iter()
                    .map(|(key, value)| (key, ParamValue::from_json(value)))
                    .collect(),
            ),
        }
    }
}

// == Conversions ==
impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    /// Non-finite floats have no JSON form and are stringified.
    fn from(value: f64) -> Self {
        if value.is_finite() {
            ParamValue::Float(value)
        } else {
            ParamValue::String(value.to_string())
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl<V: Into<ParamValue>> From<Vec<V>> for ParamValue {
    fn from(values: Vec<V>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::from_json(value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives_are_written_literally() {
        assert_eq!(ParamValue::from("desc").to_canonical(), "desc");
        assert_eq!(ParamValue::from(100).to_canonical(), "100");
        assert_eq!(ParamValue::from(true).to_canonical(), "true");
    }

    #[test]
    fn test_float_keeps_fraction_marker() {
        assert_eq!(ParamValue::Float(2.0).to_canonical(), "2.0");
        assert_eq!(ParamValue::parse_canonical("2.0"), ParamValue::Float(2.0));
        assert_eq!(ParamValue::parse_canonical("2"), ParamValue::Integer(2));
    }

    #[test]
    fn test_nested_map_is_sorted() {
        let value = ParamValue::from(json!({"zone": "b", "activity": ["run", 3]}));
        assert_eq!(value.to_canonical(), r#"{"activity":["run",3],"zone":"b"}"#);
        assert_eq!(ParamValue::parse_canonical(&value.to_canonical()), value);
    }

    #[test]
    fn test_unparseable_text_stays_string() {
        assert_eq!(
            ParamValue::parse_canonical("2024-01-01"),
            ParamValue::String("2024-01-01".to_string())
        );
        assert_eq!(
            ParamValue::parse_canonical("null"),
            ParamValue::String("null".to_string())
        );
    }

    #[test]
    fn test_json_looking_strings_are_quoted() {
        for text in ["123", "true", "null", "1.5", "[1]", "{}", "\"quoted\"", " 7"] {
            let value = ParamValue::String(text.to_string());
            let canonical = value.to_canonical();

            assert_ne!(canonical, text, "{} should be quoted", text);
            assert_eq!(ParamValue::parse_canonical(&canonical), value);
        }
    }

    #[test]
    fn test_plain_strings_stay_raw() {
        assert_eq!(ParamValue::from("desc").to_canonical(), "desc");
        assert_eq!(ParamValue::from("").to_canonical(), "");
        assert_eq!(ParamValue::parse_canonical(""), ParamValue::String(String::new()));
    }

    #[test]
    fn test_non_finite_float_is_stringified() {
        assert_eq!(ParamValue::from(f64::NAN), ParamValue::String("NaN".to_string()));
        assert_eq!(
            ParamValue::from(f64::INFINITY),
            ParamValue::String("inf".to_string())
        );
    }

    #[test]
    fn test_json_null_becomes_string() {
        assert_eq!(
            ParamValue::from_json(Value::Null),
            ParamValue::String("null".to_string())
        );
    }
}
