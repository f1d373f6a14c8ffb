/// A dynamically-typed value decoded from an oplog document.
///
/// [`DynamicValue`] is a closed variant over the JSON value shapes the translator understands.
/// Integers and floats are kept apart based on the shape of the source token, since the target
/// relational types differ. Nested documents and arrays are preserved untouched as
/// [`DynamicValue::Other`] and rejected wherever a relational value is required.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Other(serde_json::Value),
}

impl DynamicValue {
    /// Returns a short name of the variant, used in error details.
    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::String(_) => "string",
            DynamicValue::Integer(_) => "integer",
            DynamicValue::Float(_) => "float",
            DynamicValue::Boolean(_) => "boolean",
            DynamicValue::Null => "null",
            DynamicValue::Other(serde_json::Value::Array(_)) => "array",
            DynamicValue::Other(serde_json::Value::Object(_)) => "document",
            DynamicValue::Other(_) => "other",
        }
    }
}

impl From<serde_json::Value> for DynamicValue {
    /// Classifies a decoded JSON value.
    ///
    /// A number becomes [`DynamicValue::Integer`] only when its token had no fraction or exponent
    /// and fits an `i64`; every other number becomes [`DynamicValue::Float`].
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(value) => DynamicValue::String(value),
            serde_json::Value::Bool(value) => DynamicValue::Boolean(value),
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => DynamicValue::Integer(value),
                None => match number.as_f64() {
                    Some(value) => DynamicValue::Float(value),
                    None => DynamicValue::Other(serde_json::Value::Number(number)),
                },
            },
            other => DynamicValue::Other(other),
        }
    }
}

/// A single `(key, value)` pair taken from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: DynamicValue,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::String(value.to_owned())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        DynamicValue::String(value)
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        DynamicValue::Integer(value)
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        DynamicValue::Float(value)
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        DynamicValue::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str) -> DynamicValue {
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        DynamicValue::from(value)
    }

    #[test]
    fn integer_tokens_stay_integers() {
        assert_eq!(classify("5"), DynamicValue::Integer(5));
        assert_eq!(classify("-42"), DynamicValue::Integer(-42));
    }

    #[test]
    fn fraction_or_exponent_tokens_are_floats() {
        assert_eq!(classify("5.0"), DynamicValue::Float(5.0));
        assert_eq!(classify("1e3"), DynamicValue::Float(1000.0));
        assert_eq!(classify("2.5"), DynamicValue::Float(2.5));
    }

    #[test]
    fn integers_outside_i64_are_floats() {
        assert_eq!(
            classify("18446744073709551615"),
            DynamicValue::Float(18446744073709551615.0)
        );
    }

    #[test]
    fn nested_values_are_other() {
        assert_eq!(classify("[1]").type_name(), "array");
        assert_eq!(classify(r#"{"a":1}"#).type_name(), "document");
        assert_eq!(classify("null"), DynamicValue::Null);
    }
}
