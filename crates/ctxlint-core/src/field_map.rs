//! Canonical field map produced by every format normalizer.

use serde_json::Value;

/// Kebab-cased key → decoded value, one per context file.
pub type FieldMap = serde_json::Map<String, Value>;

/// Name of a decoded value's shape, for type-mismatch diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Strings, numbers, and booleans are scalars.
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars() {
        assert!(is_scalar(&json!("x")));
        assert!(is_scalar(&json!(80)));
        assert!(is_scalar(&json!(true)));
        assert!(!is_scalar(&json!(null)));
        assert!(!is_scalar(&json!(["x"])));
    }

    #[test]
    fn kinds() {
        assert_eq!(value_kind(&json!([])), "list");
        assert_eq!(value_kind(&json!({})), "map");
        assert_eq!(value_kind(&json!("a,b")), "string");
    }
}
