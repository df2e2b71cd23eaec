//! Sampled documents and the value kinds observed in them

use serde::{Deserialize, Serialize};

/// One sampled row, as a nested JSON value.
///
/// Warehouse rows are serialized to JSON on the server side, so nested
/// record and array columns arrive as real structures rather than opaque
/// blobs. A document for a table is always a JSON object keyed by column
/// name; values may be arbitrarily nested.
pub type Document = serde_json::Value;

/// The structural kind of a JSON value.
///
/// This is the unit of union typing during schema inference: a field that
/// was observed as both an integer and a string carries both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Number,
    String,
    Object,
    Array,
}

impl ValueKind {
    /// Classify a JSON value.
    ///
    /// Whole numbers are `Integer`; any float representation is `Number`.
    pub fn of(value: &Document) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(_) => Self::Bool,
            serde_json::Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Self::Integer
                } else {
                    Self::Number
                }
            }
            serde_json::Value::String(_) => Self::String,
            serde_json::Value::Array(_) => Self::Array,
            serde_json::Value::Object(_) => Self::Object,
        }
    }

    /// Stable string identifier, matching JSON Schema type names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_classification() {
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Bool);
        assert_eq!(ValueKind::of(&json!(42)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(4.2)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!("x")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([1])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({"a": 1})), ValueKind::Object);
    }

    #[test]
    fn kind_names_are_json_schema_names() {
        assert_eq!(ValueKind::Bool.as_str(), "boolean");
        assert_eq!(ValueKind::Integer.as_str(), "integer");
        assert_eq!(ValueKind::Object.to_string(), "object");
    }
}
