//! Inferred structural schemas
//!
//! An [`InferredSchema`] describes the shape of one entity's sampled
//! documents: field names, the union of observed value kinds per field,
//! and nesting for object and array values. Ordering is deterministic
//! (BTree containers) so inferring twice over the same batch yields an
//! identical schema.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::ValueKind;

/// Structural description of a single field.
///
/// `kinds` is the union of value kinds observed for the field across the
/// sampled batch. When `Object` is among the kinds, `properties` holds
/// the nested fields; when `Array` is among them, `items` describes the
/// element shape merged across all observed elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Union of observed value kinds.
    pub kinds: BTreeSet<ValueKind>,

    /// Nested fields, present when objects were observed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, FieldSchema>,

    /// Element shape, present when arrays were observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldSchema>>,
}

impl FieldSchema {
    /// Create an empty field schema with no observed kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field schema with a single kind.
    pub fn of_kind(kind: ValueKind) -> Self {
        let mut schema = Self::new();
        schema.kinds.insert(kind);
        schema
    }

    /// Whether the given kind was observed for this field.
    pub fn has_kind(&self, kind: ValueKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Whether the field was observed as a container (object or array).
    pub fn is_structured(&self) -> bool {
        self.has_kind(ValueKind::Object) || self.has_kind(ValueKind::Array)
    }

    /// Render this field as a JSON-Schema-like value.
    ///
    /// A single observed kind renders as `"type": "string"`; a union
    /// renders as a type array, preserving every observed kind.
    pub fn to_json_schema(&self) -> Value {
        let mut node = serde_json::Map::new();

        match self.kinds.len() {
            0 => {}
            1 => {
                if let Some(kind) = self.kinds.iter().next() {
                    node.insert("type".to_string(), Value::String(kind.as_str().to_string()));
                }
            }
            _ => {
                let union: Vec<Value> = self
                    .kinds
                    .iter()
                    .map(|k| Value::String(k.as_str().to_string()))
                    .collect();
                node.insert("type".to_string(), Value::Array(union));
            }
        }

        if !self.properties.is_empty() {
            let properties: serde_json::Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, field)| (name.clone(), field.to_json_schema()))
                .collect();
            node.insert("properties".to_string(), Value::Object(properties));
        }

        if let Some(items) = &self.items {
            node.insert("items".to_string(), items.to_json_schema());
        }

        Value::Object(node)
    }
}

/// Inferred schema for one entity's sampled documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredSchema {
    /// Fully qualified entity name the schema was inferred for.
    pub entity: String,

    /// Root object shape: one property per column observed in the batch.
    pub root: FieldSchema,
}

impl InferredSchema {
    /// Create an empty object schema for an entity.
    pub fn empty(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            root: FieldSchema::of_kind(ValueKind::Object),
        }
    }

    /// Look up a top-level field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.root.properties.get(name)
    }

    /// Top-level field names, in deterministic order.
    pub fn field_names(&self) -> Vec<&str> {
        self.root.properties.keys().map(|k| k.as_str()).collect()
    }

    /// Render the schema as the JSON-Schema-like value handed to the host.
    pub fn to_json_schema(&self) -> Value {
        self.root.to_json_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn single_kind_renders_scalar_type() {
        let field = FieldSchema::of_kind(ValueKind::Integer);
        assert_eq!(field.to_json_schema(), json!({"type": "integer"}));
    }

    #[test]
    fn union_renders_type_array() {
        let mut field = FieldSchema::of_kind(ValueKind::Integer);
        field.kinds.insert(ValueKind::String);

        assert_eq!(
            field.to_json_schema(),
            json!({"type": ["integer", "string"]})
        );
    }

    #[test]
    fn nested_properties_render_recursively() {
        let mut inner = FieldSchema::of_kind(ValueKind::Object);
        inner
            .properties
            .insert("b".to_string(), FieldSchema::of_kind(ValueKind::Integer));

        let mut root = FieldSchema::of_kind(ValueKind::Object);
        root.properties.insert("a".to_string(), inner);

        assert_eq!(
            root.to_json_schema(),
            json!({
                "type": "object",
                "properties": {
                    "a": {
                        "type": "object",
                        "properties": {"b": {"type": "integer"}}
                    }
                }
            })
        );
    }

    #[test]
    fn array_items_render() {
        let mut field = FieldSchema::of_kind(ValueKind::Array);
        field.items = Some(Box::new(FieldSchema::of_kind(ValueKind::String)));

        assert_eq!(
            field.to_json_schema(),
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn empty_schema_has_no_fields() {
        let schema = InferredSchema::empty("db.schema.table");
        assert!(schema.field_names().is_empty());
        assert_eq!(schema.to_json_schema(), json!({"type": "object"}));
    }
}
