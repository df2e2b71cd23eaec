//! Schema inference over sampled documents
//!
//! Builds an [`InferredSchema`] from a batch of sampled rows. The field
//! set is the union of keys seen across the batch; a field observed with
//! several value kinds keeps all of them, so downstream consumers see the
//! union instead of an arbitrary pick. Objects and arrays are expanded
//! recursively.
//!
//! Semi-structured warehouse columns sometimes deliver their values as
//! embedded JSON text. [`expand_semi_structured`] parses those before
//! inference, and [`handle_complex_types_documents`] normalizes the raw
//! documents against the inferred schema so the emitted documents agree
//! with the emitted schema.

use schemalift_core::{
    Document, EntityMetadata, FieldSchema, InferredSchema, ValueKind,
};

/// Schema inference errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("cannot infer a schema for '{entity}': sampled row is not an object")]
    UnsupportedDocument { entity: String },
}

/// Infer a structural schema from a batch of sampled documents.
///
/// Every document must be a JSON object (one row keyed by column name).
/// An empty batch yields an empty object schema. Inference is
/// deterministic and idempotent over the same batch.
pub fn infer_schema(documents: &[Document], entity: &str) -> Result<InferredSchema, InferenceError> {
    let mut schema = InferredSchema::empty(entity);

    for document in documents {
        let fields = document
            .as_object()
            .ok_or_else(|| InferenceError::UnsupportedDocument {
                entity: entity.to_string(),
            })?;

        for (name, value) in fields {
            let field = schema.root.properties.entry(name.clone()).or_default();
            merge_value(field, value);
        }
    }

    Ok(schema)
}

/// Fold one observed value into a field's schema
fn merge_value(field: &mut FieldSchema, value: &Document) {
    let kind = ValueKind::of(value);
    field.kinds.insert(kind);

    match value {
        Document::Object(map) => {
            for (name, nested) in map {
                let nested_field = field.properties.entry(name.clone()).or_default();
                merge_value(nested_field, nested);
            }
        }
        Document::Array(elements) => {
            let items = field.items.get_or_insert_with(Default::default);
            for element in elements {
                merge_value(items, element);
            }
        }
        _ => {}
    }
}

/// Parse embedded JSON text in semi-structured columns.
///
/// Values of columns whose declared type is semi-structured (VARIANT,
/// OBJECT, JSON, STRUCT, ARRAY) may arrive as JSON text. This replaces
/// each such string with the parsed structure so inference sees the real
/// shape. Strings that do not parse are left alone.
pub fn expand_semi_structured(
    metadata: &EntityMetadata,
    documents: Vec<Document>,
) -> Vec<Document> {
    let semi_structured: Vec<&str> = metadata
        .columns
        .iter()
        .filter(|column| column.column_type.is_semi_structured())
        .map(|column| column.name.as_str())
        .collect();

    if semi_structured.is_empty() {
        return documents;
    }

    documents
        .into_iter()
        .map(|mut document| {
            if let Some(fields) = document.as_object_mut() {
                for name in &semi_structured {
                    if let Some(value) = fields.get_mut(*name) {
                        if let Some(parsed) = parse_embedded_json(value) {
                            *value = parsed;
                        }
                    }
                }
            }
            document
        })
        .collect()
}

/// Normalize raw documents against an inferred schema.
///
/// Where the schema expects an object or array but a document carries
/// JSON text, the text is parsed and the result normalized recursively.
/// Everything else passes through unchanged, so normalized documents are
/// consistent with the schema handed to the host.
pub fn handle_complex_types_documents(
    schema: &InferredSchema,
    documents: Vec<Document>,
) -> Vec<Document> {
    documents
        .into_iter()
        .map(|document| match document {
            Document::Object(map) => {
                let normalized = map
                    .into_iter()
                    .map(|(name, value)| {
                        let value = match schema.field(&name) {
                            Some(field) => normalize_value(field, value),
                            None => value,
                        };
                        (name, value)
                    })
                    .collect();
                Document::Object(normalized)
            }
            other => other,
        })
        .collect()
}

fn normalize_value(field: &FieldSchema, value: Document) -> Document {
    match value {
        Document::String(text) if field.is_structured() => {
            match serde_json::from_str::<Document>(&text) {
                Ok(parsed) if parsed.is_object() || parsed.is_array() => {
                    normalize_value(field, parsed)
                }
                _ => Document::String(text),
            }
        }
        Document::Object(map) => {
            let normalized = map
                .into_iter()
                .map(|(name, nested)| {
                    let nested = match field.properties.get(&name) {
                        Some(nested_field) => normalize_value(nested_field, nested),
                        None => nested,
                    };
                    (name, nested)
                })
                .collect();
            Document::Object(normalized)
        }
        Document::Array(elements) => {
            let normalized = match &field.items {
                Some(items) => elements
                    .into_iter()
                    .map(|element| normalize_value(items, element))
                    .collect(),
                None => elements,
            };
            Document::Array(normalized)
        }
        other => other,
    }
}

/// Try to parse a string value as embedded JSON structure
fn parse_embedded_json(value: &Document) -> Option<Document> {
    let text = value.as_str()?;
    let parsed: Document = serde_json::from_str(text).ok()?;
    (parsed.is_object() || parsed.is_array()).then_some(parsed)
}
