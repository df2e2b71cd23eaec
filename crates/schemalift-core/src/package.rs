//! Entity packages
//!
//! The [`EntityPackage`] is the unit handed back to the host for each
//! table (and once per schema for its views): sampled documents, the
//! inferred schema, DDL, and container metadata, assembled once and
//! immutable afterwards. Field names serialize in the camelCase shape the
//! host expects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::entity::{ContainerMetadata, SchemaRef};

/// SQL dialect tag attached to DDL scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DdlDialect {
    BigQuery,
    Snowflake,
}

impl DdlDialect {
    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigQuery => "bigquery",
            Self::Snowflake => "snowflake",
        }
    }
}

impl std::fmt::Display for DdlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A DDL statement with its dialect tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdlScript {
    /// The statement text as fetched from the warehouse
    pub script: String,

    /// Dialect the script is written in
    #[serde(rename = "type")]
    pub dialect: DdlDialect,
}

impl DdlScript {
    /// Create a tagged DDL script
    pub fn new(script: impl Into<String>, dialect: DdlDialect) -> Self {
        Self {
            script: script.into(),
            dialect,
        }
    }
}

/// Inferred-schema wrapper inside a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    /// JSON-Schema-like description of the sampled documents
    pub json_schema: Value,
}

/// Container block inside a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    /// Index metadata; warehouses expose none, so this stays empty
    pub indexes: Vec<Value>,

    /// Owning database or project name
    pub database: String,

    /// Extra container attributes reported by the warehouse
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

impl From<ContainerMetadata> for BucketInfo {
    fn from(container: ContainerMetadata) -> Self {
        Self {
            indexes: Vec::new(),
            database: container.database,
            attributes: container.attributes,
        }
    }
}

/// One view's payload inside a per-schema view package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPayload {
    /// View name
    pub name: String,

    /// Definition metadata
    pub data: Value,

    /// View DDL
    pub ddl: DdlScript,
}

/// The bundle returned for one table, or once per schema for its views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPackage {
    /// Schema name the entity lives in
    pub db_name: String,

    /// Table name; absent on view-only packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,

    /// Entity-level metadata; an empty object on view-only packages
    pub entity_level: Value,

    /// Sampled documents, normalized against the inferred schema
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,

    /// View payloads; empty on table packages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<ViewPayload>,

    /// Table DDL; absent on view-only packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddl: Option<DdlScript>,

    /// Whether the containing schema held no entities at all
    pub empty_bucket: bool,

    /// Inferred schema; absent on view-only packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,

    /// Container metadata block
    pub bucket_info: BucketInfo,
}

impl EntityPackage {
    /// Assemble a table package.
    #[allow(clippy::too_many_arguments)]
    pub fn table(
        schema: &SchemaRef,
        collection_name: impl Into<String>,
        entity_level: Value,
        documents: Vec<Document>,
        ddl: DdlScript,
        json_schema: Value,
        container: ContainerMetadata,
    ) -> Self {
        Self {
            db_name: schema.schema.clone(),
            collection_name: Some(collection_name.into()),
            entity_level,
            documents,
            views: Vec::new(),
            ddl: Some(ddl),
            empty_bucket: false,
            validation: Some(Validation { json_schema }),
            bucket_info: container.into(),
        }
    }

    /// Assemble the per-schema view package.
    pub fn views(schema: &SchemaRef, views: Vec<ViewPayload>, container: ContainerMetadata) -> Self {
        Self {
            db_name: schema.schema.clone(),
            collection_name: None,
            entity_level: Value::Object(serde_json::Map::new()),
            documents: Vec::new(),
            views,
            ddl: None,
            empty_bucket: false,
            validation: None,
            bucket_info: container.into(),
        }
    }

    /// Whether this is a view-only package
    pub fn is_view_package(&self) -> bool {
        self.collection_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_container() -> ContainerMetadata {
        ContainerMetadata::new("analytics").with_attribute("location", json!("EU"))
    }

    #[test]
    fn table_package_serializes_host_shape() {
        let schema = SchemaRef::new("analytics", "raw_events");
        let package = EntityPackage::table(
            &schema,
            "pageviews",
            json!({"columns": []}),
            vec![json!({"id": 1})],
            DdlScript::new("CREATE TABLE pageviews (id INT64)", DdlDialect::BigQuery),
            json!({"type": "object"}),
            sample_container(),
        );

        let value = serde_json::to_value(&package).unwrap();
        assert_eq!(value["dbName"], json!("raw_events"));
        assert_eq!(value["collectionName"], json!("pageviews"));
        assert_eq!(value["ddl"]["type"], json!("bigquery"));
        assert_eq!(value["validation"]["jsonSchema"], json!({"type": "object"}));
        assert_eq!(value["bucketInfo"]["database"], json!("analytics"));
        assert_eq!(value["bucketInfo"]["location"], json!("EU"));
        assert_eq!(value["bucketInfo"]["indexes"], json!([]));
        assert_eq!(value["emptyBucket"], json!(false));
    }

    #[test]
    fn view_package_has_empty_entity_level() {
        let schema = SchemaRef::new("analytics", "raw_events");
        let package = EntityPackage::views(
            &schema,
            vec![ViewPayload {
                name: "daily_rollup".to_string(),
                data: json!({"definition": "SELECT 1"}),
                ddl: DdlScript::new("CREATE VIEW daily_rollup AS SELECT 1", DdlDialect::Snowflake),
            }],
            sample_container(),
        );

        assert!(package.is_view_package());
        assert_eq!(package.entity_level, json!({}));

        let value = serde_json::to_value(&package).unwrap();
        assert!(value.get("collectionName").is_none());
        assert!(value.get("ddl").is_none());
        assert_eq!(value["views"][0]["name"], json!("daily_rollup"));
    }
}
