//! Identifiers and metadata for warehouse schemas, tables, and views

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a logical schema inside a warehouse.
///
/// BigQuery maps the project to `database` and the dataset to `schema`;
/// Snowflake uses its native database and schema names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaRef {
    /// Database or project name
    pub database: String,

    /// Schema or dataset name
    pub schema: String,
}

impl SchemaRef {
    /// Create a new schema reference
    pub fn new(database: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
        }
    }

    /// Get the fully qualified name (`database.schema`)
    pub fn fqn(&self) -> String {
        format!("{}.{}", self.database, self.schema)
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// Whether an entity is a table or a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Table,
    View,
}

/// Identifies a table or view inside a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Owning schema
    pub schema: SchemaRef,

    /// Entity name
    pub name: String,

    /// Table or view
    pub kind: EntityKind,
}

impl EntityRef {
    /// Create a table reference
    pub fn table(schema: SchemaRef, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
            kind: EntityKind::Table,
        }
    }

    /// Create a view reference
    pub fn view(schema: SchemaRef, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
            kind: EntityKind::View,
        }
    }

    /// Get the fully qualified name (`database.schema.name`)
    pub fn fqn(&self) -> String {
        format!("{}.{}", self.schema.fqn(), self.name)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// Entities visible in one schema, split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityListing {
    /// Table names
    pub tables: Vec<String>,

    /// View names
    pub views: Vec<String>,
}

impl EntityListing {
    /// Whether the schema holds no tables and no views
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.views.is_empty()
    }

    /// All entity names, tables first
    pub fn names(&self) -> Vec<&str> {
        self.tables
            .iter()
            .chain(self.views.iter())
            .map(|n| n.as_str())
            .collect()
    }
}

/// Portable column type, mapped from warehouse-native type names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },
    String,
    Date,
    Timestamp,

    /// Semi-structured value (Snowflake VARIANT/OBJECT, BigQuery JSON).
    /// Sampled values of these columns may arrive as embedded JSON text
    /// and are expanded before schema inference.
    SemiStructured,

    /// Nested record (BigQuery STRUCT/RECORD)
    Struct,

    /// Repeated value
    Array,

    Unknown,
}

impl ColumnType {
    /// Whether sampled values of this type carry nested structure that
    /// schema inference must expand rather than treat as opaque.
    pub fn is_semi_structured(&self) -> bool {
        matches!(self, Self::SemiStructured | Self::Struct | Self::Array)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                (Some(p), None) => write!(f, "DECIMAL({})", p),
                _ => write!(f, "DECIMAL"),
            },
            Self::String => write!(f, "STRING"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::SemiStructured => write!(f, "SEMI_STRUCTURED"),
            Self::Struct => write!(f, "STRUCT"),
            Self::Array => write!(f, "ARRAY"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A column in an entity's declared structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Warehouse-native type as reported (e.g. `NUMBER(38,0)`, `STRUCT<...>`)
    pub raw_type: String,

    /// Mapped portable type
    pub column_type: ColumnType,

    /// Whether the column accepts NULL
    pub nullable: bool,

    /// 1-indexed position in the table definition
    pub ordinal: u32,
}

impl ColumnInfo {
    /// Create a column with the given mapped type
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            column_type,
            nullable: true,
            ordinal: 0,
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the ordinal position
    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }
}

/// Entity-level structural metadata shown to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    /// Declared columns, in ordinal order
    pub columns: Vec<ColumnInfo>,

    /// Clustering key column names, when the warehouse reports any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clustering_keys: Vec<String>,
}

impl EntityMetadata {
    /// Create metadata from columns only
    pub fn from_columns(columns: Vec<ColumnInfo>) -> Self {
        Self {
            columns,
            clustering_keys: Vec::new(),
        }
    }

    /// Set clustering keys
    pub fn with_clustering_keys(mut self, keys: Vec<String>) -> Self {
        self.clustering_keys = keys;
        self
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Container-level metadata for one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMetadata {
    /// Owning database or project name
    pub database: String,

    /// Extra attributes reported by the warehouse (location, comment, owner)
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ContainerMetadata {
    /// Create container metadata with no extra attributes
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            attributes: serde_json::Map::new(),
        }
    }

    /// Attach an extra attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Definition metadata for one view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewMetadata {
    /// The SELECT statement backing the view, when the warehouse exposes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Extra attributes (comment, owner)
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_and_entity_fqn() {
        let schema = SchemaRef::new("analytics", "raw_events");
        assert_eq!(schema.fqn(), "analytics.raw_events");

        let table = EntityRef::table(schema.clone(), "pageviews");
        assert_eq!(table.fqn(), "analytics.raw_events.pageviews");
        assert_eq!(table.kind, EntityKind::Table);

        let view = EntityRef::view(schema, "daily_rollup");
        assert_eq!(view.kind, EntityKind::View);
        assert_eq!(view.to_string(), "analytics.raw_events.daily_rollup");
    }

    #[test]
    fn listing_emptiness() {
        let listing = EntityListing::default();
        assert!(listing.is_empty());

        let listing = EntityListing {
            tables: vec!["users".to_string()],
            views: vec![],
        };
        assert!(!listing.is_empty());
        assert_eq!(listing.names(), vec!["users"]);
    }

    #[test]
    fn semi_structured_detection() {
        assert!(ColumnType::SemiStructured.is_semi_structured());
        assert!(ColumnType::Struct.is_semi_structured());
        assert!(ColumnType::Array.is_semi_structured());
        assert!(!ColumnType::String.is_semi_structured());
        assert!(!ColumnType::Int.is_semi_structured());
    }

    #[test]
    fn entity_metadata_lookup() {
        let metadata = EntityMetadata::from_columns(vec![
            ColumnInfo::new("id", "INT64", ColumnType::Int).with_ordinal(1),
            ColumnInfo::new("payload", "JSON", ColumnType::SemiStructured).with_ordinal(2),
        ])
        .with_clustering_keys(vec!["id".to_string()]);

        assert!(metadata.find_column("payload").is_some());
        assert!(metadata.find_column("missing").is_none());
        assert_eq!(metadata.clustering_keys, vec!["id"]);
    }
}
