//! Mock warehouse for testing
//!
//! Serves predefined schemas, tables, views, and sampled rows from memory
//! without touching any real warehouse. Error injection per entity and a
//! connection-failure switch cover the failure paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemalift_catalog::{MockWarehouseBuilder, WarehouseClient};
//!
//! let warehouse = MockWarehouseBuilder::new()
//!     .with_table("db", "raw", "users", vec![json!({"id": 1})])
//!     .build();
//! let schemas = warehouse.list_schemas().await?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use schemalift_core::{
    ContainerMetadata, DdlDialect, Document, EntityListing, EntityMetadata, EntityRef, SchemaRef,
    ViewMetadata,
};

use crate::client::{CatalogError, WarehouseClient};

/// A table's fixture data
#[derive(Debug, Clone, Default)]
pub struct MockTable {
    /// Sampled rows, served first-N
    pub rows: Vec<Document>,

    /// DDL text returned by `get_ddl`
    pub ddl: String,

    /// Declared structure returned by `get_entity_data`
    pub metadata: EntityMetadata,
}

/// A view's fixture data
#[derive(Debug, Clone, Default)]
pub struct MockView {
    /// DDL text returned by `get_view_ddl`
    pub ddl: String,

    /// Definition metadata returned by `get_view_data`
    pub data: ViewMetadata,
}

#[derive(Debug, Clone)]
struct MockSchemaData {
    container: ContainerMetadata,
    tables: BTreeMap<String, MockTable>,
    views: BTreeMap<String, MockView>,
}

/// In-memory warehouse client for tests
pub struct MockWarehouse {
    schemas: Arc<RwLock<BTreeMap<String, MockSchemaData>>>,
    errors: Arc<RwLock<HashMap<String, CatalogError>>>,
    fail_connection: bool,
    dialect: DdlDialect,
    client_name: &'static str,
}

impl MockWarehouse {
    /// Create an empty mock warehouse
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(BTreeMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            fail_connection: false,
            dialect: DdlDialect::Snowflake,
            client_name: "Mock",
        }
    }

    /// Fail every connection test
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Set the dialect tag used for fixtures
    pub fn with_dialect(mut self, dialect: DdlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Add a table fixture, creating its schema on first use
    pub async fn add_table(&self, schema: SchemaRef, name: &str, table: MockTable) {
        let mut schemas = self.schemas.write().await;
        schemas
            .entry(schema.fqn())
            .or_insert_with(|| empty_schema(&schema))
            .tables
            .insert(name.to_string(), table);
    }

    /// Add a view fixture, creating its schema on first use
    pub async fn add_view(&self, schema: SchemaRef, name: &str, view: MockView) {
        let mut schemas = self.schemas.write().await;
        schemas
            .entry(schema.fqn())
            .or_insert_with(|| empty_schema(&schema))
            .views
            .insert(name.to_string(), view);
    }

    /// Register an empty schema
    pub async fn add_schema(&self, schema: SchemaRef) {
        let mut schemas = self.schemas.write().await;
        schemas
            .entry(schema.fqn())
            .or_insert_with(|| empty_schema(&schema));
    }

    /// Configure an error for a specific entity or schema FQN
    pub async fn add_error_for(&self, fqn: impl Into<String>, error: CatalogError) {
        self.errors.write().await.insert(fqn.into(), error);
    }

    async fn check_error(&self, fqn: &str) -> Result<(), CatalogError> {
        if let Some(error) = self.errors.read().await.get(fqn) {
            return Err(error.clone());
        }
        Ok(())
    }

    async fn with_schema<T>(
        &self,
        schema: &SchemaRef,
        f: impl FnOnce(&MockSchemaData) -> T,
    ) -> Result<T, CatalogError> {
        let schemas = self.schemas.read().await;
        schemas
            .get(&schema.fqn())
            .map(f)
            .ok_or_else(|| CatalogError::EntityNotFound(schema.fqn()))
    }
}

fn empty_schema(schema: &SchemaRef) -> MockSchemaData {
    MockSchemaData {
        container: ContainerMetadata::new(schema.database.clone()),
        tables: BTreeMap::new(),
        views: BTreeMap::new(),
    }
}

impl Default for MockWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockWarehouse {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
            errors: Arc::clone(&self.errors),
            fail_connection: self.fail_connection,
            dialect: self.dialect,
            client_name: self.client_name,
        }
    }
}

#[async_trait::async_trait]
impl WarehouseClient for MockWarehouse {
    fn name(&self) -> &'static str {
        self.client_name
    }

    fn dialect(&self) -> DdlDialect {
        self.dialect
    }

    async fn list_schemas(&self) -> Result<Vec<SchemaRef>, CatalogError> {
        if self.fail_connection {
            return Err(CatalogError::Network(
                "Simulated connection failure".to_string(),
            ));
        }

        let schemas = self.schemas.read().await;
        Ok(schemas
            .keys()
            .filter_map(|fqn| {
                fqn.split_once('.')
                    .map(|(database, schema)| SchemaRef::new(database, schema))
            })
            .collect())
    }

    async fn list_entities(&self, schema: &SchemaRef) -> Result<EntityListing, CatalogError> {
        self.check_error(&schema.fqn()).await?;
        self.with_schema(schema, |data| EntityListing {
            tables: data.tables.keys().cloned().collect(),
            views: data.views.keys().cloned().collect(),
        })
        .await
    }

    async fn get_ddl(&self, entity: &EntityRef) -> Result<String, CatalogError> {
        self.check_error(&entity.fqn()).await?;
        self.with_schema(&entity.schema, |data| {
            data.tables
                .get(&entity.name)
                .map(|table| table.ddl.clone())
                .ok_or_else(|| CatalogError::EntityNotFound(entity.fqn()))
        })
        .await?
    }

    async fn get_view_ddl(&self, view: &EntityRef) -> Result<String, CatalogError> {
        self.check_error(&view.fqn()).await?;
        self.with_schema(&view.schema, |data| {
            data.views
                .get(&view.name)
                .map(|v| v.ddl.clone())
                .ok_or_else(|| CatalogError::EntityNotFound(view.fqn()))
        })
        .await?
    }

    async fn get_rows_count(&self, entity: &EntityRef) -> Result<u64, CatalogError> {
        self.check_error(&entity.fqn()).await?;
        self.with_schema(&entity.schema, |data| {
            data.tables
                .get(&entity.name)
                .map(|table| table.rows.len() as u64)
                .ok_or_else(|| CatalogError::EntityNotFound(entity.fqn()))
        })
        .await?
    }

    async fn get_documents(
        &self,
        entity: &EntityRef,
        limit: u64,
    ) -> Result<Vec<Document>, CatalogError> {
        self.check_error(&entity.fqn()).await?;
        self.with_schema(&entity.schema, |data| {
            data.tables
                .get(&entity.name)
                .map(|table| table.rows.iter().take(limit as usize).cloned().collect())
                .ok_or_else(|| CatalogError::EntityNotFound(entity.fqn()))
        })
        .await?
    }

    async fn get_entity_data(&self, entity: &EntityRef) -> Result<EntityMetadata, CatalogError> {
        self.check_error(&entity.fqn()).await?;
        self.with_schema(&entity.schema, |data| {
            data.tables
                .get(&entity.name)
                .map(|table| table.metadata.clone())
                .ok_or_else(|| CatalogError::EntityNotFound(entity.fqn()))
        })
        .await?
    }

    async fn get_container_data(
        &self,
        schema: &SchemaRef,
    ) -> Result<ContainerMetadata, CatalogError> {
        self.check_error(&schema.fqn()).await?;
        self.with_schema(schema, |data| data.container.clone()).await
    }

    async fn get_view_data(&self, view: &EntityRef) -> Result<ViewMetadata, CatalogError> {
        self.check_error(&view.fqn()).await?;
        self.with_schema(&view.schema, |data| {
            data.views
                .get(&view.name)
                .map(|v| v.data.clone())
                .ok_or_else(|| CatalogError::EntityNotFound(view.fqn()))
        })
        .await?
    }

    async fn test_connection(&self) -> Result<(), CatalogError> {
        if self.fail_connection {
            Err(CatalogError::Network(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Fluent builder for a [`MockWarehouse`] with fixtures preloaded
pub struct MockWarehouseBuilder {
    schemas: BTreeMap<String, MockSchemaData>,
    errors: HashMap<String, CatalogError>,
    fail_connection: bool,
    dialect: DdlDialect,
}

impl MockWarehouseBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            schemas: BTreeMap::new(),
            errors: HashMap::new(),
            fail_connection: false,
            dialect: DdlDialect::Snowflake,
        }
    }

    /// Add a table with rows and an autogenerated DDL stub
    pub fn with_table(
        mut self,
        database: &str,
        schema: &str,
        table: &str,
        rows: Vec<Document>,
    ) -> Self {
        let schema_ref = SchemaRef::new(database, schema);
        self.schemas
            .entry(schema_ref.fqn())
            .or_insert_with(|| empty_schema(&schema_ref))
            .tables
            .insert(
                table.to_string(),
                MockTable {
                    rows,
                    ddl: format!("CREATE TABLE {} (...)", table),
                    metadata: EntityMetadata::default(),
                },
            );
        self
    }

    /// Add a fully specified table fixture
    pub fn with_table_fixture(
        mut self,
        database: &str,
        schema: &str,
        table: &str,
        fixture: MockTable,
    ) -> Self {
        let schema_ref = SchemaRef::new(database, schema);
        self.schemas
            .entry(schema_ref.fqn())
            .or_insert_with(|| empty_schema(&schema_ref))
            .tables
            .insert(table.to_string(), fixture);
        self
    }

    /// Add a view fixture
    pub fn with_view(mut self, database: &str, schema: &str, view: &str, fixture: MockView) -> Self {
        let schema_ref = SchemaRef::new(database, schema);
        self.schemas
            .entry(schema_ref.fqn())
            .or_insert_with(|| empty_schema(&schema_ref))
            .views
            .insert(view.to_string(), fixture);
        self
    }

    /// Register an empty schema
    pub fn with_empty_schema(mut self, database: &str, schema: &str) -> Self {
        let schema_ref = SchemaRef::new(database, schema);
        self.schemas
            .entry(schema_ref.fqn())
            .or_insert_with(|| empty_schema(&schema_ref));
        self
    }

    /// Configure an error for an entity or schema FQN
    pub fn with_error(mut self, fqn: &str, error: CatalogError) -> Self {
        self.errors.insert(fqn.to_string(), error);
        self
    }

    /// Fail every connection test
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Set the dialect tag
    pub fn with_dialect(mut self, dialect: DdlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Build the warehouse
    pub fn build(self) -> MockWarehouse {
        MockWarehouse {
            schemas: Arc::new(RwLock::new(self.schemas)),
            errors: Arc::new(RwLock::new(self.errors)),
            fail_connection: self.fail_connection,
            dialect: self.dialect,
            client_name: "Mock",
        }
    }
}

impl Default for MockWarehouseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
