//! The warehouse client trait and its error type

use schemalift_core::{
    ContainerMetadata, DdlDialect, Document, EntityListing, EntityMetadata, EntityRef, SchemaRef,
    ViewMetadata,
};

/// Errors that can occur while talking to a warehouse
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Stateless wrapper over one open warehouse session.
///
/// Every method is an independent request; no state is carried between
/// calls. The orchestrator receives this trait as an injected
/// collaborator, so tests can substitute [`crate::MockWarehouse`].
#[async_trait::async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Client name for logs (e.g. "BigQuery", "Snowflake")
    fn name(&self) -> &'static str;

    /// Dialect tag attached to fetched DDL
    fn dialect(&self) -> DdlDialect;

    /// Enumerate the schemas visible to the credential.
    ///
    /// All-or-nothing: permission denial fails the whole call, partial
    /// listings are never returned.
    async fn list_schemas(&self) -> Result<Vec<SchemaRef>, CatalogError>;

    /// Enumerate a schema's entities, split into tables and views
    async fn list_entities(&self, schema: &SchemaRef) -> Result<EntityListing, CatalogError>;

    /// Fetch the CREATE statement for a table
    async fn get_ddl(&self, entity: &EntityRef) -> Result<String, CatalogError>;

    /// Fetch the CREATE statement for a view
    async fn get_view_ddl(&self, view: &EntityRef) -> Result<String, CatalogError>;

    /// Count the rows currently in a table
    async fn get_rows_count(&self, entity: &EntityRef) -> Result<u64, CatalogError>;

    /// Fetch up to `limit` sampled rows as JSON documents.
    ///
    /// Sampling is deterministic first-N; rows are serialized to JSON on
    /// the server so nested values survive transport intact.
    async fn get_documents(
        &self,
        entity: &EntityRef,
        limit: u64,
    ) -> Result<Vec<Document>, CatalogError>;

    /// Fetch an entity's declared structure (columns, clustering keys)
    async fn get_entity_data(&self, entity: &EntityRef) -> Result<EntityMetadata, CatalogError>;

    /// Fetch container-level metadata for a schema
    async fn get_container_data(
        &self,
        schema: &SchemaRef,
    ) -> Result<ContainerMetadata, CatalogError>;

    /// Fetch a view's definition metadata
    async fn get_view_data(&self, view: &EntityRef) -> Result<ViewMetadata, CatalogError>;

    /// Check the connection by listing schemas and discarding the result
    async fn test_connection(&self) -> Result<(), CatalogError> {
        self.list_schemas().await.map(|_| ())
    }
}
