//! BigQuery warehouse client backed by `gcp-bigquery-client`
//!
//! All metadata comes from INFORMATION_SCHEMA views; sampled rows are
//! serialized server-side with `TO_JSON_STRING` so nested RECORD and
//! ARRAY columns arrive as real JSON structures. Requires the usual IAM
//! permissions for table reads and INFORMATION_SCHEMA access:
//! - bigquery.tables.get
//! - bigquery.tables.getData
//!
//! ## Authentication
//!
//! 1. Service account JSON file (`key_file` setting)
//! 2. Service account JSON content (`key_json` setting)
//! 3. Application Default Credentials (ADC) otherwise
//!
//! Reference: https://cloud.google.com/bigquery/docs/information-schema-intro

use gcp_bigquery_client::{
    model::query_request::QueryRequest, model::query_response::ResultSet, Client as GcpClient,
};
use schemalift_core::{
    ColumnInfo, ContainerMetadata, DdlDialect, Document, EntityListing, EntityMetadata, EntityRef,
    SchemaRef, ViewMetadata,
};

use crate::client::{CatalogError, WarehouseClient};
use crate::connection::ConnectionInfo;
use crate::types::map_bigquery_type;

/// BigQuery warehouse client
pub struct BigQueryWarehouse {
    project_id: String,
    client: GcpClient,
}

impl BigQueryWarehouse {
    /// Open a client from connection info.
    ///
    /// Reads `project_id` plus one of `key_file` / `key_json`; falls back
    /// to Application Default Credentials when neither is present.
    pub async fn connect(info: &ConnectionInfo) -> Result<Self, CatalogError> {
        let project_id = info.require("project_id")?.to_string();

        if let Some(key_file) = info.get("key_file") {
            Self::from_service_account_file(project_id, key_file).await
        } else if let Some(key_json) = info.get("key_json") {
            Self::from_service_account_json(project_id, key_json).await
        } else {
            Self::with_adc(project_id).await
        }
    }

    /// Open a client using Application Default Credentials (ADC).
    ///
    /// ADC resolves credentials from GOOGLE_APPLICATION_CREDENTIALS, the
    /// gcloud CLI login, or the GCE/GKE metadata service.
    pub async fn with_adc(project_id: impl Into<String>) -> Result<Self, CatalogError> {
        let client = GcpClient::from_application_default_credentials()
            .await
            .map_err(|e| {
                CatalogError::Authentication(format!(
                    "Failed to authenticate with ADC: {}. \
                     Ensure GOOGLE_APPLICATION_CREDENTIALS is set or run \
                     'gcloud auth application-default login'",
                    e
                ))
            })?;

        Ok(Self {
            project_id: project_id.into(),
            client,
        })
    }

    /// Open a client from a service account key file
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, CatalogError> {
        let key_path_str = key_path.as_ref().to_string_lossy().to_string();

        let client = GcpClient::from_service_account_key_file(&key_path_str)
            .await
            .map_err(|e| {
                CatalogError::Authentication(format!(
                    "Failed to read service account key file '{}': {}",
                    key_path_str, e
                ))
            })?;

        Ok(Self {
            project_id: project_id.into(),
            client,
        })
    }

    /// Open a client from inline service account JSON
    pub async fn from_service_account_json(
        project_id: impl Into<String>,
        key_json: &str,
    ) -> Result<Self, CatalogError> {
        let sa_key: gcp_bigquery_client::yup_oauth2::ServiceAccountKey =
            serde_json::from_str(key_json).map_err(|e| {
                CatalogError::Config(format!("Failed to parse service account JSON: {}", e))
            })?;

        let client = GcpClient::from_service_account_key(sa_key, false)
            .await
            .map_err(|e| {
                CatalogError::Authentication(format!(
                    "Failed to authenticate with service account: {}",
                    e
                ))
            })?;

        Ok(Self {
            project_id: project_id.into(),
            client,
        })
    }

    /// Run a query and wrap the response rows
    async fn query(&self, sql: String, subject: &str) -> Result<ResultSet, CatalogError> {
        let request = QueryRequest::new(sql);
        let response = self
            .client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| classify_query_error(&e.to_string(), subject))?;

        Ok(ResultSet::new_from_query_response(response))
    }

    /// Fetch a single string cell from a one-row query
    async fn query_single_string(
        &self,
        sql: String,
        column: &str,
        subject: &str,
    ) -> Result<String, CatalogError> {
        let mut rs = self.query(sql, subject).await?;

        if !rs.next_row() {
            return Err(CatalogError::EntityNotFound(subject.to_string()));
        }

        rs.get_string_by_name(column)
            .map_err(|e| CatalogError::InvalidResponse(format!("Failed to get {}: {}", column, e)))?
            .ok_or_else(|| {
                CatalogError::InvalidResponse(format!("{} returned NULL for {}", column, subject))
            })
    }

    fn tables_view(&self, schema: &SchemaRef) -> String {
        format!(
            "`{}.{}.INFORMATION_SCHEMA.TABLES`",
            schema.database, schema.schema
        )
    }
}

/// Classify a BigQuery error string into a catalog error
fn classify_query_error(err_str: &str, subject: &str) -> CatalogError {
    if err_str.contains("Not found") {
        CatalogError::EntityNotFound(subject.to_string())
    } else if err_str.contains("Access Denied") || err_str.contains("Permission") {
        CatalogError::PermissionDenied(format!("Cannot access {}: {}", subject, err_str))
    } else {
        CatalogError::Query(err_str.to_string())
    }
}

#[async_trait::async_trait]
impl WarehouseClient for BigQueryWarehouse {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    fn dialect(&self) -> DdlDialect {
        DdlDialect::BigQuery
    }

    async fn list_schemas(&self) -> Result<Vec<SchemaRef>, CatalogError> {
        let sql = format!(
            "SELECT schema_name FROM `{}`.INFORMATION_SCHEMA.SCHEMATA ORDER BY schema_name",
            self.project_id
        );
        let mut rs = self.query(sql, &self.project_id).await?;

        let mut schemas = Vec::new();
        while rs.next_row() {
            let name = rs
                .get_string_by_name("schema_name")
                .map_err(|e| {
                    CatalogError::InvalidResponse(format!("Failed to get schema_name: {}", e))
                })?
                .unwrap_or_default();
            schemas.push(SchemaRef::new(self.project_id.clone(), name));
        }

        Ok(schemas)
    }

    async fn list_entities(&self, schema: &SchemaRef) -> Result<EntityListing, CatalogError> {
        let sql = format!(
            "SELECT table_name, table_type FROM {} ORDER BY table_name",
            self.tables_view(schema)
        );
        let mut rs = self.query(sql, &schema.fqn()).await?;

        let mut listing = EntityListing::default();
        while rs.next_row() {
            let name = rs
                .get_string_by_name("table_name")
                .map_err(|e| {
                    CatalogError::InvalidResponse(format!("Failed to get table_name: {}", e))
                })?
                .unwrap_or_default();
            let kind = rs
                .get_string_by_name("table_type")
                .map_err(|e| {
                    CatalogError::InvalidResponse(format!("Failed to get table_type: {}", e))
                })?
                .unwrap_or_default();

            match kind.as_str() {
                "VIEW" | "MATERIALIZED VIEW" => listing.views.push(name),
                _ => listing.tables.push(name),
            }
        }

        Ok(listing)
    }

    async fn get_ddl(&self, entity: &EntityRef) -> Result<String, CatalogError> {
        let sql = format!(
            "SELECT ddl FROM {} WHERE table_name = '{}'",
            self.tables_view(&entity.schema),
            entity.name
        );
        self.query_single_string(sql, "ddl", &entity.fqn()).await
    }

    async fn get_view_ddl(&self, view: &EntityRef) -> Result<String, CatalogError> {
        // INFORMATION_SCHEMA.TABLES carries the CREATE VIEW statement too
        self.get_ddl(view).await
    }

    async fn get_rows_count(&self, entity: &EntityRef) -> Result<u64, CatalogError> {
        let sql = format!("SELECT COUNT(*) AS total FROM `{}`", entity.fqn());
        let mut rs = self.query(sql, &entity.fqn()).await?;

        if !rs.next_row() {
            return Err(CatalogError::InvalidResponse(format!(
                "COUNT(*) returned no rows for {}",
                entity.fqn()
            )));
        }

        let total = rs
            .get_i64_by_name("total")
            .map_err(|e| CatalogError::InvalidResponse(format!("Failed to get total: {}", e)))?
            .unwrap_or(0);

        Ok(total.max(0) as u64)
    }

    async fn get_documents(
        &self,
        entity: &EntityRef,
        limit: u64,
    ) -> Result<Vec<Document>, CatalogError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT TO_JSON_STRING(t) AS doc FROM `{}` AS t LIMIT {}",
            entity.fqn(),
            limit
        );
        let mut rs = self.query(sql, &entity.fqn()).await?;

        let mut documents = Vec::new();
        while rs.next_row() {
            let raw = rs
                .get_string_by_name("doc")
                .map_err(|e| CatalogError::InvalidResponse(format!("Failed to get doc: {}", e)))?
                .unwrap_or_default();

            let document: Document = serde_json::from_str(&raw).map_err(|e| {
                CatalogError::InvalidResponse(format!(
                    "Row from {} is not valid JSON: {}",
                    entity.fqn(),
                    e
                ))
            })?;
            documents.push(document);
        }

        Ok(documents)
    }

    async fn get_entity_data(&self, entity: &EntityRef) -> Result<EntityMetadata, CatalogError> {
        let sql = format!(
            "SELECT column_name, data_type, is_nullable, ordinal_position, \
             clustering_ordinal_position \
             FROM `{}.{}.INFORMATION_SCHEMA.COLUMNS` \
             WHERE table_name = '{}' \
             ORDER BY ordinal_position",
            entity.schema.database, entity.schema.schema, entity.name
        );
        let mut rs = self.query(sql, &entity.fqn()).await?;

        let mut columns = Vec::new();
        let mut clustering: Vec<(i64, String)> = Vec::new();

        while rs.next_row() {
            let name = rs
                .get_string_by_name("column_name")
                .map_err(|e| {
                    CatalogError::InvalidResponse(format!("Failed to get column_name: {}", e))
                })?
                .unwrap_or_default();

            let data_type = rs
                .get_string_by_name("data_type")
                .map_err(|e| {
                    CatalogError::InvalidResponse(format!("Failed to get data_type: {}", e))
                })?
                .unwrap_or_else(|| "UNKNOWN".to_string());

            let is_nullable = rs
                .get_string_by_name("is_nullable")
                .map_err(|e| {
                    CatalogError::InvalidResponse(format!("Failed to get is_nullable: {}", e))
                })?
                .unwrap_or_else(|| "YES".to_string());

            let ordinal = rs
                .get_i64_by_name("ordinal_position")
                .map_err(|e| {
                    CatalogError::InvalidResponse(format!("Failed to get ordinal_position: {}", e))
                })?
                .unwrap_or(0);

            if let Ok(Some(position)) = rs.get_i64_by_name("clustering_ordinal_position") {
                clustering.push((position, name.clone()));
            }

            columns.push(
                ColumnInfo::new(name, data_type.clone(), map_bigquery_type(&data_type))
                    .with_nullable(is_nullable.eq_ignore_ascii_case("YES"))
                    .with_ordinal(ordinal.max(0) as u32),
            );
        }

        if columns.is_empty() {
            return Err(CatalogError::EntityNotFound(format!(
                "Table {} not found or has no columns",
                entity.fqn()
            )));
        }

        clustering.sort_by_key(|(position, _)| *position);
        let clustering_keys = clustering.into_iter().map(|(_, name)| name).collect();

        Ok(EntityMetadata::from_columns(columns).with_clustering_keys(clustering_keys))
    }

    async fn get_container_data(
        &self,
        schema: &SchemaRef,
    ) -> Result<ContainerMetadata, CatalogError> {
        let sql = format!(
            "SELECT location FROM `{}`.INFORMATION_SCHEMA.SCHEMATA WHERE schema_name = '{}'",
            schema.database, schema.schema
        );
        let mut rs = self.query(sql, &schema.fqn()).await?;

        let mut container = ContainerMetadata::new(schema.database.clone());
        if rs.next_row() {
            if let Ok(Some(location)) = rs.get_string_by_name("location") {
                container = container.with_attribute("location", serde_json::Value::String(location));
            }
        }

        Ok(container)
    }

    async fn get_view_data(&self, view: &EntityRef) -> Result<ViewMetadata, CatalogError> {
        let sql = format!(
            "SELECT view_definition FROM `{}.{}.INFORMATION_SCHEMA.VIEWS` WHERE table_name = '{}'",
            view.schema.database, view.schema.schema, view.name
        );
        let definition = self
            .query_single_string(sql, "view_definition", &view.fqn())
            .await?;

        Ok(ViewMetadata {
            definition: Some(definition),
            attributes: serde_json::Map::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(matches!(
            classify_query_error("Not found: Table x", "p.d.x"),
            CatalogError::EntityNotFound(_)
        ));
        assert!(matches!(
            classify_query_error("Access Denied: no bigquery.tables.getData", "p.d.x"),
            CatalogError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_query_error("Syntax error at [1:1]", "p.d.x"),
            CatalogError::Query(_)
        ));
    }
}
