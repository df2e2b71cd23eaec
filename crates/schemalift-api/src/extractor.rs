//! The extraction orchestrator
//!
//! Sequences enumeration, sampling, inference, and packaging per schema
//! and per table. Schemas and tables run sequentially; a schema's view
//! fetches run concurrently and are awaited together. Entity failures are
//! isolated: a failing table or view becomes a warning and its siblings
//! continue. Only connection and schema-enumeration failures abort a run.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use schemalift_catalog::WarehouseClient;
use schemalift_core::{
    ContainerMetadata, DdlScript, EntityPackage, EntityRef, ErrorReport, ProgressEvent,
    ProgressSink, SamplingSettings, SchemaRef, TracingProgress, ViewPayload,
};
use schemalift_engine::{
    compute_sample_size, expand_semi_structured, handle_complex_types_documents, infer_schema,
    SamplingError,
};

use crate::error::ExtractError;

/// Collection names for one schema, as shown to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCollections {
    /// Schema identifier (`database.schema`)
    pub db_name: String,

    /// Entity names visible in the schema, tables first
    pub db_collections: Vec<String>,

    /// Whether the schema holds no entities
    pub is_empty: bool,
}

/// What to extract and how to sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractRequest {
    /// Schemas to process; empty means every visible schema
    #[serde(default)]
    pub schemas: Vec<SchemaRef>,

    /// Selected entity names per schema FQN; a missing entry selects all
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<String>>,

    /// Record sampling settings
    #[serde(default)]
    pub sampling: SamplingSettings,
}

impl ExtractRequest {
    /// Request everything with the given sampling settings
    pub fn all(sampling: SamplingSettings) -> Self {
        Self {
            schemas: Vec::new(),
            collections: BTreeMap::new(),
            sampling,
        }
    }

    fn is_selected(&self, schema: &SchemaRef, entity: &str) -> bool {
        match self.collections.get(&schema.fqn()) {
            Some(selected) => selected.iter().any(|name| name == entity),
            None => true,
        }
    }
}

/// A per-entity failure that did not abort the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractWarning {
    /// Schema the entity lives in
    pub container: String,

    /// Entity that failed
    pub entity: String,

    /// What went wrong
    pub error: ErrorReport,
}

/// Aggregated result of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractOutcome {
    /// When the run finished (RFC 3339)
    #[serde(default)]
    pub extracted_at: String,

    /// Assembled packages, in schema and table order
    pub packages: Vec<EntityPackage>,

    /// Entities that failed and were skipped
    pub warnings: Vec<ExtractWarning>,
}

/// Orchestrates extraction against an injected warehouse client
pub struct Extractor {
    client: Arc<dyn WarehouseClient>,
    progress: Arc<dyn ProgressSink>,
}

impl Extractor {
    /// Create an extractor reporting progress through `tracing`
    pub fn new(client: Arc<dyn WarehouseClient>) -> Self {
        Self {
            client,
            progress: Arc::new(TracingProgress),
        }
    }

    /// Replace the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Check the connection end to end by enumerating schemas
    pub async fn test_connection(&self) -> Result<(), ExtractError> {
        self.client
            .test_connection()
            .await
            .map_err(|source| ExtractError::Connection {
                warehouse: self.client.name(),
                source,
            })
    }

    /// Enumerate schemas and their entity names without fetching data
    pub async fn collection_names(&self) -> Result<Vec<SchemaCollections>, ExtractError> {
        let schemas = self
            .client
            .list_schemas()
            .await
            .map_err(|source| ExtractError::List { source })?;

        let mut collections = Vec::with_capacity(schemas.len());
        for schema in schemas {
            let listing = self
                .client
                .list_entities(&schema)
                .await
                .map_err(|source| ExtractError::List { source })?;

            collections.push(SchemaCollections {
                db_name: schema.fqn(),
                db_collections: listing.names().iter().map(|n| n.to_string()).collect(),
                is_empty: listing.is_empty(),
            });
        }

        Ok(collections)
    }

    /// Run the full extraction pipeline.
    ///
    /// Returns the assembled packages plus warnings for entities that
    /// failed along the way.
    pub async fn collections_data(
        &self,
        request: &ExtractRequest,
    ) -> Result<ExtractOutcome, ExtractError> {
        if let Err(percent) = request.sampling.validate() {
            return Err(ExtractError::Sampling {
                source: SamplingError::InvalidPercentage(percent),
            });
        }

        let schemas = if request.schemas.is_empty() {
            self.client
                .list_schemas()
                .await
                .map_err(|source| ExtractError::List { source })?
        } else {
            request.schemas.clone()
        };

        let mut outcome = ExtractOutcome::default();

        for schema in &schemas {
            self.extract_schema(schema, request, &mut outcome).await;
        }

        outcome.extracted_at = chrono::Utc::now().to_rfc3339();
        Ok(outcome)
    }

    /// Tear down the session. Nothing is held open between calls, so this
    /// always succeeds.
    pub async fn disconnect(&self) -> Result<(), ExtractError> {
        Ok(())
    }

    /// Process one schema, appending packages and warnings to the outcome
    async fn extract_schema(
        &self,
        schema: &SchemaRef,
        request: &ExtractRequest,
        outcome: &mut ExtractOutcome,
    ) {
        let container = match self.client.get_container_data(schema).await {
            Ok(container) => container,
            Err(source) => {
                self.warn(outcome, schema, &schema.schema, ExtractError::fetch(schema.fqn(), source));
                return;
            }
        };

        let listing = match self.client.list_entities(schema).await {
            Ok(listing) => listing,
            Err(source) => {
                self.warn(outcome, schema, &schema.schema, ExtractError::List { source });
                return;
            }
        };

        for table in &listing.tables {
            if !request.is_selected(schema, table) {
                continue;
            }

            match self
                .extract_table(schema, table, &container, &request.sampling)
                .await
            {
                Ok(package) => outcome.packages.push(package),
                Err(error) => self.warn(outcome, schema, table, error),
            }
        }

        let selected_views: Vec<&String> = listing
            .views
            .iter()
            .filter(|view| request.is_selected(schema, view))
            .collect();

        if selected_views.is_empty() {
            return;
        }

        let fetches = selected_views
            .iter()
            .map(|view| self.extract_view(schema, view.as_str()));
        let results = futures::future::join_all(fetches).await;

        let mut payloads = Vec::new();
        for (view, result) in selected_views.iter().zip(results) {
            match result {
                Ok(payload) => payloads.push(payload),
                Err(error) => self.warn(outcome, schema, view.as_str(), error),
            }
        }

        if !payloads.is_empty() {
            outcome
                .packages
                .push(EntityPackage::views(schema, payloads, container));
        }
    }

    /// Extract one table into a package
    async fn extract_table(
        &self,
        schema: &SchemaRef,
        table: &str,
        container: &ContainerMetadata,
        sampling: &SamplingSettings,
    ) -> Result<EntityPackage, ExtractError> {
        let entity = EntityRef::table(schema.clone(), table);
        self.report(schema, table, "Start getting data from table");

        let ddl = self
            .client
            .get_ddl(&entity)
            .await
            .map_err(|source| ExtractError::fetch(entity.fqn(), source))?;

        let total_rows = self
            .client
            .get_rows_count(&entity)
            .await
            .map_err(|source| ExtractError::fetch(entity.fqn(), source))?;

        let limit = compute_sample_size(total_rows, sampling)?;

        self.report(schema, table, "Fetching records for schema inference");

        let documents = self
            .client
            .get_documents(&entity, limit)
            .await
            .map_err(|source| ExtractError::fetch(entity.fqn(), source))?;

        let entity_data = self
            .client
            .get_entity_data(&entity)
            .await
            .map_err(|source| ExtractError::fetch(entity.fqn(), source))?;

        self.report(schema, table, "Schema inference");

        let expanded = expand_semi_structured(&entity_data, documents.clone());
        let inferred =
            infer_schema(&expanded, &entity.fqn()).map_err(|source| ExtractError::Inference {
                entity: entity.fqn(),
                source,
            })?;
        let handled = handle_complex_types_documents(&inferred, documents);

        self.report(schema, table, "Data retrieved successfully");

        let entity_level = serde_json::to_value(&entity_data)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()));

        Ok(EntityPackage::table(
            schema,
            table,
            entity_level,
            handled,
            DdlScript::new(ddl, self.client.dialect()),
            inferred.to_json_schema(),
            container.clone(),
        ))
    }

    /// Extract one view's payload
    async fn extract_view(
        &self,
        schema: &SchemaRef,
        view: &str,
    ) -> Result<ViewPayload, ExtractError> {
        let entity = EntityRef::view(schema.clone(), view);
        self.report(schema, view, "Start getting data from view");

        let ddl = self
            .client
            .get_view_ddl(&entity)
            .await
            .map_err(|source| ExtractError::fetch(entity.fqn(), source))?;

        let data = self
            .client
            .get_view_data(&entity)
            .await
            .map_err(|source| ExtractError::fetch(entity.fqn(), source))?;

        self.report(schema, view, "Data retrieved successfully");

        Ok(ViewPayload {
            name: view.to_string(),
            data: serde_json::to_value(&data)
                .unwrap_or_else(|_| serde_json::Value::Object(Default::default())),
            ddl: DdlScript::new(ddl, self.client.dialect()),
        })
    }

    fn report(&self, schema: &SchemaRef, entity: &str, message: &str) {
        self.progress
            .progress(ProgressEvent::new(message, schema.fqn(), entity));
    }

    fn warn(
        &self,
        outcome: &mut ExtractOutcome,
        schema: &SchemaRef,
        entity: &str,
        error: ExtractError,
    ) {
        let report = error.to_report();
        tracing::warn!(
            container = %schema.fqn(),
            entity = %entity,
            "skipping entity after failure: {}",
            report.message
        );
        outcome.warnings.push(ExtractWarning {
            container: schema.fqn(),
            entity: entity.to_string(),
            error: report,
        });
    }
}
