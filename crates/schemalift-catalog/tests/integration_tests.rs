//! Integration tests for warehouse clients
//!
//! Mock-backed tests run everywhere; tests that talk to a real warehouse
//! are marked `#[ignore]` and keyed off environment variables.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all non-ignored tests (no credentials required)
//! cargo test -p schemalift-catalog --test integration_tests
//!
//! # Run BigQuery integration tests
//! GOOGLE_APPLICATION_CREDENTIALS=/path/to/key.json \
//! SCHEMALIFT_BIGQUERY_PROJECT=my-project \
//! cargo test -p schemalift-catalog --features bigquery --test integration_tests -- --ignored
//!
//! # Run Snowflake integration tests
//! SNOWFLAKE_ACCOUNT=xy12345 \
//! SNOWFLAKE_USER=user \
//! SNOWFLAKE_PASSWORD=pass \
//! SNOWFLAKE_DATABASE=db \
//! cargo test -p schemalift-catalog --features snowflake --test integration_tests -- --ignored
//! ```

mod fixtures;

use schemalift_catalog::mock::MockWarehouseBuilder;
use schemalift_catalog::{CatalogError, MockWarehouse, WarehouseClient};
use schemalift_core::{EntityRef, SchemaRef, ValueKind};

fn has_bigquery_credentials() -> bool {
    std::env::var("GOOGLE_APPLICATION_CREDENTIALS").is_ok()
        || std::env::var("SCHEMALIFT_BIGQUERY_PROJECT").is_ok()
}

fn has_snowflake_credentials() -> bool {
    std::env::var("SNOWFLAKE_ACCOUNT").is_ok()
}

// =============================================================================
// Mock warehouse tests (no credentials required)
// =============================================================================

#[tokio::test]
async fn mock_full_enumeration_workflow() {
    let warehouse = MockWarehouseBuilder::new()
        .with_table_fixture("db", "app", "users", fixtures::users_table())
        .with_view("db", "app", "active_users", fixtures::active_users_view())
        .build();

    let schemas = warehouse.list_schemas().await.unwrap();
    assert_eq!(schemas, vec![SchemaRef::new("db", "app")]);

    let listing = warehouse.list_entities(&schemas[0]).await.unwrap();
    assert_eq!(listing.tables, vec!["users"]);
    assert_eq!(listing.views, vec!["active_users"]);
    assert!(!listing.is_empty());
}

#[tokio::test]
async fn mock_table_fetches() {
    let warehouse = MockWarehouseBuilder::new()
        .with_table_fixture("db", "app", "users", fixtures::users_table())
        .build();

    let table = EntityRef::table(SchemaRef::new("db", "app"), "users");

    let ddl = warehouse.get_ddl(&table).await.unwrap();
    assert!(ddl.starts_with("CREATE TABLE users"));

    assert_eq!(warehouse.get_rows_count(&table).await.unwrap(), 5);

    let documents = warehouse.get_documents(&table, 3).await.unwrap();
    assert_eq!(documents.len(), 3);
    assert_eq!(documents[0]["email"], "user0@example.com");

    let metadata = warehouse.get_entity_data(&table).await.unwrap();
    assert_eq!(metadata.columns.len(), 3);
    assert!(!metadata.find_column("id").unwrap().nullable);
}

#[tokio::test]
async fn mock_view_fetches() {
    let warehouse = MockWarehouseBuilder::new()
        .with_view("db", "app", "active_users", fixtures::active_users_view())
        .build();

    let view = EntityRef::view(SchemaRef::new("db", "app"), "active_users");

    let ddl = warehouse.get_view_ddl(&view).await.unwrap();
    assert!(ddl.starts_with("CREATE VIEW"));

    let data = warehouse.get_view_data(&view).await.unwrap();
    assert_eq!(
        data.definition.as_deref(),
        Some("SELECT * FROM users WHERE is_active")
    );
}

#[tokio::test]
async fn mock_container_metadata_carries_database() {
    let warehouse = MockWarehouseBuilder::new()
        .with_empty_schema("analytics", "staging")
        .build();

    let container = warehouse
        .get_container_data(&SchemaRef::new("analytics", "staging"))
        .await
        .unwrap();
    assert_eq!(container.database, "analytics");
}

#[tokio::test]
async fn mock_error_injection_per_entity() {
    let warehouse = MockWarehouseBuilder::new()
        .with_table_fixture("db", "app", "users", fixtures::users_table())
        .with_error(
            "db.app.users",
            CatalogError::PermissionDenied("revoked".to_string()),
        )
        .build();

    let table = EntityRef::table(SchemaRef::new("db", "app"), "users");
    assert!(matches!(
        warehouse.get_documents(&table, 10).await,
        Err(CatalogError::PermissionDenied(_))
    ));

    // Schema-level enumeration still works
    let listing = warehouse
        .list_entities(&SchemaRef::new("db", "app"))
        .await
        .unwrap();
    assert_eq!(listing.tables, vec!["users"]);
}

#[tokio::test]
async fn mock_connection_failure() {
    let warehouse = MockWarehouse::new().with_connection_failure();
    assert!(matches!(
        warehouse.test_connection().await,
        Err(CatalogError::Network(_))
    ));
}

#[tokio::test]
async fn semi_structured_fixture_round_trip() {
    use schemalift_engine::{expand_semi_structured, infer_schema};

    let warehouse = MockWarehouseBuilder::new()
        .with_table_fixture("db", "app", "events", fixtures::events_table())
        .build();

    let table = EntityRef::table(SchemaRef::new("db", "app"), "events");
    let documents = warehouse.get_documents(&table, 10).await.unwrap();
    let metadata = warehouse.get_entity_data(&table).await.unwrap();

    let expanded = expand_semi_structured(&metadata, documents);
    let schema = infer_schema(&expanded, &table.fqn()).unwrap();

    let payload = schema.field("payload").unwrap();
    assert!(payload.has_kind(ValueKind::Object));
    assert!(payload.properties.contains_key("action"));
    assert!(payload.properties.contains_key("count"));
}

// =============================================================================
// BigQuery integration tests (require credentials)
// =============================================================================

#[tokio::test]
#[ignore] // Run with: cargo test --features bigquery -- --ignored
async fn bigquery_connection() {
    if !has_bigquery_credentials() {
        eprintln!("Skipping BigQuery test: no credentials available");
        eprintln!("Set GOOGLE_APPLICATION_CREDENTIALS or SCHEMALIFT_BIGQUERY_PROJECT");
        return;
    }

    #[cfg(feature = "bigquery")]
    {
        use schemalift_catalog::{BigQueryWarehouse, ConnectionInfo};

        let project_id = std::env::var("SCHEMALIFT_BIGQUERY_PROJECT")
            .or_else(|_| std::env::var("GCP_PROJECT"))
            .expect("SCHEMALIFT_BIGQUERY_PROJECT or GCP_PROJECT must be set");

        let info = ConnectionInfo::new([("project_id", project_id.as_str())]);
        let client = BigQueryWarehouse::connect(&info)
            .await
            .expect("Failed to create BigQuery client");

        client
            .test_connection()
            .await
            .expect("Connection test failed");

        let schemas = client.list_schemas().await.expect("Failed to list schemas");
        println!("BigQuery datasets in {}: {}", project_id, schemas.len());
    }

    #[cfg(not(feature = "bigquery"))]
    {
        eprintln!("BigQuery feature not enabled. Rebuild with --features bigquery");
    }
}

#[tokio::test]
#[ignore]
async fn bigquery_sample_documents() {
    if !has_bigquery_credentials() {
        return;
    }

    #[cfg(feature = "bigquery")]
    {
        use schemalift_catalog::{BigQueryWarehouse, ConnectionInfo};

        let project_id = std::env::var("SCHEMALIFT_BIGQUERY_PROJECT")
            .expect("SCHEMALIFT_BIGQUERY_PROJECT must be set");
        let dataset = std::env::var("SCHEMALIFT_BIGQUERY_DATASET")
            .expect("SCHEMALIFT_BIGQUERY_DATASET must be set");
        let table_name = std::env::var("SCHEMALIFT_BIGQUERY_TABLE")
            .expect("SCHEMALIFT_BIGQUERY_TABLE must be set");

        let info = ConnectionInfo::new([("project_id", project_id.as_str())]);
        let client = BigQueryWarehouse::connect(&info)
            .await
            .expect("Failed to create client");

        let table = EntityRef::table(SchemaRef::new(&project_id, &dataset), &table_name);
        let documents = client
            .get_documents(&table, 10)
            .await
            .expect("Failed to fetch documents");

        assert!(documents.iter().all(|doc| doc.is_object()));
        println!("Fetched {} sampled rows from BigQuery", documents.len());
    }
}

// =============================================================================
// Snowflake integration tests (require credentials)
// =============================================================================

#[tokio::test]
#[ignore]
async fn snowflake_connection() {
    if !has_snowflake_credentials() {
        eprintln!("Skipping Snowflake test: no credentials available");
        eprintln!("Set SNOWFLAKE_ACCOUNT, SNOWFLAKE_USER, SNOWFLAKE_PASSWORD, SNOWFLAKE_DATABASE");
        return;
    }

    #[cfg(feature = "snowflake")]
    {
        use schemalift_catalog::{ConnectionInfo, SnowflakeWarehouse};

        let account = std::env::var("SNOWFLAKE_ACCOUNT").expect("SNOWFLAKE_ACCOUNT must be set");
        let username = std::env::var("SNOWFLAKE_USER").expect("SNOWFLAKE_USER must be set");
        let password = std::env::var("SNOWFLAKE_PASSWORD").expect("SNOWFLAKE_PASSWORD must be set");
        let database = std::env::var("SNOWFLAKE_DATABASE").expect("SNOWFLAKE_DATABASE must be set");

        let mut info = ConnectionInfo::new([
            ("account", account.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
            ("database", database.as_str()),
        ])
        .with_hidden_keys(["password"]);

        if let Ok(warehouse) = std::env::var("SNOWFLAKE_WAREHOUSE") {
            info.settings.insert("warehouse".to_string(), warehouse);
        }

        let client = SnowflakeWarehouse::connect(&info).expect("Failed to create client");

        client
            .test_connection()
            .await
            .expect("Connection test failed");

        let schemas = client.list_schemas().await.expect("Failed to list schemas");
        println!("Snowflake schemas in {}: {}", database, schemas.len());
    }

    #[cfg(not(feature = "snowflake"))]
    {
        eprintln!("Snowflake feature not enabled. Rebuild with --features snowflake");
    }
}
