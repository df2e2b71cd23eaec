//! Test fixtures for warehouse client integration tests
//!
//! Reusable table fixtures representing common shapes found in real
//! warehouses: plain scalar tables, tables with semi-structured columns,
//! and views.

use schemalift_catalog::mock::{MockTable, MockView};
use schemalift_core::{ColumnInfo, ColumnType, EntityMetadata, ViewMetadata};
use serde_json::json;

/// A typical users table: scalar columns, five rows
pub fn users_table() -> MockTable {
    MockTable {
        rows: (0..5)
            .map(|i| {
                json!({
                    "id": i,
                    "email": format!("user{}@example.com", i),
                    "is_active": i % 2 == 0,
                })
            })
            .collect(),
        ddl: "CREATE TABLE users (id INT64, email STRING, is_active BOOL)".to_string(),
        metadata: EntityMetadata::from_columns(vec![
            ColumnInfo::new("id", "INT64", ColumnType::Int)
                .with_nullable(false)
                .with_ordinal(1),
            ColumnInfo::new("email", "STRING", ColumnType::String)
                .with_nullable(false)
                .with_ordinal(2),
            ColumnInfo::new("is_active", "BOOL", ColumnType::Bool).with_ordinal(3),
        ]),
    }
}

/// An events table with a VARIANT payload column delivered as JSON text
pub fn events_table() -> MockTable {
    MockTable {
        rows: vec![
            json!({"event_id": "e-1", "payload": "{\"action\": \"click\", \"count\": 3}"}),
            json!({"event_id": "e-2", "payload": "{\"action\": \"scroll\"}"}),
        ],
        ddl: "CREATE TABLE events (event_id VARCHAR, payload VARIANT)".to_string(),
        metadata: EntityMetadata::from_columns(vec![
            ColumnInfo::new("event_id", "VARCHAR(36)", ColumnType::String)
                .with_nullable(false)
                .with_ordinal(1),
            ColumnInfo::new("payload", "VARIANT", ColumnType::SemiStructured).with_ordinal(2),
        ])
        .with_clustering_keys(vec!["event_id".to_string()]),
    }
}

/// A simple view over the users table
pub fn active_users_view() -> MockView {
    MockView {
        ddl: "CREATE VIEW active_users AS SELECT * FROM users WHERE is_active".to_string(),
        data: ViewMetadata {
            definition: Some("SELECT * FROM users WHERE is_active".to_string()),
            attributes: serde_json::Map::new(),
        },
    }
}
