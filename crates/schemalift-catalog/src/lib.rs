//! Warehouse catalog clients for metadata and sample extraction
//!
//! This crate wraps the vendor SDKs behind one [`WarehouseClient`] trait:
//! schema and entity enumeration, DDL, row counts, sampled rows, and
//! entity/container/view metadata.
//!
//! ## Features
//!
//! Enable warehouse support via Cargo features:
//! - `bigquery` - Google BigQuery support
//! - `snowflake` - Snowflake support
//! - `all-warehouses` - both
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemalift_catalog::{BigQueryWarehouse, ConnectionInfo, WarehouseClient};
//!
//! let info = ConnectionInfo::new([("project_id", "my-project")]);
//! let client = BigQueryWarehouse::connect(&info).await?;
//! let schemas = client.list_schemas().await?;
//! ```

pub mod client;
pub mod connection;
pub mod mock;
pub mod types;

#[cfg(feature = "bigquery")]
pub mod bigquery;

#[cfg(feature = "snowflake")]
pub mod snowflake;

pub use client::{CatalogError, WarehouseClient};
pub use connection::ConnectionInfo;
pub use mock::{MockWarehouse, MockWarehouseBuilder};

#[cfg(feature = "bigquery")]
pub use bigquery::BigQueryWarehouse;

#[cfg(feature = "snowflake")]
pub use snowflake::{SnowflakeWarehouse, SnowflakeWarehouseBuilder};
