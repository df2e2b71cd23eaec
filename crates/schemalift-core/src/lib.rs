//! Schemalift Core
//!
//! Domain model for warehouse metadata extraction: sampled documents,
//! inferred schemas, entity packages, sampling settings, progress events,
//! and the error report shape handed back to the host application.

pub mod config;
pub mod document;
pub mod entity;
pub mod error;
pub mod package;
pub mod progress;
pub mod sampling;
pub mod schema;

pub use config::{Config, ConfigError, WarehouseConfig};
pub use document::{Document, ValueKind};
pub use entity::{
    ColumnInfo, ColumnType, ContainerMetadata, EntityKind, EntityListing, EntityMetadata,
    EntityRef, SchemaRef, ViewMetadata,
};
pub use error::{ErrorKind, ErrorReport};
pub use package::{BucketInfo, DdlDialect, DdlScript, EntityPackage, Validation, ViewPayload};
pub use progress::{NullProgress, ProgressEvent, ProgressSink, TracingProgress};
pub use sampling::SamplingSettings;
pub use schema::{FieldSchema, InferredSchema};
