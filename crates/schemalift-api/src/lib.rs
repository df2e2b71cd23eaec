//! Schemalift API - extraction orchestrator
//!
//! The host-facing surface: connect, enumerate collections, and assemble
//! one [`schemalift_core::EntityPackage`] per table plus a per-schema
//! view package, with progress reporting and a uniform error report at
//! the boundary.

pub mod error;
pub mod extractor;

pub use error::ExtractError;
pub use extractor::{
    ExtractOutcome, ExtractRequest, ExtractWarning, Extractor, SchemaCollections,
};
