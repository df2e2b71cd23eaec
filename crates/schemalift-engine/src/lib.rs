//! Schemalift engine - schema inference and sampling policy
//!
//! Pure logic over core types, no I/O:
//! - Sampling policy: how many rows to fetch for a table
//! - Schema inference: structural schema from a batch of sampled rows
//! - Document normalization against an inferred schema

pub mod inference;
pub mod sampling;

pub use inference::{
    expand_semi_structured, handle_complex_types_documents, infer_schema, InferenceError,
};
pub use sampling::{compute_sample_size, SamplingError};
