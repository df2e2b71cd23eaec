//! Error report shape surfaced to the host
//!
//! Every failure crosses the host boundary as an [`ErrorReport`]: a
//! stable [`ErrorKind`], the top-level message, and the rendered cause
//! chain. Kinds are stable identifiers; never rename them, only add.

use serde::{Deserialize, Serialize};

/// Stable classification of extraction failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Authentication or network failure while opening the client
    #[serde(rename = "CONNECTION_ERROR")]
    Connection,

    /// Failure enumerating schemas or entities
    #[serde(rename = "LIST_ERROR")]
    List,

    /// Per-entity DDL, row-count, or sample fetch failure
    #[serde(rename = "FETCH_ERROR")]
    Fetch,

    /// Malformed or unsampleable documents
    #[serde(rename = "INFERENCE_ERROR")]
    Inference,

    /// Invalid settings supplied by the caller
    #[serde(rename = "CONFIG_ERROR")]
    Config,
}

impl ErrorKind {
    /// Get the kind as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "CONNECTION_ERROR",
            Self::List => "LIST_ERROR",
            Self::Fetch => "FETCH_ERROR",
            Self::Inference => "INFERENCE_ERROR",
            Self::Config => "CONFIG_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The uniform error object handed to the host callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Stable failure classification
    pub kind: ErrorKind,

    /// Top-level failure message
    pub message: String,

    /// Rendered cause chain, outermost first
    pub stack: String,
}

impl ErrorReport {
    /// Build a report from any error, walking its source chain.
    pub fn from_error(kind: ErrorKind, error: &(dyn std::error::Error + 'static)) -> Self {
        let message = error.to_string();
        let mut stack = message.clone();

        let mut source = error.source();
        while let Some(cause) = source {
            stack.push_str("\ncaused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            kind,
            message,
            stack,
        }
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
