//! Extraction errors
//!
//! Wraps the lower-level failures with the phase they happened in, and
//! reduces to the [`ErrorReport`] shape the host receives. The report
//! keeps the typed kind so hosts can branch on it instead of parsing
//! message text.

use schemalift_catalog::CatalogError;
use schemalift_core::{ErrorKind, ErrorReport};
use schemalift_engine::{InferenceError, SamplingError};

/// A failure during an extraction run
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to connect to {warehouse}")]
    Connection {
        warehouse: &'static str,
        #[source]
        source: CatalogError,
    },

    #[error("failed to enumerate schemas")]
    List {
        #[source]
        source: CatalogError,
    },

    #[error("failed to fetch '{entity}'")]
    Fetch {
        entity: String,
        #[source]
        source: CatalogError,
    },

    #[error("schema inference failed for '{entity}'")]
    Inference {
        entity: String,
        #[source]
        source: InferenceError,
    },

    #[error("invalid sampling settings")]
    Sampling {
        #[from]
        source: SamplingError,
    },
}

impl ExtractError {
    /// Wrap a per-entity catalog failure
    pub fn fetch(entity: impl Into<String>, source: CatalogError) -> Self {
        Self::Fetch {
            entity: entity.into(),
            source,
        }
    }

    /// Stable classification that survives the host boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::List { .. } => ErrorKind::List,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Inference { .. } => ErrorKind::Inference,
            Self::Sampling { .. } => ErrorKind::Config,
        }
    }

    /// Reduce to the uniform report handed to the host, logging it first.
    pub fn to_report(&self) -> ErrorReport {
        let report = ErrorReport::from_error(self.kind(), self);
        tracing::error!(kind = %report.kind, "{}", report.stack);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_phases() {
        let err = ExtractError::Connection {
            warehouse: "Snowflake",
            source: CatalogError::Network("timeout".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::Connection);

        let err = ExtractError::fetch(
            "db.raw.users",
            CatalogError::PermissionDenied("no grant".to_string()),
        );
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }

    #[test]
    fn report_carries_cause_chain() {
        let err = ExtractError::fetch(
            "db.raw.users",
            CatalogError::Query("timeout after 30s".to_string()),
        );
        let report = err.to_report();

        assert_eq!(report.kind, ErrorKind::Fetch);
        assert_eq!(report.message, "failed to fetch 'db.raw.users'");
        assert!(report.stack.contains("caused by: Query failed: timeout after 30s"));
    }
}
