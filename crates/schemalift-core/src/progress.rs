//! Progress reporting
//!
//! The orchestrator emits a [`ProgressEvent`] at each milestone of a
//! table's extraction. Sinks are injected so the CLI can print colored
//! lines while library users get tracing events or silence.

use serde::{Deserialize, Serialize};

/// One progress milestone during extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Human-readable milestone description
    pub message: String,

    /// Schema the work is happening in (`database.schema`)
    pub container_name: String,

    /// Table or view being processed
    pub entity_name: String,
}

impl ProgressEvent {
    /// Create a progress event
    pub fn new(
        message: impl Into<String>,
        container_name: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            container_name: container_name.into(),
            entity_name: entity_name.into(),
        }
    }
}

/// Receives progress events from the orchestrator
pub trait ProgressSink: Send + Sync {
    /// Handle one progress event
    fn progress(&self, event: ProgressEvent);
}

/// Sink that forwards events to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn progress(&self, event: ProgressEvent) {
        tracing::info!(
            container = %event.container_name,
            entity = %event.entity_name,
            "{}",
            event.message
        );
    }
}

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn progress(&self, _event: ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_camel_case() {
        let event = ProgressEvent::new("Schema inference", "analytics.raw", "pageviews");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["containerName"], "analytics.raw");
        assert_eq!(value["entityName"], "pageviews");
    }
}
