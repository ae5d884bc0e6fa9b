//! Tracing event sink

use redraft_application::ports::event_sink::{EventSink, PipelineEvent};
use tracing::info;

/// Emits pipeline events as structured tracing records under a dedicated
/// target, so they can be filtered independently of application logs.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: PipelineEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => info!(target: "redraft::events", event = %json),
            Err(e) => info!(target: "redraft::events", "unserializable event: {}", e),
        }
    }
}
