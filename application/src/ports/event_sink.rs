//! Event sink port
//!
//! Fire-and-forget observability channel. Every component that completes a
//! model call records an event here for audit and evaluation; a sink that
//! fails must swallow the failure rather than surface it into the pipeline.

use redraft_domain::{Category, QualityScore};
use serde::Serialize;

/// Structured pipeline events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    GuardrailEvaluated {
        guardrail: String,
        passed: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    TaskClassified {
        category: Category,
        from_hint: bool,
    },
    FallbackAgentSelected {
        requested: Category,
    },
    DraftGenerated {
        category: Category,
        round: usize,
        title: String,
    },
    CritiqueCollected {
        persona: String,
        delivered: bool,
    },
    FeedbackConsolidated {
        round: usize,
        contributed: usize,
        failed: usize,
        quality: QualityScore,
    },
    RoundCompleted {
        round: usize,
        quality: QualityScore,
    },
    PipelineFinished {
        rounds: usize,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        outcome: Option<String>,
    },
}

/// Observability sink
///
/// `record` is infallible from the caller's point of view: adapters log and
/// swallow their own I/O errors.
pub trait EventSink: Send + Sync {
    fn record(&self, event: PipelineEvent);
}

/// No-op sink for tests and default wiring
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: PipelineEvent) {}
}
