//! Application layer for redraft
//!
//! This crate contains the pipeline use cases, the agent variant family, and
//! the port definitions the infrastructure layer implements. It depends only
//! on the domain layer.

pub mod agents;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use agents::{AgentPorts, DraftAgent, RevisingAgent, registry::AgentRegistry};
pub use ports::{
    event_sink::{EventSink, NoopEventSink, PipelineEvent},
    memory_store::{MemoryError, MemoryStore},
    model_client::{
        GenerationFailure, GenerationRequest, ModelClient, ModelOutput, ModelProfile,
        OutputSchema,
    },
    prompt_renderer::{PromptRenderer, RenderError},
};
pub use use_cases::classify::Classifier;
pub use use_cases::guardrail::{
    Guardrail, GuardrailSet, GuardrailVerdict, ModelGuardrail, RuleGuardrail,
};
pub use use_cases::review_panel::{ReviewPanel, ReviewPanelError, Reviewer};
pub use use_cases::run_pipeline::{
    PipelineError, PipelineOutput, Provenance, RevisionController, Stage, StopReason,
};
