//! The agent variant family
//!
//! One agent per task category, all behind the same pair of traits. The
//! capability split matters: [`DraftAgent`] is generation only, and
//! [`RevisingAgent`] extends it for variants that can fold reviewer feedback
//! back into the content. A variant that cannot revise implements only the
//! narrower trait, so callers that need revision require `RevisingAgent`
//! statically instead of discovering an unimplementable method at runtime.
//!
//! `generate` and `revise` are template operations: build the prompt (the
//! variant contributes its content descriptor and any retrieved context),
//! invoke the model client exactly once, return the typed result. No hidden
//! retries live here; bounded retry for retryable failures belongs to the
//! model-client adapter.

pub mod registry;
pub mod variants;

use crate::ports::model_client::{
    GenerationFailure, GenerationRequest, ModelClient, ModelProfile, OutputSchema,
};
use crate::ports::prompt_renderer::{PromptRenderer, vars};
use async_trait::async_trait;
use redraft_domain::{Category, ConsolidatedFeedback, Draft, TaskInput};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Template ids the agent family renders
pub mod templates {
    pub const AGENT_SYSTEM: &str = "agent.system";
    pub const AGENT_GENERATE: &str = "agent.generate";
    pub const AGENT_REVISE: &str = "agent.revise";
}

/// Shared handles injected into every agent variant
///
/// Read-only and shared: agents never mutate them, so one set can back any
/// number of concurrent tasks.
#[derive(Clone)]
pub struct AgentPorts {
    pub model: Arc<dyn ModelClient>,
    pub renderer: Arc<dyn PromptRenderer>,
}

/// An agent that can produce an initial draft
#[async_trait]
pub trait DraftAgent: Send + Sync {
    /// The single category this agent is bound to
    fn category(&self) -> Category;

    /// Human-readable descriptor of the content this agent produces
    fn content_descriptor(&self) -> &str;

    /// Produce a draft for the input, with exactly one model call
    async fn generate(&self, input: &TaskInput) -> Result<Draft, GenerationFailure>;
}

/// An agent that can also revise a draft against consolidated feedback
#[async_trait]
pub trait RevisingAgent: DraftAgent {
    /// Produce a revised draft, with exactly one model call
    async fn revise(
        &self,
        input: &TaskInput,
        draft: &Draft,
        feedback: &ConsolidatedFeedback,
    ) -> Result<Draft, GenerationFailure>;
}

/// JSON shape every agent asks the model for
#[derive(Debug, Deserialize)]
struct DraftPayload {
    title: String,
    body: String,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl DraftPayload {
    fn into_draft(self) -> Result<Draft, GenerationFailure> {
        let mut draft = Draft::new(self.title, self.body);
        draft.metadata = self.metadata;
        draft
            .validate()
            .map_err(|e| GenerationFailure::MalformedOutput(e.to_string()))?;
        Ok(draft)
    }
}

/// Render the system prompt + user prompt, call the model once, parse a draft
///
/// The shared body of every variant's `generate`. `context` carries retrieved
/// passages for retrieval-augmented variants, empty otherwise.
pub(crate) async fn generate_draft(
    ports: &AgentPorts,
    profile: &ModelProfile,
    descriptor: &str,
    schema_note: &str,
    input: &TaskInput,
    context: &str,
) -> Result<Draft, GenerationFailure> {
    let system = ports
        .renderer
        .render(templates::AGENT_SYSTEM, &vars([("descriptor", descriptor)]))
        .map_err(|e| GenerationFailure::PromptRender(e.to_string()))?;
    let prompt = ports
        .renderer
        .render(
            templates::AGENT_GENERATE,
            &vars([
                ("descriptor", descriptor),
                ("task", input.text()),
                ("context", context),
            ]),
        )
        .map_err(|e| GenerationFailure::PromptRender(e.to_string()))?;

    let request = GenerationRequest::new(system, prompt)
        .with_schema(OutputSchema::Json {
            description: schema_note.to_string(),
        })
        .with_profile(profile.clone());

    let output = ports.model.generate(request).await?;
    output.parse_json::<DraftPayload>()?.into_draft()
}

/// Shared body of every variant's `revise`
pub(crate) async fn revise_draft(
    ports: &AgentPorts,
    profile: &ModelProfile,
    descriptor: &str,
    schema_note: &str,
    input: &TaskInput,
    draft: &Draft,
    feedback: &ConsolidatedFeedback,
) -> Result<Draft, GenerationFailure> {
    let system = ports
        .renderer
        .render(templates::AGENT_SYSTEM, &vars([("descriptor", descriptor)]))
        .map_err(|e| GenerationFailure::PromptRender(e.to_string()))?;
    let prompt = ports
        .renderer
        .render(
            templates::AGENT_REVISE,
            &vars([
                ("descriptor", descriptor),
                ("task", input.text()),
                ("draft_title", &draft.title),
                ("draft_body", &draft.body),
                ("feedback", &feedback.to_document()),
            ]),
        )
        .map_err(|e| GenerationFailure::PromptRender(e.to_string()))?;

    let request = GenerationRequest::new(system, prompt)
        .with_schema(OutputSchema::Json {
            description: schema_note.to_string(),
        })
        .with_profile(profile.clone());

    let output = ports.model.generate(request).await?;
    output.parse_json::<DraftPayload>()?.into_draft()
}
