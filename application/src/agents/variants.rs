//! Concrete agent variants
//!
//! Variants differ only in their content descriptor, their model profile,
//! and whether they run a retrieval step before generation. All the prompt
//! assembly and parsing lives in the shared helpers in the parent module.

use super::{AgentPorts, DraftAgent, RevisingAgent, generate_draft, revise_draft};
use crate::ports::memory_store::MemoryStore;
use crate::ports::model_client::{GenerationFailure, ModelProfile};
use async_trait::async_trait;
use redraft_domain::{Category, ConsolidatedFeedback, Draft, TaskInput};
use std::sync::Arc;
use tracing::warn;

/// Passages pulled into the prompt by retrieval-augmented variants
const RETRIEVAL_K: usize = 3;

const DRAFT_SCHEMA: &str =
    "Object with string fields `title` and `body`, plus an optional `metadata` string map.";

const MATH_SCHEMA: &str = "Object with string fields `title` and `body` (a step-by-step \
     solution), plus a `metadata` map containing the final result under `answer` (e.g. \"x=2\").";

/// Run a retrieval query, degrading to no context on failure
///
/// A broken retrieval store should cost the draft its supporting passages,
/// not the whole generation.
async fn retrieve_context(memory: &dyn MemoryStore, query: &str) -> String {
    match memory.search(query, RETRIEVAL_K).await {
        Ok(passages) => passages.join("\n\n"),
        Err(e) => {
            warn!("Retrieval failed, generating without context: {}", e);
            String::new()
        }
    }
}

/// Step-by-step solutions to mathematical problems
pub struct MathAgent {
    ports: AgentPorts,
    profile: ModelProfile,
}

impl MathAgent {
    pub fn new(ports: AgentPorts, profile: ModelProfile) -> Self {
        Self { ports, profile }
    }
}

#[async_trait]
impl DraftAgent for MathAgent {
    fn category(&self) -> Category {
        Category::Math
    }

    fn content_descriptor(&self) -> &str {
        "a step-by-step mathematical solution with a clearly stated final answer"
    }

    async fn generate(&self, input: &TaskInput) -> Result<Draft, GenerationFailure> {
        generate_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            MATH_SCHEMA,
            input,
            "",
        )
        .await
    }
}

#[async_trait]
impl RevisingAgent for MathAgent {
    async fn revise(
        &self,
        input: &TaskInput,
        draft: &Draft,
        feedback: &ConsolidatedFeedback,
    ) -> Result<Draft, GenerationFailure> {
        revise_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            MATH_SCHEMA,
            input,
            draft,
            feedback,
        )
        .await
    }
}

/// Historical essays and answers, augmented with retrieved passages
pub struct HistoryAgent {
    ports: AgentPorts,
    memory: Arc<dyn MemoryStore>,
    profile: ModelProfile,
}

impl HistoryAgent {
    pub fn new(ports: AgentPorts, memory: Arc<dyn MemoryStore>, profile: ModelProfile) -> Self {
        Self {
            ports,
            memory,
            profile,
        }
    }
}

#[async_trait]
impl DraftAgent for HistoryAgent {
    fn category(&self) -> Category {
        Category::History
    }

    fn content_descriptor(&self) -> &str {
        "a historically grounded answer citing the supplied source passages"
    }

    async fn generate(&self, input: &TaskInput) -> Result<Draft, GenerationFailure> {
        let context = retrieve_context(self.memory.as_ref(), input.text()).await;
        generate_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            DRAFT_SCHEMA,
            input,
            &context,
        )
        .await
    }
}

#[async_trait]
impl RevisingAgent for HistoryAgent {
    async fn revise(
        &self,
        input: &TaskInput,
        draft: &Draft,
        feedback: &ConsolidatedFeedback,
    ) -> Result<Draft, GenerationFailure> {
        revise_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            DRAFT_SCHEMA,
            input,
            draft,
            feedback,
        )
        .await
    }
}

/// Scientific explanations, augmented with retrieved passages
pub struct ScienceAgent {
    ports: AgentPorts,
    memory: Arc<dyn MemoryStore>,
    profile: ModelProfile,
}

impl ScienceAgent {
    pub fn new(ports: AgentPorts, memory: Arc<dyn MemoryStore>, profile: ModelProfile) -> Self {
        Self {
            ports,
            memory,
            profile,
        }
    }
}

#[async_trait]
impl DraftAgent for ScienceAgent {
    fn category(&self) -> Category {
        Category::Science
    }

    fn content_descriptor(&self) -> &str {
        "a scientifically accurate explanation grounded in the supplied passages"
    }

    async fn generate(&self, input: &TaskInput) -> Result<Draft, GenerationFailure> {
        let context = retrieve_context(self.memory.as_ref(), input.text()).await;
        generate_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            DRAFT_SCHEMA,
            input,
            &context,
        )
        .await
    }
}

#[async_trait]
impl RevisingAgent for ScienceAgent {
    async fn revise(
        &self,
        input: &TaskInput,
        draft: &Draft,
        feedback: &ConsolidatedFeedback,
    ) -> Result<Draft, GenerationFailure> {
        revise_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            DRAFT_SCHEMA,
            input,
            draft,
            feedback,
        )
        .await
    }
}

/// Creative writing, sampled at a higher temperature
pub struct CreativeAgent {
    ports: AgentPorts,
    profile: ModelProfile,
}

impl CreativeAgent {
    /// Temperature used when the base profile is cooler than this
    const MIN_TEMPERATURE: f32 = 0.9;

    pub fn new(ports: AgentPorts, base: ModelProfile) -> Self {
        let profile = ModelProfile::new(
            base.model,
            base.temperature.max(Self::MIN_TEMPERATURE),
        );
        Self { ports, profile }
    }
}

#[async_trait]
impl DraftAgent for CreativeAgent {
    fn category(&self) -> Category {
        Category::Creative
    }

    fn content_descriptor(&self) -> &str {
        "an original piece of creative writing"
    }

    async fn generate(&self, input: &TaskInput) -> Result<Draft, GenerationFailure> {
        generate_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            DRAFT_SCHEMA,
            input,
            "",
        )
        .await
    }
}

#[async_trait]
impl RevisingAgent for CreativeAgent {
    async fn revise(
        &self,
        input: &TaskInput,
        draft: &Draft,
        feedback: &ConsolidatedFeedback,
    ) -> Result<Draft, GenerationFailure> {
        revise_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            DRAFT_SCHEMA,
            input,
            draft,
            feedback,
        )
        .await
    }
}

/// Default variant for general and unclassified tasks
pub struct GeneralAgent {
    ports: AgentPorts,
    profile: ModelProfile,
}

impl GeneralAgent {
    pub fn new(ports: AgentPorts, profile: ModelProfile) -> Self {
        Self { ports, profile }
    }
}

#[async_trait]
impl DraftAgent for GeneralAgent {
    fn category(&self) -> Category {
        Category::General
    }

    fn content_descriptor(&self) -> &str {
        "a clear, well-structured piece of general-purpose writing"
    }

    async fn generate(&self, input: &TaskInput) -> Result<Draft, GenerationFailure> {
        generate_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            DRAFT_SCHEMA,
            input,
            "",
        )
        .await
    }
}

#[async_trait]
impl RevisingAgent for GeneralAgent {
    async fn revise(
        &self,
        input: &TaskInput,
        draft: &Draft,
        feedback: &ConsolidatedFeedback,
    ) -> Result<Draft, GenerationFailure> {
        revise_draft(
            &self.ports,
            &self.profile,
            self.content_descriptor(),
            DRAFT_SCHEMA,
            input,
            draft,
            feedback,
        )
        .await
    }
}
