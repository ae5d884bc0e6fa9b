//! Guardrails
//!
//! Pass/fail policy checks over input or output text. A rule guardrail is
//! pure and synchronous; a model guardrail makes one constrained call on a
//! cheap profile. A set of guardrails runs concurrently, and every check
//! runs to completion even after a rejection is found — all verdicts are
//! recorded for audit, the first-found rejection decides the outcome.

use crate::ports::event_sink::{EventSink, PipelineEvent};
use crate::ports::model_client::{
    GenerationFailure, GenerationRequest, ModelClient, ModelProfile, OutputSchema,
};
use crate::ports::prompt_renderer::{PromptRenderer, vars};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::warn;

/// Template ids model guardrails render
pub mod templates {
    pub const GUARDRAIL_SYSTEM: &str = "guardrail.system";
    pub const GUARDRAIL_CHECK: &str = "guardrail.check";
}

/// Outcome of one guardrail check
#[derive(Debug, Clone, Serialize)]
pub struct GuardrailVerdict {
    /// Which guardrail produced this verdict
    pub guardrail: String,
    /// Whether the text passed
    pub passed: bool,
    /// Why it was rejected, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GuardrailVerdict {
    pub fn pass(guardrail: impl Into<String>) -> Self {
        Self {
            guardrail: guardrail.into(),
            passed: true,
            reason: None,
        }
    }

    pub fn reject(guardrail: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            guardrail: guardrail.into(),
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

/// A single pass/fail policy check
#[async_trait]
pub trait Guardrail: Send + Sync {
    /// Name used in verdicts and audit events
    fn name(&self) -> &str;

    /// Check the text
    async fn check(&self, text: &str) -> Result<GuardrailVerdict, GenerationFailure>;
}

/// Cheap rule-based checks that run before any model is involved
///
/// Rejects on length bounds, control characters, and a configurable
/// deny-phrase list (substring match, case-insensitive).
pub struct RuleGuardrail {
    name: String,
    max_len: usize,
    deny_phrases: Vec<String>,
}

impl RuleGuardrail {
    pub fn new(name: impl Into<String>, max_len: usize) -> Self {
        Self {
            name: name.into(),
            max_len,
            deny_phrases: Vec::new(),
        }
    }

    pub fn with_deny_phrases(mut self, phrases: Vec<String>) -> Self {
        self.deny_phrases = phrases.into_iter().map(|p| p.to_lowercase()).collect();
        self
    }

    fn evaluate(&self, text: &str) -> GuardrailVerdict {
        if text.trim().is_empty() {
            return GuardrailVerdict::reject(&self.name, "text is empty");
        }
        if text.len() > self.max_len {
            return GuardrailVerdict::reject(
                &self.name,
                format!("text exceeds {} bytes", self.max_len),
            );
        }
        if text.chars().any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r') {
            return GuardrailVerdict::reject(&self.name, "text contains control characters");
        }
        let lowered = text.to_lowercase();
        for phrase in &self.deny_phrases {
            if lowered.contains(phrase) {
                return GuardrailVerdict::reject(
                    &self.name,
                    format!("text matches denied phrase: {:?}", phrase),
                );
            }
        }
        GuardrailVerdict::pass(&self.name)
    }
}

#[async_trait]
impl Guardrail for RuleGuardrail {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, text: &str) -> Result<GuardrailVerdict, GenerationFailure> {
        Ok(self.evaluate(text))
    }
}

/// Policy check implemented as one constrained model call
///
/// The condition is a natural-language acceptance criterion; the model
/// answers pass or reject with a short reason.
pub struct ModelGuardrail {
    name: String,
    condition: String,
    model: Arc<dyn ModelClient>,
    renderer: Arc<dyn PromptRenderer>,
    profile: ModelProfile,
}

impl ModelGuardrail {
    pub fn new(
        name: impl Into<String>,
        condition: impl Into<String>,
        model: Arc<dyn ModelClient>,
        renderer: Arc<dyn PromptRenderer>,
        profile: ModelProfile,
    ) -> Self {
        Self {
            name: name.into(),
            condition: condition.into(),
            model,
            renderer,
            profile,
        }
    }
}

#[async_trait]
impl Guardrail for ModelGuardrail {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, text: &str) -> Result<GuardrailVerdict, GenerationFailure> {
        let system = self
            .renderer
            .render(
                templates::GUARDRAIL_SYSTEM,
                &vars([("condition", self.condition.as_str())]),
            )
            .map_err(|e| GenerationFailure::PromptRender(e.to_string()))?;
        let prompt = self
            .renderer
            .render(
                templates::GUARDRAIL_CHECK,
                &vars([("condition", self.condition.as_str()), ("text", text)]),
            )
            .map_err(|e| GenerationFailure::PromptRender(e.to_string()))?;

        let request = GenerationRequest::new(system, prompt)
            .with_schema(OutputSchema::Text)
            .with_profile(self.profile.clone());

        let output = self.model.generate(request).await?;
        let answer = output.text().trim().to_lowercase();

        if answer.starts_with("pass") {
            Ok(GuardrailVerdict::pass(&self.name))
        } else {
            let reason = answer
                .strip_prefix("reject")
                .map(|r| r.trim_start_matches([':', ' ']).to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "rejected by policy model".to_string());
            Ok(GuardrailVerdict::reject(&self.name, reason))
        }
    }
}

/// Runs a set of independent guardrails concurrently
///
/// Waits for every check (no early cancellation) and records each verdict to
/// the event sink before returning, so the full audit trail exists even when
/// the first rejection already decided the outcome. A guardrail whose own
/// model call fails is treated as a rejection (fail closed).
pub struct GuardrailSet {
    guardrails: Vec<Arc<dyn Guardrail>>,
    events: Arc<dyn EventSink>,
}

impl GuardrailSet {
    pub fn new(guardrails: Vec<Arc<dyn Guardrail>>, events: Arc<dyn EventSink>) -> Self {
        Self { guardrails, events }
    }

    pub fn is_empty(&self) -> bool {
        self.guardrails.is_empty()
    }

    /// Check the text against every guardrail
    ///
    /// Verdicts come back sorted by guardrail name so the result is
    /// reproducible independent of completion order.
    pub async fn check_all(&self, text: &str) -> Vec<GuardrailVerdict> {
        let mut join_set = JoinSet::new();

        for guardrail in &self.guardrails {
            let guardrail = Arc::clone(guardrail);
            let text = text.to_string();
            join_set.spawn(async move {
                let name = guardrail.name().to_string();
                (name, guardrail.check(&text).await)
            });
        }

        let mut verdicts = Vec::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((_, Ok(verdict))) => verdicts.push(verdict),
                Ok((name, Err(e))) => {
                    warn!("Guardrail {} errored, failing closed: {}", name, e);
                    verdicts.push(GuardrailVerdict::reject(
                        name,
                        format!("check failed: {}", e),
                    ));
                }
                Err(e) => {
                    warn!("Guardrail task join error: {}", e);
                }
            }
        }

        verdicts.sort_by(|a, b| a.guardrail.cmp(&b.guardrail));

        for verdict in &verdicts {
            self.events.record(PipelineEvent::GuardrailEvaluated {
                guardrail: verdict.guardrail.clone(),
                passed: verdict.passed,
                reason: verdict.reason.clone(),
            });
        }

        verdicts
    }

    /// First rejection among the verdicts, if any
    pub fn first_rejection(verdicts: &[GuardrailVerdict]) -> Option<&GuardrailVerdict> {
        verdicts.iter().find(|v| !v.passed)
    }
}
