//! Reviewer personas and the review panel
//!
//! Each reviewer is one persona bound to one model call. The panel fans a
//! draft out to every reviewer concurrently, waits for all of them, and
//! consolidates whatever was delivered. One reviewer failing — timeout,
//! malformed critique — never takes its siblings down; it becomes a failed
//! critique and the panel keeps going as long as the minimum delivered
//! count is met.

use crate::ports::event_sink::{EventSink, PipelineEvent};
use crate::ports::model_client::{
    GenerationRequest, ModelClient, ModelProfile, OutputSchema,
};
use crate::ports::prompt_renderer::{PromptRenderer, vars};
use redraft_domain::{ConsolidatedFeedback, Critique, Draft, PersonaId};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Template ids reviewers render
pub mod templates {
    pub const REVIEW_SYSTEM: &str = "review.system";
    pub const REVIEW_CRITIQUE: &str = "review.critique";
}

/// Errors that can occur during panel review
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewPanelError {
    #[error("No reviewers registered on the panel")]
    NoReviewers,

    #[error("Only {delivered} of the required {required} critiques were delivered")]
    InsufficientReviews { delivered: usize, required: usize },
}

/// JSON shape reviewers are asked for
#[derive(Debug, Deserialize)]
struct CritiquePayload {
    assessment: String,
    #[serde(default)]
    score: Option<u8>,
}

/// One reviewer persona
pub struct Reviewer {
    persona: PersonaId,
    focus: String,
    model: Arc<dyn ModelClient>,
    renderer: Arc<dyn PromptRenderer>,
    profile: ModelProfile,
}

impl Reviewer {
    pub fn new(
        persona: impl Into<PersonaId>,
        focus: impl Into<String>,
        model: Arc<dyn ModelClient>,
        renderer: Arc<dyn PromptRenderer>,
        profile: ModelProfile,
    ) -> Self {
        Self {
            persona: persona.into(),
            focus: focus.into(),
            model,
            renderer,
            profile,
        }
    }

    pub fn persona(&self) -> &PersonaId {
        &self.persona
    }

    /// Critique the draft from this persona's perspective
    ///
    /// Never propagates an error: whatever goes wrong becomes a critique in
    /// the failed state, which is what lets the panel tolerate partial
    /// failure.
    pub async fn review(&self, draft: &Draft) -> Critique {
        match self.call_model(draft).await {
            Ok(payload) => {
                let critique = Critique::delivered(self.persona.clone(), payload.assessment);
                match payload.score {
                    Some(score) => critique.with_score(score),
                    None => critique,
                }
            }
            Err(reason) => {
                warn!("Reviewer {} failed: {}", self.persona, reason);
                Critique::failed(self.persona.clone(), reason)
            }
        }
    }

    async fn call_model(&self, draft: &Draft) -> Result<CritiquePayload, String> {
        let system = self
            .renderer
            .render(
                templates::REVIEW_SYSTEM,
                &vars([
                    ("persona", self.persona.as_str()),
                    ("focus", self.focus.as_str()),
                ]),
            )
            .map_err(|e| e.to_string())?;
        let prompt = self
            .renderer
            .render(
                templates::REVIEW_CRITIQUE,
                &vars([
                    ("focus", self.focus.as_str()),
                    ("draft_title", &draft.title),
                    ("draft_body", &draft.body),
                ]),
            )
            .map_err(|e| e.to_string())?;

        let request = GenerationRequest::new(system, prompt)
            .with_schema(OutputSchema::Json {
                description:
                    "Object with a string field `assessment` and an integer `score` from 1 to 10."
                        .to_string(),
            })
            .with_profile(self.profile.clone());

        let output = self.model.generate(request).await.map_err(|e| e.to_string())?;
        output.parse_json::<CritiquePayload>().map_err(|e| e.to_string())
    }
}

/// Fans one draft out to every reviewer and consolidates the critiques
pub struct ReviewPanel {
    reviewers: Vec<Arc<Reviewer>>,
    min_delivered: usize,
    events: Arc<dyn EventSink>,
}

impl ReviewPanel {
    pub fn new(reviewers: Vec<Arc<Reviewer>>, events: Arc<dyn EventSink>) -> Self {
        Self {
            reviewers,
            min_delivered: 1,
            events,
        }
    }

    /// Require at least this many delivered critiques before consolidating
    pub fn with_min_delivered(mut self, min: usize) -> Self {
        self.min_delivered = min.max(1);
        self
    }

    pub fn reviewer_count(&self) -> usize {
        self.reviewers.len()
    }

    /// Review the draft with every registered persona concurrently
    ///
    /// Waits for all reviewers; dispatch and completion order do not affect
    /// the result because consolidation sorts by persona id.
    pub async fn review(&self, draft: &Draft) -> Result<ConsolidatedFeedback, ReviewPanelError> {
        if self.reviewers.is_empty() {
            return Err(ReviewPanelError::NoReviewers);
        }

        debug!("Dispatching draft to {} reviewers", self.reviewers.len());
        let mut join_set = JoinSet::new();

        for reviewer in &self.reviewers {
            let reviewer = Arc::clone(reviewer);
            let draft = draft.clone();
            join_set.spawn(async move { reviewer.review(&draft).await });
        }

        let mut critiques = Vec::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(critique) => {
                    self.events.record(PipelineEvent::CritiqueCollected {
                        persona: critique.persona.to_string(),
                        delivered: critique.is_delivered(),
                    });
                    critiques.push(critique);
                }
                Err(e) => {
                    warn!("Reviewer task join error: {}", e);
                }
            }
        }

        let delivered = critiques.iter().filter(|c| c.is_delivered()).count();
        if delivered < self.min_delivered {
            return Err(ReviewPanelError::InsufficientReviews {
                delivered,
                required: self.min_delivered,
            });
        }

        // min_delivered >= 1, so construction cannot hit the zero case here
        ConsolidatedFeedback::from_critiques(&critiques).map_err(|_| {
            ReviewPanelError::InsufficientReviews {
                delivered: 0,
                required: self.min_delivered,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::event_sink::NoopEventSink;
    use crate::ports::model_client::GenerationFailure;
    use crate::test_support::{EchoRenderer, StubModelClient};
    use std::time::Duration;

    fn reviewer(persona: &str, client: Arc<StubModelClient>) -> Arc<Reviewer> {
        Arc::new(Reviewer::new(
            persona,
            "overall quality",
            client,
            Arc::new(EchoRenderer),
            ModelProfile::default(),
        ))
    }

    fn draft() -> Draft {
        Draft::new("Solving x+3=5", "Subtract 3 from both sides. x = 2.")
    }

    const CRITIQUE_JSON: &str = r#"{"assessment": "Clear and correct.", "score": 8}"#;

    #[tokio::test]
    async fn test_reviewer_delivers_scored_critique() {
        let client = Arc::new(StubModelClient::returning(CRITIQUE_JSON));
        let critique = reviewer("accuracy", client).review(&draft()).await;
        assert!(critique.is_delivered());
        assert_eq!(critique.score(), Some(8));
    }

    #[tokio::test]
    async fn test_reviewer_absorbs_model_failure() {
        let client = Arc::new(StubModelClient::failing(GenerationFailure::Timeout(
            Duration::from_secs(30),
        )));
        let critique = reviewer("accuracy", client).review(&draft()).await;
        assert!(!critique.is_delivered());
    }

    #[tokio::test]
    async fn test_reviewer_absorbs_malformed_output() {
        let client = Arc::new(StubModelClient::returning("I think it's great!"));
        let critique = reviewer("accuracy", client).review(&draft()).await;
        assert!(!critique.is_delivered());
    }

    #[tokio::test]
    async fn test_panel_tolerates_all_but_one_failing() {
        let good = Arc::new(StubModelClient::returning(CRITIQUE_JSON));
        let bad = Arc::new(StubModelClient::failing(GenerationFailure::Transport(
            "connection reset".into(),
        )));

        let panel = ReviewPanel::new(
            vec![
                reviewer("accuracy", good),
                reviewer("clarity", bad.clone()),
                reviewer("tone", bad),
            ],
            Arc::new(NoopEventSink),
        );

        let feedback = panel.review(&draft()).await.unwrap();
        assert_eq!(feedback.contributed(), 1);
        assert_eq!(feedback.failed(), 2);
    }

    #[tokio::test]
    async fn test_panel_all_failing_is_an_error() {
        let bad = Arc::new(StubModelClient::failing(GenerationFailure::Transport(
            "connection reset".into(),
        )));
        let panel = ReviewPanel::new(
            vec![reviewer("accuracy", bad.clone()), reviewer("clarity", bad)],
            Arc::new(NoopEventSink),
        );

        let result = panel.review(&draft()).await;
        assert_eq!(
            result.unwrap_err(),
            ReviewPanelError::InsufficientReviews {
                delivered: 0,
                required: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_panel_enforces_min_delivered() {
        let good = Arc::new(StubModelClient::returning(CRITIQUE_JSON));
        let bad = Arc::new(StubModelClient::failing(GenerationFailure::Transport(
            "connection reset".into(),
        )));
        let panel = ReviewPanel::new(
            vec![reviewer("accuracy", good), reviewer("clarity", bad)],
            Arc::new(NoopEventSink),
        )
        .with_min_delivered(2);

        let result = panel.review(&draft()).await;
        assert_eq!(
            result.unwrap_err(),
            ReviewPanelError::InsufficientReviews {
                delivered: 1,
                required: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_panel_is_an_error() {
        let panel = ReviewPanel::new(vec![], Arc::new(NoopEventSink));
        assert_eq!(
            panel.review(&draft()).await.unwrap_err(),
            ReviewPanelError::NoReviewers
        );
    }

    #[tokio::test]
    async fn test_consolidation_is_order_independent() {
        let make_panel = |personas: &[&str]| {
            let reviewers = personas
                .iter()
                .map(|p| {
                    reviewer(p, Arc::new(StubModelClient::returning(CRITIQUE_JSON)))
                })
                .collect();
            ReviewPanel::new(reviewers, Arc::new(NoopEventSink))
        };

        let forward = make_panel(&["accuracy", "clarity", "tone"])
            .review(&draft())
            .await
            .unwrap();
        let backward = make_panel(&["tone", "clarity", "accuracy"])
            .review(&draft())
            .await
            .unwrap();

        let order = |f: &ConsolidatedFeedback| {
            f.entries()
                .iter()
                .map(|e| e.persona.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(order(&forward), order(&backward));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reviewers_run_concurrently() {
        let delay = Duration::from_millis(200);
        let reviewers = (0..6)
            .map(|i| {
                let client = Arc::new(
                    StubModelClient::returning(CRITIQUE_JSON).with_delay(delay),
                );
                reviewer(&format!("persona-{}", i), client)
            })
            .collect();
        let panel = ReviewPanel::new(reviewers, Arc::new(NoopEventSink));

        let started = tokio::time::Instant::now();
        let feedback = panel.review(&draft()).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(feedback.contributed(), 6);
        // Concurrent dispatch: total time tracks one reviewer's delay, not
        // the sum of all six.
        assert!(elapsed < delay * 2, "elapsed {:?}", elapsed);
    }
}
