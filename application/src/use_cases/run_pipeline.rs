//! End-to-end pipeline orchestration
//!
//! The [`RevisionController`] drives one request through its stages:
//!
//! ```text
//! INIT -> CLASSIFIED -> DRAFTED -> REVIEWED -> { REVISING -> DRAFTED
//!                                             | DONE
//!                                             | ABORTED }
//! ```
//!
//! Rounds are strictly sequential — feedback from round N is an input to
//! revision N+1 — while the work inside a round (guardrails, the review
//! panel) fans out concurrently. The controller owns the round history for
//! exactly one request; nothing is shared across requests.

use crate::agents::registry::AgentRegistry;
use crate::ports::event_sink::{EventSink, PipelineEvent};
use crate::ports::model_client::GenerationFailure;
use crate::use_cases::classify::Classifier;
use crate::use_cases::guardrail::GuardrailSet;
use crate::use_cases::review_panel::{ReviewPanel, ReviewPanelError};
use redraft_domain::{
    Category, ConsolidatedFeedback, Draft, QualityScore, RevisionRecord, StopDecision,
    StoppingPolicy, TaskInput,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Pipeline stage, reported in errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Init,
    Classified,
    Drafted,
    Reviewed,
    Revising,
    Done,
    Aborted,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Classified => "classified",
            Stage::Drafted => "drafted",
            Stage::Reviewed => "reviewed",
            Stage::Revising => "revising",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}

/// Why a successful run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured revision limit was reached
    MaxRounds,
    /// A round met the quality threshold
    QualityMet,
    /// Quality regressed; an earlier round's draft was returned
    Regressed { returned_round: usize },
    /// The request deadline arrived after at least one reviewed round
    DeadlineReached,
}

/// How the returned draft came to be
#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    /// Category the task was classified into
    pub category: Category,
    /// Reviewed rounds executed
    pub rounds: usize,
    /// Reviewers that contributed to the returned round
    pub contributed: usize,
    /// Reviewers that failed in the returned round
    pub failed: usize,
    /// Quality signal of the returned round
    pub quality: QualityScore,
    /// Why the loop stopped
    pub stop_reason: StopReason,
}

/// Successful pipeline result
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub draft: Draft,
    pub provenance: Provenance,
}

/// Unrecoverable pipeline failures
///
/// Every variant names the stage reached and carries the last good draft
/// when one exists, so callers can choose to surface a partial result.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Rejected by guardrail {guardrail} at {stage}: {reason}")]
    GuardrailRejected {
        guardrail: String,
        reason: String,
        stage: Stage,
        last_good_draft: Option<Draft>,
    },

    #[error("Generation failed at {stage}: {source}")]
    GenerationFailed {
        #[source]
        source: GenerationFailure,
        stage: Stage,
        last_good_draft: Option<Draft>,
    },

    #[error("Review failed at {stage} after {attempts} attempts: {source}")]
    ReviewFailed {
        #[source]
        source: ReviewPanelError,
        attempts: usize,
        stage: Stage,
        last_good_draft: Option<Draft>,
    },

    #[error("Request deadline exceeded at {stage}")]
    DeadlineExceeded {
        stage: Stage,
        last_good_draft: Option<Draft>,
    },
}

impl PipelineError {
    /// Stage the pipeline had reached when it aborted
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::GuardrailRejected { stage, .. }
            | PipelineError::GenerationFailed { stage, .. }
            | PipelineError::ReviewFailed { stage, .. }
            | PipelineError::DeadlineExceeded { stage, .. } => *stage,
        }
    }

    /// Best draft produced before the failure, when one exists
    pub fn last_good_draft(&self) -> Option<&Draft> {
        match self {
            PipelineError::GuardrailRejected {
                last_good_draft, ..
            }
            | PipelineError::GenerationFailed {
                last_good_draft, ..
            }
            | PipelineError::ReviewFailed {
                last_good_draft, ..
            }
            | PipelineError::DeadlineExceeded {
                last_good_draft, ..
            } => last_good_draft.as_ref(),
        }
    }
}

/// Orchestrates generate -> review -> revise rounds for one request at a time
pub struct RevisionController {
    classifier: Classifier,
    registry: AgentRegistry,
    panel: ReviewPanel,
    input_guardrails: GuardrailSet,
    output_guardrails: GuardrailSet,
    policy: StoppingPolicy,
    review_retries: usize,
    deadline: Option<Duration>,
    events: Arc<dyn EventSink>,
}

impl RevisionController {
    pub fn new(
        classifier: Classifier,
        registry: AgentRegistry,
        panel: ReviewPanel,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            classifier,
            registry,
            panel,
            input_guardrails: GuardrailSet::new(vec![], events.clone()),
            output_guardrails: GuardrailSet::new(vec![], events.clone()),
            policy: StoppingPolicy::default(),
            review_retries: 1,
            deadline: None,
            events,
        }
    }

    /// Guardrails applied to the raw input before anything else runs
    pub fn with_input_guardrails(mut self, guardrails: GuardrailSet) -> Self {
        self.input_guardrails = guardrails;
        self
    }

    /// Guardrails applied to every generated and revised draft body
    pub fn with_output_guardrails(mut self, guardrails: GuardrailSet) -> Self {
        self.output_guardrails = guardrails;
        self
    }

    pub fn with_policy(mut self, policy: StoppingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Extra review attempts after an insufficient panel result
    pub fn with_review_retries(mut self, retries: usize) -> Self {
        self.review_retries = retries;
        self
    }

    /// Overall request deadline; exceeded mid-round the pipeline returns the
    /// best reviewed draft, or aborts when no round finished
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run one request through the pipeline
    pub async fn run(&self, input: &TaskInput) -> Result<PipelineOutput, PipelineError> {
        let deadline = self.deadline.map(|d| Instant::now() + d);

        // INIT: input guardrails, concurrently, all recorded for audit
        if !self.input_guardrails.is_empty() {
            let verdicts = self.input_guardrails.check_all(input.text()).await;
            if let Some(rejection) = GuardrailSet::first_rejection(&verdicts) {
                return Err(self.abort(0, PipelineError::GuardrailRejected {
                    guardrail: rejection.guardrail.clone(),
                    reason: rejection
                        .reason
                        .clone()
                        .unwrap_or_else(|| "rejected".to_string()),
                    stage: Stage::Init,
                    last_good_draft: None,
                }));
            }
        }

        // INIT -> CLASSIFIED
        let category = self.classifier.classify(input).await;
        let agent = self.registry.create(category);
        if self.registry.is_fallback(category) {
            warn!(
                "No specialist for category {}, falling back to the default agent",
                category
            );
            self.events
                .record(PipelineEvent::FallbackAgentSelected {
                    requested: category,
                });
        }
        info!("Task classified as {}", category);

        let mut history: Vec<RevisionRecord> = Vec::new();

        if Self::deadline_hit(deadline) {
            return Err(self.abort(0, PipelineError::DeadlineExceeded {
                stage: Stage::Classified,
                last_good_draft: None,
            }));
        }

        // CLASSIFIED -> DRAFTED
        let mut draft =
            agent
                .generate(input)
                .await
                .map_err(|source| {
                    self.abort(0, PipelineError::GenerationFailed {
                        source,
                        stage: Stage::Drafted,
                        last_good_draft: None,
                    })
                })?;
        let mut round = 0usize;
        self.events.record(PipelineEvent::DraftGenerated {
            category,
            round,
            title: draft.title.clone(),
        });
        self.check_output(&draft, &history, Stage::Drafted).await?;

        loop {
            if Self::deadline_hit(deadline) {
                if history.is_empty() {
                    return Err(self.abort(0, PipelineError::DeadlineExceeded {
                        stage: Stage::Drafted,
                        last_good_draft: Some(draft),
                    }));
                }
                return Ok(self.finish(category, &history, None, StopReason::DeadlineReached));
            }

            // DRAFTED -> REVIEWED
            let feedback = self.review_with_retries(&draft, &history).await?;
            self.events.record(PipelineEvent::FeedbackConsolidated {
                round,
                contributed: feedback.contributed(),
                failed: feedback.failed(),
                quality: feedback.quality(),
            });
            history.push(RevisionRecord::new(round, draft.clone(), feedback.clone()));
            self.events.record(PipelineEvent::RoundCompleted {
                round,
                quality: feedback.quality(),
            });

            match self.policy.decide(&history) {
                StopDecision::Continue => {
                    debug!("Round {} below stopping criteria, revising", round);
                    if Self::deadline_hit(deadline) {
                        return Ok(self.finish(
                            category,
                            &history,
                            None,
                            StopReason::DeadlineReached,
                        ));
                    }

                    // REVIEWED -> REVISING -> DRAFTED
                    draft = agent
                        .revise(input, &draft, &feedback)
                        .await
                        .map_err(|source| {
                            let best = Self::best_draft(&history);
                            self.abort(history.len(), PipelineError::GenerationFailed {
                                source,
                                stage: Stage::Revising,
                                last_good_draft: best,
                            })
                        })?;
                    round += 1;
                    self.events.record(PipelineEvent::DraftGenerated {
                        category,
                        round,
                        title: draft.title.clone(),
                    });
                    self.check_output(&draft, &history, Stage::Revising).await?;
                }
                StopDecision::QualityMet => {
                    return Ok(self.finish(category, &history, None, StopReason::QualityMet));
                }
                StopDecision::MaxRounds => {
                    // With the regression guard on, never hand back a round
                    // that scored below an earlier one
                    let chosen = if self.policy.regression_guard {
                        Some(StoppingPolicy::best_round(&history))
                    } else {
                        None
                    };
                    return Ok(self.finish(category, &history, chosen, StopReason::MaxRounds));
                }
                StopDecision::Regressed { best_round } => {
                    info!(
                        "Round {} regressed, returning round {} instead",
                        round, best_round
                    );
                    return Ok(self.finish(
                        category,
                        &history,
                        Some(best_round),
                        StopReason::Regressed {
                            returned_round: best_round,
                        },
                    ));
                }
            }
        }
    }

    /// Review the draft, retrying insufficient panel results a bounded
    /// number of times
    async fn review_with_retries(
        &self,
        draft: &Draft,
        history: &[RevisionRecord],
    ) -> Result<ConsolidatedFeedback, PipelineError> {
        let attempts = self.review_retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.panel.review(draft).await {
                Ok(feedback) => return Ok(feedback),
                Err(e) => {
                    warn!("Review attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                }
            }
        }

        let last_good = Self::best_draft(history).or_else(|| Some(draft.clone()));
        Err(self.abort(history.len(), PipelineError::ReviewFailed {
            // attempts >= 1, so an error is always present here
            source: last_error.unwrap_or(ReviewPanelError::NoReviewers),
            attempts,
            stage: Stage::Reviewed,
            last_good_draft: last_good,
        }))
    }

    /// Apply output guardrails to a fresh draft
    ///
    /// `stage` distinguishes a rejected first draft from a rejected revision.
    async fn check_output(
        &self,
        draft: &Draft,
        history: &[RevisionRecord],
        stage: Stage,
    ) -> Result<(), PipelineError> {
        if self.output_guardrails.is_empty() {
            return Ok(());
        }
        let verdicts = self.output_guardrails.check_all(&draft.body).await;
        if let Some(rejection) = GuardrailSet::first_rejection(&verdicts) {
            return Err(self.abort(history.len(), PipelineError::GuardrailRejected {
                guardrail: rejection.guardrail.clone(),
                reason: rejection
                    .reason
                    .clone()
                    .unwrap_or_else(|| "rejected".to_string()),
                stage,
                last_good_draft: Self::best_draft(history),
            }));
        }
        Ok(())
    }

    /// Build the success result from the chosen (or best/latest) round
    fn finish(
        &self,
        category: Category,
        history: &[RevisionRecord],
        chosen_round: Option<usize>,
        stop_reason: StopReason,
    ) -> PipelineOutput {
        let record = chosen_round
            .and_then(|round| history.iter().find(|r| r.round == round))
            .or_else(|| history.last())
            .expect("finish is only reached with at least one reviewed round");

        self.events.record(PipelineEvent::PipelineFinished {
            rounds: history.len(),
            success: true,
            outcome: None,
        });
        info!(
            "Pipeline finished after {} round(s), quality {}",
            history.len(),
            record.quality
        );

        PipelineOutput {
            draft: record.draft.clone(),
            provenance: Provenance {
                category,
                rounds: history.len(),
                contributed: record.feedback.contributed(),
                failed: record.feedback.failed(),
                quality: record.quality,
                stop_reason,
            },
        }
    }

    /// Record the failure and hand the error back
    ///
    /// `rounds` is the number of reviewed rounds that completed before the
    /// abort, so the terminal event stays consistent with the
    /// `RoundCompleted` trail.
    fn abort(&self, rounds: usize, error: PipelineError) -> PipelineError {
        self.events.record(PipelineEvent::PipelineFinished {
            rounds,
            success: false,
            outcome: Some(error.to_string()),
        });
        error
    }

    fn deadline_hit(deadline: Option<Instant>) -> bool {
        deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    /// Draft of the best reviewed round so far
    fn best_draft(history: &[RevisionRecord]) -> Option<Draft> {
        if history.is_empty() {
            return None;
        }
        let best = StoppingPolicy::best_round(history);
        history
            .iter()
            .find(|r| r.round == best)
            .map(|r| r.draft.clone())
    }
}
