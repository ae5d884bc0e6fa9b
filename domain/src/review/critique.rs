//! Critique types
//!
//! A critique is one reviewer persona's assessment of one draft. A reviewer
//! that errors (timeout, malformed output) still yields a critique, in the
//! `Failed` state — the panel counts on this to tolerate partial failure
//! without losing track of who failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a reviewer persona (e.g. "accuracy", "clarity")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonaId(String);

impl PersonaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        PersonaId::new(s)
    }
}

/// What one review attempt produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CritiqueOutcome {
    /// The reviewer returned an assessment
    Delivered {
        /// The assessment text
        content: String,
        /// Reviewer's quality score, 1-10, when one was parseable
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<u8>,
    },
    /// The reviewer errored; an expected state, not an invariant violation
    Failed {
        /// Why the review attempt failed
        reason: String,
    },
}

/// A single reviewer's assessment of one draft
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    /// Which persona produced this critique
    pub persona: PersonaId,
    /// When the critique was created
    pub created_at: DateTime<Utc>,
    /// The assessment, or the failure that stood in for it
    pub outcome: CritiqueOutcome,
}

impl Critique {
    /// Create a delivered critique
    pub fn delivered(persona: impl Into<PersonaId>, content: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            created_at: Utc::now(),
            outcome: CritiqueOutcome::Delivered {
                content: content.into(),
                score: None,
            },
        }
    }

    /// Create a failed critique
    pub fn failed(persona: impl Into<PersonaId>, reason: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            created_at: Utc::now(),
            outcome: CritiqueOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Add a quality score to a delivered critique (capped at 10)
    ///
    /// No effect on a failed critique.
    pub fn with_score(mut self, value: u8) -> Self {
        if let CritiqueOutcome::Delivered { score, .. } = &mut self.outcome {
            *score = Some(value.clamp(1, 10));
        }
        self
    }

    /// Whether the reviewer delivered an assessment
    pub fn is_delivered(&self) -> bool {
        matches!(self.outcome, CritiqueOutcome::Delivered { .. })
    }

    /// The assessment text, if delivered
    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            CritiqueOutcome::Delivered { content, .. } => Some(content),
            CritiqueOutcome::Failed { .. } => None,
        }
    }

    /// The reviewer's score, if delivered and present
    pub fn score(&self) -> Option<u8> {
        match &self.outcome {
            CritiqueOutcome::Delivered { score, .. } => *score,
            CritiqueOutcome::Failed { .. } => None,
        }
    }
}
