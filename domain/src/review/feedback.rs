//! Consolidated feedback
//!
//! Merges the delivered critiques for one draft into a single feedback
//! document. Consolidation is deterministic: entries are sorted by persona
//! id, so the result is identical regardless of reviewer completion order.

use super::critique::{Critique, PersonaId};
use crate::core::error::DomainError;
use crate::revision::quality::QualityScore;
use serde::{Deserialize, Serialize};

/// One delivered critique as it appears in the consolidated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub persona: PersonaId,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

/// Merged result of all non-failed critiques for one draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedFeedback {
    /// Delivered critiques, sorted by persona id
    entries: Vec<FeedbackEntry>,
    /// How many reviewers contributed
    contributed: usize,
    /// How many reviewers failed
    failed: usize,
}

impl ConsolidatedFeedback {
    /// Consolidate a set of critiques
    ///
    /// Fails with [`DomainError::NoDeliveredCritiques`] when nothing was
    /// delivered — the controller should retry the review rather than revise
    /// against empty feedback.
    pub fn from_critiques(critiques: &[Critique]) -> Result<Self, DomainError> {
        let mut entries: Vec<FeedbackEntry> = critiques
            .iter()
            .filter_map(|c| {
                c.content().map(|content| FeedbackEntry {
                    persona: c.persona.clone(),
                    content: content.to_string(),
                    score: c.score(),
                })
            })
            .collect();

        if entries.is_empty() {
            return Err(DomainError::NoDeliveredCritiques);
        }

        entries.sort_by(|a, b| a.persona.cmp(&b.persona));
        let contributed = entries.len();
        let failed = critiques.len() - contributed;

        Ok(Self {
            entries,
            contributed,
            failed,
        })
    }

    /// Delivered critiques, in persona order
    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    /// Number of reviewers that contributed
    pub fn contributed(&self) -> usize {
        self.contributed
    }

    /// Number of reviewers that failed
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Quality signal for the reviewed draft
    ///
    /// Mean of the reviewer scores normalized to 0..=1 when any were parsed;
    /// otherwise the delivered/total ratio. Higher is better, comparable
    /// across rounds.
    pub fn quality(&self) -> QualityScore {
        let scores: Vec<u8> = self.entries.iter().filter_map(|e| e.score).collect();
        if scores.is_empty() {
            let total = self.contributed + self.failed;
            QualityScore::new(self.contributed as f64 / total as f64)
        } else {
            let sum: u32 = scores.iter().map(|s| u32::from(*s)).sum();
            QualityScore::new(sum as f64 / (scores.len() as f64 * 10.0))
        }
    }

    /// Render the feedback as a single document for a revision prompt
    pub fn to_document(&self) -> String {
        let mut doc = String::new();
        for entry in &self.entries {
            doc.push_str(&format!("--- Reviewer: {} ---\n", entry.persona));
            if let Some(score) = entry.score {
                doc.push_str(&format!("Score: {}/10\n", score));
            }
            doc.push_str(&entry.content);
            doc.push_str("\n\n");
        }
        doc
    }
}
