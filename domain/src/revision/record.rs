//! Revision round records

use crate::draft::Draft;
use crate::review::feedback::ConsolidatedFeedback;
use crate::revision::quality::QualityScore;
use serde::{Deserialize, Serialize};

/// History entry for one completed generate-or-revise + review round
///
/// Append-only: the controller pushes one per round and never mutates past
/// entries. The sequence lives only as long as the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Round number, 0 for the initial draft
    pub round: usize,
    /// The draft produced this round
    pub draft: Draft,
    /// The panel's consolidated feedback on that draft
    pub feedback: ConsolidatedFeedback,
    /// Quality signal derived from the feedback
    pub quality: QualityScore,
}

impl RevisionRecord {
    /// Create a record for a reviewed round
    pub fn new(round: usize, draft: Draft, feedback: ConsolidatedFeedback) -> Self {
        let quality = feedback.quality();
        Self {
            round,
            draft,
            feedback,
            quality,
        }
    }
}
