//! Stopping policy for the revision loop
//!
//! Applied after every reviewed round. Three ways to stop: the configured
//! revision limit is reached, the quality threshold is met, or the latest
//! round regressed against the round before it. A regression is a policy
//! decision, not an error — the pipeline stops and returns the best earlier
//! round instead of the regressed one.

use crate::revision::quality::QualityScore;
use crate::revision::record::RevisionRecord;
use serde::{Deserialize, Serialize};

/// What to do after a reviewed round
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopDecision {
    /// Revise and run another round
    Continue,
    /// Quality threshold met; return the latest draft
    QualityMet,
    /// Revision limit reached; return the best draft so far
    MaxRounds,
    /// Latest round regressed; return the draft from `best_round`
    Regressed {
        /// Round whose draft should be returned instead
        best_round: usize,
    },
}

impl StopDecision {
    /// Whether the loop should terminate
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StopDecision::Continue)
    }
}

/// Termination rules for the revision loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingPolicy {
    /// Maximum number of revision rounds after the initial draft
    ///
    /// Zero means generate + review only, no revision.
    pub max_rounds: usize,
    /// Stop early once a round's quality reaches this value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_threshold: Option<QualityScore>,
    /// Stop and roll back when quality drops between rounds
    pub regression_guard: bool,
}

impl Default for StoppingPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            quality_threshold: None,
            regression_guard: true,
        }
    }
}

impl StoppingPolicy {
    pub fn new(max_rounds: usize) -> Self {
        Self {
            max_rounds,
            ..Self::default()
        }
    }

    pub fn with_quality_threshold(mut self, threshold: QualityScore) -> Self {
        self.quality_threshold = Some(threshold);
        self
    }

    pub fn without_regression_guard(mut self) -> Self {
        self.regression_guard = false;
        self
    }

    /// Decide whether to continue after the latest reviewed round
    ///
    /// `history` must hold at least one record (the round just reviewed).
    pub fn decide(&self, history: &[RevisionRecord]) -> StopDecision {
        let latest = match history.last() {
            Some(record) => record,
            None => return StopDecision::Continue,
        };

        if self.regression_guard
            && history.len() >= 2
            && latest
                .quality
                .is_regression_from(history[history.len() - 2].quality)
        {
            return StopDecision::Regressed {
                best_round: Self::best_round(&history[..history.len() - 1]),
            };
        }

        if let Some(threshold) = self.quality_threshold
            && latest.quality.meets(threshold)
        {
            return StopDecision::QualityMet;
        }

        // history.len() - 1 revisions have run so far
        if history.len() - 1 >= self.max_rounds {
            return StopDecision::MaxRounds;
        }

        StopDecision::Continue
    }

    /// Round number with the highest quality; earliest wins ties
    pub fn best_round(history: &[RevisionRecord]) -> usize {
        let mut best: Option<&RevisionRecord> = None;
        for record in history {
            let improves = best
                .map(|b| record.quality.value() > b.quality.value())
                .unwrap_or(true);
            if improves {
                best = Some(record);
            }
        }
        best.map(|r| r.round).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;
    use crate::review::critique::Critique;
    use crate::review::feedback::ConsolidatedFeedback;

    fn record(round: usize, score: u8) -> RevisionRecord {
        let critiques = vec![Critique::delivered("accuracy", "noted").with_score(score)];
        let feedback = ConsolidatedFeedback::from_critiques(&critiques).unwrap();
        RevisionRecord::new(round, Draft::new("t", "b"), feedback)
    }

    #[test]
    fn test_zero_rounds_stops_after_first_review() {
        let policy = StoppingPolicy::new(0);
        assert_eq!(policy.decide(&[record(0, 5)]), StopDecision::MaxRounds);
    }

    #[test]
    fn test_continues_below_limit() {
        let policy = StoppingPolicy::new(2);
        assert_eq!(policy.decide(&[record(0, 5)]), StopDecision::Continue);
        assert_eq!(
            policy.decide(&[record(0, 5), record(1, 6)]),
            StopDecision::Continue
        );
        assert_eq!(
            policy.decide(&[record(0, 5), record(1, 6), record(2, 7)]),
            StopDecision::MaxRounds
        );
    }

    #[test]
    fn test_quality_threshold_stops_early() {
        let policy =
            StoppingPolicy::new(5).with_quality_threshold(QualityScore::new(0.8));
        assert_eq!(policy.decide(&[record(0, 7)]), StopDecision::Continue);
        assert_eq!(
            policy.decide(&[record(0, 7), record(1, 8)]),
            StopDecision::QualityMet
        );
    }

    #[test]
    fn test_regression_guard_rolls_back() {
        let policy = StoppingPolicy::new(5);
        let decision = policy.decide(&[record(0, 7), record(1, 5)]);
        assert_eq!(decision, StopDecision::Regressed { best_round: 0 });
    }

    #[test]
    fn test_regression_guard_picks_best_earlier_round() {
        let policy = StoppingPolicy::new(5);
        let decision = policy.decide(&[record(0, 6), record(1, 8), record(2, 4)]);
        assert_eq!(decision, StopDecision::Regressed { best_round: 1 });
    }

    #[test]
    fn test_guard_disabled_keeps_going() {
        let policy = StoppingPolicy::new(5).without_regression_guard();
        assert_eq!(
            policy.decide(&[record(0, 7), record(1, 5)]),
            StopDecision::Continue
        );
    }

    #[test]
    fn test_equal_quality_is_not_regression() {
        let policy = StoppingPolicy::new(5);
        assert_eq!(
            policy.decide(&[record(0, 6), record(1, 6)]),
            StopDecision::Continue
        );
    }
}
