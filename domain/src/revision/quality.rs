//! Quality score value object

use serde::{Deserialize, Serialize};

/// Quality signal for one reviewed round
///
/// Normalized to 0.0..=1.0, higher is better. The only property the pipeline
/// relies on is monotonicity: scores from different rounds of the same
/// request are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore(f64);

impl QualityScore {
    /// Create a score, clamped into 0.0..=1.0
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// The normalized value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whether this score meets a threshold
    pub fn meets(&self, threshold: QualityScore) -> bool {
        self.0 >= threshold.0
    }

    /// Whether this score is strictly worse than another
    pub fn is_regression_from(&self, previous: QualityScore) -> bool {
        self.0 < previous.0
    }
}

impl std::fmt::Display for QualityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
