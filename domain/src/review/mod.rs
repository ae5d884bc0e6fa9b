//! Review artifacts: critiques and their consolidation

pub mod critique;
pub mod feedback;
