//! Domain layer for redraft
//!
//! This crate contains the core business logic, entities, and value objects
//! of the content-generation and revision pipeline. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Draft / Critique / Feedback
//!
//! A [`Draft`] is one generated or revised content artifact. Independent
//! reviewer personas each produce a [`Critique`] of it; the delivered
//! critiques merge into one [`ConsolidatedFeedback`] which drives the next
//! revision round.
//!
//! ## Revision rounds
//!
//! Each round is recorded as a [`RevisionRecord`]. The [`StoppingPolicy`]
//! decides after every round whether to keep revising, stop on quality, stop
//! on the round limit, or roll back to an earlier round when quality
//! regressed.

pub mod core;
pub mod draft;
pub mod review;
pub mod revision;
pub mod task;

// Re-export commonly used types
pub use crate::core::error::DomainError;
pub use draft::Draft;
pub use review::{
    critique::{Critique, CritiqueOutcome, PersonaId},
    feedback::ConsolidatedFeedback,
};
pub use revision::{
    policy::{StopDecision, StoppingPolicy},
    quality::QualityScore,
    record::RevisionRecord,
};
pub use task::{category::Category, input::TaskInput};
