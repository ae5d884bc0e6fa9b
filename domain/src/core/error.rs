//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Draft is missing required field: {0}")]
    IncompleteDraft(&'static str),

    #[error("No delivered critiques to consolidate")]
    NoDeliveredCritiques,
}
