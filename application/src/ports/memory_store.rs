//! Memory store port
//!
//! Retrieval boundary used by retrieval-augmented agent variants. Handles
//! are shared read-only across concurrent tasks.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during retrieval
#[derive(Error, Debug, Clone)]
pub enum MemoryError {
    #[error("Memory search failed: {0}")]
    SearchFailed(String),
}

/// Long-term memory search boundary
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Return up to `k` passages relevant to the query
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MemoryError>;
}
