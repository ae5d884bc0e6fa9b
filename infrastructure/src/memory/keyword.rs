//! Keyword memory store
//!
//! In-process retrieval over a fixed set of passages, scored by token
//! overlap with the query. Good enough for local runs and tests; a vector
//! store can replace it behind the same port.

use async_trait::async_trait;
use redraft_application::ports::memory_store::{MemoryError, MemoryStore};
use std::collections::BTreeSet;

/// Token-overlap retrieval over in-memory passages
pub struct KeywordMemoryStore {
    passages: Vec<String>,
}

impl KeywordMemoryStore {
    pub fn new(passages: Vec<String>) -> Self {
        Self { passages }
    }

    /// Empty store; searches return no passages
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn tokens(text: &str) -> BTreeSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 2)
            .map(str::to_lowercase)
            .collect()
    }

    fn score(query_tokens: &BTreeSet<String>, passage: &str) -> usize {
        Self::tokens(passage)
            .intersection(query_tokens)
            .count()
    }
}

#[async_trait]
impl MemoryStore for KeywordMemoryStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MemoryError> {
        let query_tokens = Self::tokens(query);
        if query_tokens.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, &String)> = self
            .passages
            .iter()
            .map(|p| (Self::score(&query_tokens, p), p))
            .filter(|(score, _)| *score > 0)
            .collect();
        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().take(k).map(|(_, p)| p.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> KeywordMemoryStore {
        KeywordMemoryStore::new(vec![
            "The French Revolution began in 1789 with the storming of the Bastille.".to_string(),
            "Photosynthesis converts sunlight into chemical energy in plants.".to_string(),
            "Napoleon rose to power in the aftermath of the French Revolution.".to_string(),
        ])
    }

    #[tokio::test]
    async fn test_returns_most_relevant_first() {
        let results = store()
            .search("When did the French Revolution begin?", 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].contains("1789"));
        assert!(results[1].contains("Napoleon"));
    }

    #[tokio::test]
    async fn test_unrelated_passages_excluded() {
        let results = store().search("French Revolution", 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(!results.iter().any(|p| p.contains("Photosynthesis")));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let results = KeywordMemoryStore::empty()
            .search("anything at all", 3)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_k_zero() {
        let results = store().search("French Revolution", 0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_short_tokens_ignored() {
        // "in" and "of" are below the token length floor
        let results = store().search("in of a to", 3).await.unwrap();
        assert!(results.is_empty());
    }
}
