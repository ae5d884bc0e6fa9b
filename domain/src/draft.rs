//! Draft artifact
//!
//! One generated or revised piece of content. The controller owns the draft
//! for the duration of a request; reviewers only ever borrow it.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A generated or revised content artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Short title for the content
    pub title: String,
    /// The content body
    pub body: String,
    /// Variant-specific fields (e.g. a math agent's `answer`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Draft {
    /// Create a new draft
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata field
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata field
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Check the post-generation invariant: title and body are non-empty
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::IncompleteDraft("title"));
        }
        if self.body.trim().is_empty() {
            return Err(DomainError::IncompleteDraft("body"));
        }
        Ok(())
    }
}
