//! Task input value object

use super::category::Category;
use serde::{Deserialize, Serialize};

/// The raw request entering the pipeline (Value Object)
///
/// Immutable once created: the text is validated at construction and every
/// later stage only reads it. An optional category hint lets callers bypass
/// classification when they already know the task kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_hint: Option<Category>,
}

impl TaskInput {
    /// Create a new task input
    ///
    /// # Panics
    /// Panics if the text is empty or only whitespace
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        assert!(!text.trim().is_empty(), "Task input cannot be empty");
        Self {
            text,
            category_hint: None,
        }
    }

    /// Try to create a task input, returning None if invalid
    pub fn try_new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self {
                text,
                category_hint: None,
            })
        }
    }

    /// Attach a category hint, skipping classification for this input
    pub fn with_hint(mut self, category: Category) -> Self {
        self.category_hint = Some(category);
        self
    }

    /// Get the raw task text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the category hint, if the caller supplied one
    pub fn category_hint(&self) -> Option<Category> {
        self.category_hint
    }
}

impl std::fmt::Display for TaskInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl From<&str> for TaskInput {
    fn from(s: &str) -> Self {
        TaskInput::new(s)
    }
}

impl From<String> for TaskInput {
    fn from(s: String) -> Self {
        TaskInput::new(s)
    }
}
