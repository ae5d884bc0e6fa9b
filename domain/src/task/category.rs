//! Task category enumeration
//!
//! The closed set of task kinds the pipeline knows how to handle. The
//! classifier maps raw input onto this set; the agent registry maps each
//! value to a specialized agent. `Unknown` is a first-class member: anything
//! the classifier cannot place lands there and is served by the default
//! agent, never dropped.

use serde::{Deserialize, Serialize};

/// Kind of content-generation task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Mathematical problems and step-by-step solutions
    Math,
    /// Historical questions, benefits from retrieval
    History,
    /// Scientific explanations, benefits from retrieval
    Science,
    /// Creative writing (stories, poems, copy)
    Creative,
    /// General-purpose tasks with no specialist
    General,
    /// Classification failed or produced something outside the set
    Unknown,
}

impl Category {
    /// All categories a classifier may legitimately produce
    ///
    /// Excludes `Unknown`, which is the degraded outcome rather than a
    /// classification target.
    pub fn all() -> &'static [Category] {
        &[
            Category::Math,
            Category::History,
            Category::Science,
            Category::Creative,
            Category::General,
        ]
    }

    /// Canonical lowercase name, as used in classifier output schemas
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Math => "math",
            Category::History => "history",
            Category::Science => "science",
            Category::Creative => "creative",
            Category::General => "general",
            Category::Unknown => "unknown",
        }
    }

    /// Parse a classifier answer, tolerating case and surrounding noise
    ///
    /// Returns `None` for anything outside the closed set so the caller can
    /// decide how to degrade (the classifier maps it to `Unknown` and logs).
    pub fn parse_lenient(s: &str) -> Option<Category> {
        match s.trim().trim_matches(['"', '.', '!']).to_lowercase().as_str() {
            "math" => Some(Category::Math),
            "history" => Some(Category::History),
            "science" => Some(Category::Science),
            "creative" => Some(Category::Creative),
            "general" => Some(Category::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse_lenient(s).ok_or_else(|| {
            format!(
                "Unknown category: {}. Valid: math, history, science, creative, general",
                s
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_excludes_unknown() {
        assert!(!Category::all().contains(&Category::Unknown));
        assert_eq!(Category::all().len(), 5);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(Category::parse_lenient("math"), Some(Category::Math));
        assert_eq!(Category::parse_lenient("  HISTORY "), Some(Category::History));
        assert_eq!(Category::parse_lenient("\"science\""), Some(Category::Science));
        assert_eq!(Category::parse_lenient("poetry"), None);
        assert_eq!(Category::parse_lenient(""), None);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("unknown".parse::<Category>().is_err());
        assert!("math".parse::<Category>().is_ok());
    }

    #[test]
    fn test_display_round_trip() {
        for category in Category::all() {
            assert_eq!(
                Category::parse_lenient(&category.to_string()),
                Some(*category)
            );
        }
    }
}
