//! Prompt renderer port
//!
//! Prompt wording lives outside this crate; components only name a template
//! and supply variables. Rendering is a pure function over externally
//! versioned templates.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while rendering a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template {template} references unbound variable: {variable}")]
    UnboundVariable { template: String, variable: String },
}

/// Variables handed to a template
pub type TemplateVars = BTreeMap<String, String>;

/// Pure prompt-rendering boundary
pub trait PromptRenderer: Send + Sync {
    /// Render the named template with the given variables
    fn render(&self, template_id: &str, vars: &TemplateVars) -> Result<String, RenderError>;
}

/// Convenience for building [`TemplateVars`] inline
pub fn vars<const N: usize>(pairs: [(&str, &str); N]) -> TemplateVars {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
