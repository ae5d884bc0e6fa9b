//! Built-in template catalog
//!
//! Implements the prompt-renderer port with named templates and `{{var}}`
//! substitution. Ships with defaults for every template id the pipeline
//! renders; deployments can register replacements without recompiling the
//! application layer.

use redraft_application::ports::prompt_renderer::{PromptRenderer, RenderError, TemplateVars};
use std::collections::HashMap;

const AGENT_SYSTEM: &str = "You are a writing specialist. You produce {{descriptor}}. \
Respond only in the requested format.";

const AGENT_GENERATE: &str = "Task:\n{{task}}\n\n\
Reference passages (may be empty):\n{{context}}\n\n\
Write {{descriptor}} for this task.";

const AGENT_REVISE: &str = "Task:\n{{task}}\n\n\
Current draft titled {{draft_title}}:\n{{draft_body}}\n\n\
Reviewer feedback:\n{{feedback}}\n\n\
Produce a revised draft of {{descriptor}} that addresses the feedback. \
Keep what the reviewers praised.";

const CLASSIFY_SYSTEM: &str = "You classify writing tasks. \
Answer with exactly one of: {{categories}}. No other words.";

const CLASSIFY_TASK: &str = "Classify this task into one of: {{categories}}.\n\nTask:\n{{task}}";

const REVIEW_SYSTEM: &str = "You are the {{persona}} reviewer. \
You evaluate drafts strictly for {{focus}}. Be specific and constructive.";

const REVIEW_CRITIQUE: &str = "Review the following draft for {{focus}}.\n\n\
Title: {{draft_title}}\n\n{{draft_body}}\n\n\
Give your assessment and a 1-10 score.";

const GUARDRAIL_SYSTEM: &str = "You are a policy checker. The acceptance condition is: \
{{condition}}. Answer PASS, or REJECT: <short reason>.";

const GUARDRAIL_CHECK: &str = "Condition: {{condition}}\n\nText to check:\n{{text}}";

/// Named prompt templates with `{{var}}` substitution
pub struct TemplateCatalog {
    templates: HashMap<String, String>,
}

impl TemplateCatalog {
    /// Catalog preloaded with the built-in templates
    pub fn new() -> Self {
        let mut catalog = Self {
            templates: HashMap::new(),
        };
        catalog.register("agent.system", AGENT_SYSTEM);
        catalog.register("agent.generate", AGENT_GENERATE);
        catalog.register("agent.revise", AGENT_REVISE);
        catalog.register("classify.system", CLASSIFY_SYSTEM);
        catalog.register("classify.task", CLASSIFY_TASK);
        catalog.register("review.system", REVIEW_SYSTEM);
        catalog.register("review.critique", REVIEW_CRITIQUE);
        catalog.register("guardrail.system", GUARDRAIL_SYSTEM);
        catalog.register("guardrail.check", GUARDRAIL_CHECK);
        catalog
    }

    /// Register or replace a template
    pub fn register(&mut self, id: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(id.into(), template.into());
    }

    /// First `{{...}}` placeholder left in the text, if any
    fn unbound_placeholder(text: &str) -> Option<String> {
        let start = text.find("{{")?;
        let rest = &text[start + 2..];
        let end = rest.find("}}")?;
        Some(rest[..end].to_string())
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer for TemplateCatalog {
    fn render(&self, template_id: &str, vars: &TemplateVars) -> Result<String, RenderError> {
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| RenderError::UnknownTemplate(template_id.to_string()))?;

        let mut rendered = template.clone();
        for (key, value) in vars {
            rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
        }

        if let Some(variable) = Self::unbound_placeholder(&rendered) {
            return Err(RenderError::UnboundVariable {
                template: template_id.to_string(),
                variable,
            });
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_application::ports::prompt_renderer::vars;

    #[test]
    fn test_renders_builtin_template() {
        let catalog = TemplateCatalog::new();
        let rendered = catalog
            .render(
                "agent.generate",
                &vars([
                    ("task", "Solve x+3=5"),
                    ("context", ""),
                    ("descriptor", "a step-by-step solution"),
                ]),
            )
            .unwrap();
        assert!(rendered.contains("Solve x+3=5"));
        assert!(rendered.contains("a step-by-step solution"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_unknown_template() {
        let catalog = TemplateCatalog::new();
        let result = catalog.render("no.such.template", &vars([]));
        assert_eq!(
            result,
            Err(RenderError::UnknownTemplate("no.such.template".to_string()))
        );
    }

    #[test]
    fn test_unbound_variable() {
        let catalog = TemplateCatalog::new();
        let result = catalog.render("classify.task", &vars([("task", "hello")]));
        assert_eq!(
            result,
            Err(RenderError::UnboundVariable {
                template: "classify.task".to_string(),
                variable: "categories".to_string(),
            })
        );
    }

    #[test]
    fn test_every_pipeline_template_is_registered() {
        let catalog = TemplateCatalog::new();
        for id in [
            "agent.system",
            "agent.generate",
            "agent.revise",
            "classify.system",
            "classify.task",
            "review.system",
            "review.critique",
            "guardrail.system",
            "guardrail.check",
        ] {
            assert!(catalog.templates.contains_key(id), "missing {}", id);
        }
    }

    #[test]
    fn test_custom_template_overrides_builtin() {
        let mut catalog = TemplateCatalog::new();
        catalog.register("agent.system", "Custom: {{descriptor}}");
        let rendered = catalog
            .render("agent.system", &vars([("descriptor", "poems")]))
            .unwrap();
        assert_eq!(rendered, "Custom: poems");
    }
}
