//! Task classification
//!
//! One cheap model call constrained to the closed category set. This stage
//! never fails the request: anything that goes wrong — gateway error, an
//! answer outside the enumeration — degrades to `Category::Unknown`, which
//! the registry serves with the default agent.

use crate::ports::event_sink::{EventSink, PipelineEvent};
use crate::ports::model_client::{
    GenerationRequest, ModelClient, ModelProfile, OutputSchema,
};
use crate::ports::prompt_renderer::{PromptRenderer, vars};
use redraft_domain::{Category, TaskInput};
use std::sync::Arc;
use tracing::{debug, warn};

/// Template ids the classifier renders
pub mod templates {
    pub const CLASSIFY_SYSTEM: &str = "classify.system";
    pub const CLASSIFY_TASK: &str = "classify.task";
}

/// Maps raw input to a task category
pub struct Classifier {
    model: Arc<dyn ModelClient>,
    renderer: Arc<dyn PromptRenderer>,
    events: Arc<dyn EventSink>,
    profile: ModelProfile,
}

impl Classifier {
    pub fn new(
        model: Arc<dyn ModelClient>,
        renderer: Arc<dyn PromptRenderer>,
        events: Arc<dyn EventSink>,
        profile: ModelProfile,
    ) -> Self {
        Self {
            model,
            renderer,
            events,
            profile,
        }
    }

    /// Classify the input
    ///
    /// A caller-supplied hint is already typed, so it short-circuits the
    /// model call entirely.
    pub async fn classify(&self, input: &TaskInput) -> Category {
        if let Some(hint) = input.category_hint() {
            debug!("Using caller-supplied category hint: {}", hint);
            self.events.record(PipelineEvent::TaskClassified {
                category: hint,
                from_hint: true,
            });
            return hint;
        }

        let category = match self.ask_model(input).await {
            Ok(category) => category,
            Err(reason) => {
                warn!("Classification degraded to unknown: {}", reason);
                Category::Unknown
            }
        };

        self.events.record(PipelineEvent::TaskClassified {
            category,
            from_hint: false,
        });
        category
    }

    async fn ask_model(&self, input: &TaskInput) -> Result<Category, String> {
        let category_names = Category::all()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let system = self
            .renderer
            .render(
                templates::CLASSIFY_SYSTEM,
                &vars([("categories", category_names.as_str())]),
            )
            .map_err(|e| e.to_string())?;
        let prompt = self
            .renderer
            .render(
                templates::CLASSIFY_TASK,
                &vars([
                    ("task", input.text()),
                    ("categories", category_names.as_str()),
                ]),
            )
            .map_err(|e| e.to_string())?;

        let request = GenerationRequest::new(system, prompt)
            .with_schema(OutputSchema::Text)
            .with_profile(self.profile.clone());

        let output = self
            .model
            .generate(request)
            .await
            .map_err(|e| e.to_string())?;

        Category::parse_lenient(output.text())
            .ok_or_else(|| format!("model answered outside the category set: {:?}", output.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::event_sink::NoopEventSink;
    use crate::ports::model_client::GenerationFailure;
    use crate::test_support::{EchoRenderer, RecordingSink, StubModelClient};
    use std::time::Duration;

    fn classifier(client: Arc<StubModelClient>, events: Arc<dyn EventSink>) -> Classifier {
        Classifier::new(
            client,
            Arc::new(EchoRenderer),
            events,
            ModelProfile::default(),
        )
    }

    #[tokio::test]
    async fn test_classifies_from_model_answer() {
        let client = Arc::new(StubModelClient::returning("math"));
        let classifier = classifier(client.clone(), Arc::new(NoopEventSink));

        let category = classifier
            .classify(&TaskInput::new("Solve x+3=5, write a step-by-step solution"))
            .await;
        assert_eq!(category, Category::Math);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_tolerates_noisy_answer() {
        let client = Arc::new(StubModelClient::returning("  \"History\". "));
        let classifier = classifier(client, Arc::new(NoopEventSink));

        let category = classifier.classify(&TaskInput::new("Who was Napoleon?")).await;
        assert_eq!(category, Category::History);
    }

    #[tokio::test]
    async fn test_out_of_set_answer_degrades_to_unknown() {
        let client = Arc::new(StubModelClient::returning("astrology"));
        let classifier = classifier(client, Arc::new(NoopEventSink));

        let category = classifier.classify(&TaskInput::new("anything")).await;
        assert_eq!(category, Category::Unknown);
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_unknown() {
        let client = Arc::new(StubModelClient::failing(GenerationFailure::Timeout(
            Duration::from_secs(5),
        )));
        let classifier = classifier(client, Arc::new(NoopEventSink));

        let category = classifier.classify(&TaskInput::new("anything")).await;
        assert_eq!(category, Category::Unknown);
    }

    #[tokio::test]
    async fn test_hint_skips_model_call() {
        let client = Arc::new(StubModelClient::returning("history"));
        let sink = Arc::new(RecordingSink::new());
        let classifier = classifier(client.clone(), sink.clone());

        let input = TaskInput::new("Solve x+3=5").with_hint(Category::Math);
        let category = classifier.classify(&input).await;

        assert_eq!(category, Category::Math);
        assert_eq!(client.calls(), 0);
        assert!(matches!(
            sink.events()[0],
            PipelineEvent::TaskClassified {
                category: Category::Math,
                from_hint: true,
            }
        ));
    }
}
