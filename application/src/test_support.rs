//! Hand-written test doubles for the ports
//!
//! Shared by the unit tests across this crate.

use crate::ports::event_sink::{EventSink, PipelineEvent};
use crate::ports::memory_store::{MemoryError, MemoryStore};
use crate::ports::model_client::{
    GenerationFailure, GenerationRequest, ModelClient, ModelOutput,
};
use crate::ports::prompt_renderer::{PromptRenderer, RenderError, TemplateVars};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Handler =
    Box<dyn Fn(usize, &GenerationRequest) -> Result<ModelOutput, GenerationFailure> + Send + Sync>;

/// Scriptable [`ModelClient`] with a call counter and optional fixed delay
pub struct StubModelClient {
    handler: Handler,
    calls: AtomicUsize,
    delay: Option<Duration>,
    last_prompt: Mutex<Option<String>>,
}

impl StubModelClient {
    /// Always return the same text
    pub fn returning(text: &str) -> Self {
        let text = text.to_string();
        Self::with_handler(move |_, _| Ok(ModelOutput::new(text.clone())))
    }

    /// Always fail with the given failure
    pub fn failing(failure: GenerationFailure) -> Self {
        Self::with_handler(move |_, _| Err(failure.clone()))
    }

    /// Answer per call index and request
    pub fn with_handler(
        handler: impl Fn(usize, &GenerationRequest) -> Result<ModelOutput, GenerationFailure>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
            delay: None,
            last_prompt: Mutex::new(None),
        }
    }

    /// Sleep this long inside every call (for concurrency timing tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompt of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for StubModelClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<ModelOutput, GenerationFailure> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(index, &request)
    }
}

/// Renderer that echoes the template id and every variable value
///
/// Keeps prompt contents inspectable without real templates: a test can
/// assert that task text, context, or feedback reached the prompt.
pub struct EchoRenderer;

impl PromptRenderer for EchoRenderer {
    fn render(&self, template_id: &str, vars: &TemplateVars) -> Result<String, RenderError> {
        let mut out = template_id.to_string();
        for (key, value) in vars {
            out.push_str(&format!("\n{}: {}", key, value));
        }
        Ok(out)
    }
}

/// Memory store returning a fixed passage list
pub struct StaticMemory {
    passages: Vec<String>,
}

impl StaticMemory {
    pub fn new(passages: Vec<String>) -> Self {
        Self { passages }
    }
}

#[async_trait]
impl MemoryStore for StaticMemory {
    async fn search(&self, _query: &str, k: usize) -> Result<Vec<String>, MemoryError> {
        Ok(self.passages.iter().take(k).cloned().collect())
    }
}

/// Sink that captures every event for assertions
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
