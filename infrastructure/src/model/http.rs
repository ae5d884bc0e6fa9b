//! HTTP model client
//!
//! Adapter for any OpenAI-compatible chat-completions endpoint. Owns the
//! per-call timeout and the small bounded retry for retryable failures that
//! the port contract assigns to the adapter — callers never retry on top.

use async_trait::async_trait;
use redraft_application::ports::model_client::{
    GenerationFailure, GenerationRequest, ModelClient, ModelOutput, OutputSchema,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Retries after the initial attempt, for retryable failures only
const MAX_RETRIES: usize = 2;

/// Base backoff between retry attempts, doubled per attempt
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// OpenAI-compatible chat-completions adapter
pub struct HttpModelClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout_override: Option<Duration>,
}

impl HttpModelClient {
    /// Create a client against the given base URL (e.g.
    /// `https://api.openai.com/v1`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout_override: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the per-call timeout carried by each request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<ModelOutput, GenerationFailure> {
        let mut system = request.system_prompt.clone();
        let mut body = json!({
            "model": request.profile.model,
            "temperature": request.profile.temperature,
        });

        if let OutputSchema::Json { description } = &request.schema {
            body["response_format"] = json!({"type": "json_object"});
            system.push_str(&format!("\n\nRespond with a single JSON object. {}", description));
        }

        body["messages"] = json!([
            {"role": "system", "content": system},
            {"role": "user", "content": request.prompt},
        ]);

        let mut http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let send = async {
            let response = http_request
                .send()
                .await
                .map_err(|e| GenerationFailure::Transport(e.to_string()))?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Err(GenerationFailure::RateLimited(status.to_string()));
            }
            if status.is_server_error() {
                return Err(GenerationFailure::Transport(format!(
                    "server error: {}",
                    status
                )));
            }
            if !status.is_success() {
                return Err(GenerationFailure::Rejected(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown")
                )));
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| GenerationFailure::MalformedOutput(e.to_string()))?;
            let content = parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .ok_or_else(|| {
                    GenerationFailure::MalformedOutput("response carried no choices".to_string())
                })?;
            Ok(ModelOutput::new(content))
        };

        let timeout = self.timeout_override.unwrap_or(request.timeout);
        tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| GenerationFailure::Timeout(timeout))?
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<ModelOutput, GenerationFailure> {
        let mut backoff = RETRY_BACKOFF;
        for attempt in 0..=MAX_RETRIES {
            match self.attempt(&request).await {
                Ok(output) => return Ok(output),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    warn!(
                        "Model call failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        MAX_RETRIES + 1,
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => {
                    debug!("Model call failed without retry: {}", e);
                    return Err(e);
                }
            }
        }
        unreachable!("retry loop always returns")
    }
}
