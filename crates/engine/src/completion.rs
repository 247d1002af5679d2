//! Bounded calls to the text-completion backend.

use lexguide_core::config::LlmSettings;
use lexguide_core::{AppError, AppResult};
use lexguide_llm::{ChatMessage, LlmClient, LlmRequest};
use std::sync::Arc;
use std::time::Duration;

/// A completion client bound to one model and sampling configuration.
#[derive(Clone)]
pub struct Completer {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Completer {
    pub fn new(client: Arc<dyn LlmClient>, settings: &LlmSettings) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `messages` and return the response text, failing after `timeout`.
    pub async fn complete(&self, messages: Vec<ChatMessage>, timeout: Duration) -> AppResult<String> {
        let request = LlmRequest::new(messages, self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        tracing::trace!(
            "Completion request to {} ({} messages)",
            self.client.provider_name(),
            request.messages.len()
        );

        match tokio::time::timeout(timeout, self.client.complete(&request)).await {
            Ok(Ok(response)) => Ok(response.content),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AppError::Timeout(
                timeout.as_secs(),
                format!("completion from {}", self.client.provider_name()),
            )),
        }
    }
}
