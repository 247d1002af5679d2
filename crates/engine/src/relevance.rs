//! Relevance check for web-only results.

use crate::completion::Completer;
use lexguide_core::AppResult;
use lexguide_llm::ChatMessage;
use lexguide_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::time::Duration;

/// Asks the completion backend whether web content answers a question.
pub struct RelevanceGate {
    completer: Completer,
    prompt: PromptDefinition,
    timeout: Duration,
    prefix_chars: usize,
}

impl RelevanceGate {
    pub fn new(
        completer: Completer,
        prompt: PromptDefinition,
        timeout: Duration,
        prefix_chars: usize,
    ) -> Self {
        Self {
            completer,
            prompt,
            timeout,
            prefix_chars,
        }
    }

    /// Judge `content` against `question`. Backend failures count as relevant.
    pub async fn is_relevant(&self, question: &str, content: &str) -> bool {
        match self.classify(question, content).await {
            Ok(output) => {
                let verdict = parse_verdict(&output);
                tracing::info!("Relevance verdict for web content: {}", verdict);
                verdict
            }
            Err(e) => {
                tracing::error!("Relevance check failed, treating content as relevant: {}", e);
                true
            }
        }
    }

    async fn classify(&self, question: &str, content: &str) -> AppResult<String> {
        let prefix: String = content.chars().take(self.prefix_chars).collect();

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("content".to_string(), prefix);
        let prompt = build_prompt(&self.prompt, variables)?;

        self.completer
            .complete(
                vec![ChatMessage::system(prompt.system), ChatMessage::user(prompt.user)],
                self.timeout,
            )
            .await
    }
}

/// `false` only for an explicit "not relevant" or "irrelevant".
pub fn parse_verdict(output: &str) -> bool {
    let output = output.to_lowercase();
    !(output.contains("not relevant") || output.contains("irrelevant"))
}
