//! Answer synthesis from retrieved content, and the general-knowledge path.

use crate::completion::Completer;
use crate::coordinator::RetrievedContent;
use lexguide_core::AppResult;
use lexguide_llm::ChatMessage;
use lexguide_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::time::Duration;

/// Returned when synthesis fails.
pub const SYNTHESIS_APOLOGY: &str =
    "I apologize, but I encountered an error while synthesizing the answer.";

/// Prefixed to answers that come from general knowledge.
pub const GENERAL_KNOWLEDGE_DISCLAIMER: &str =
    "Note: This response is based on general legal knowledge, not specific documents.\n\n";

/// Returned when the general-knowledge answer fails too.
pub const GENERAL_KNOWLEDGE_FALLBACK: &str = "I apologize, but I couldn't find specific information about your question in our available legal documents. Please consider consulting with a legal expert for detailed advice on this matter.";

const USER_CONTEXT_LABEL: &str = "USER PROVIDED CONTEXT";

/// Turns retrieved text into an answer.
pub struct AnswerSynthesizer {
    completer: Completer,
    synthesize_prompt: PromptDefinition,
    general_prompt: PromptDefinition,
    timeout: Duration,
}

impl AnswerSynthesizer {
    pub fn new(
        completer: Completer,
        synthesize_prompt: PromptDefinition,
        general_prompt: PromptDefinition,
        timeout: Duration,
    ) -> Self {
        Self {
            completer,
            synthesize_prompt,
            general_prompt,
            timeout,
        }
    }

    /// Synthesize an answer, propagating backend errors. The caller owns the
    /// fallback to `SYNTHESIS_APOLOGY`.
    ///
    /// Messages are sent as: prior exchanges, system instruction, then one user
    /// message holding the labeled source blocks and the question.
    pub async fn synthesize(
        &self,
        question: &str,
        content: &RetrievedContent,
        history: Vec<ChatMessage>,
        user_context: Option<&str>,
    ) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert(
            "sources".to_string(),
            build_source_blocks(content, user_context),
        );
        variables.insert("question".to_string(), question.to_string());
        let prompt = build_prompt(&self.synthesize_prompt, variables)?;

        let mut messages = history;
        messages.push(ChatMessage::system(prompt.system));
        messages.push(ChatMessage::user(prompt.user));

        let sources: Vec<&str> = content.sources().iter().map(|id| id.as_str()).collect();
        tracing::info!(
            "Synthesizing answer from {} source(s): {}",
            sources.len(),
            sources.join(", ")
        );

        self.completer.complete(messages, self.timeout).await
    }

    /// Answer from general knowledge with the disclaimer prefix.
    pub async fn general_answer(&self, question: &str) -> String {
        match self.try_general_answer(question).await {
            Ok(answer) => format!("{}{}", GENERAL_KNOWLEDGE_DISCLAIMER, answer),
            Err(e) => {
                tracing::error!("General-knowledge answer failed: {}", e);
                GENERAL_KNOWLEDGE_FALLBACK.to_string()
            }
        }
    }

    async fn try_general_answer(&self, question: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        let prompt = build_prompt(&self.general_prompt, variables)?;

        self.completer
            .complete(
                vec![ChatMessage::system(prompt.system), ChatMessage::user(prompt.user)],
                self.timeout,
            )
            .await
    }
}

/// Labeled blocks: user context first when given, then one per source.
pub fn build_source_blocks(content: &RetrievedContent, user_context: Option<&str>) -> String {
    let mut blocks = Vec::with_capacity(content.len() + 1);

    if let Some(context) = user_context.map(str::trim).filter(|c| !c.is_empty()) {
        blocks.push(format!("--- {} ---\n{}", USER_CONTEXT_LABEL, context));
    }

    for (id, text) in content.iter() {
        blocks.push(format!("--- {} SOURCE ---\n{}", id.label(), text));
    }

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{scripted_completer, ScriptedClient};
    use lexguide_core::config::LlmSettings;
    use lexguide_core::AppError;
    use lexguide_knowledge::SourceId;
    use lexguide_llm::Role;
    use lexguide_prompt::PromptSet;

    fn content(entries: &[(&str, &str)]) -> RetrievedContent {
        entries
            .iter()
            .map(|(id, text)| (SourceId::new(*id).unwrap(), text.to_string()))
            .collect()
    }

    fn synthesizer(completer: Completer) -> AnswerSynthesizer {
        let prompts = PromptSet::builtin();
        AnswerSynthesizer::new(completer, prompts.synthesize, prompts.general, Duration::from_secs(1))
    }

    #[test]
    fn test_source_blocks_layout() {
        let blocks = build_source_blocks(
            &content(&[("gdpr", "Article 17"), ("web", "**News**")]),
            Some("We are a Jakarta startup."),
        );
        assert_eq!(
            blocks,
            "--- USER PROVIDED CONTEXT ---\nWe are a Jakarta startup.\n\n--- GDPR SOURCE ---\nArticle 17\n\n--- WEB SOURCE ---\n**News**"
        );
    }

    #[test]
    fn test_blank_context_omitted() {
        let blocks = build_source_blocks(&content(&[("pdp", "Pasal 4")]), Some("   "));
        assert_eq!(blocks, "--- PDP SOURCE ---\nPasal 4");
    }

    #[tokio::test]
    async fn test_message_order_history_system_user() {
        let client = ScriptedClient::new(|_| Ok("answer".to_string()));
        let completer = Completer::new(client.clone(), &LlmSettings::default());
        let history = vec![ChatMessage::user("q0"), ChatMessage::assistant("a0")];

        let answer = synthesizer(completer)
            .synthesize("What is erasure?", &content(&[("gdpr", "Article 17")]), history, None)
            .await
            .unwrap();
        assert_eq!(answer, "answer");

        let request = client.requests().pop().unwrap();
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::System, Role::User]);
        let user = &request.messages[3].content;
        assert!(user.contains("--- GDPR SOURCE ---\nArticle 17"));
        assert!(user.ends_with("Question: What is erasure?"));
    }

    #[tokio::test]
    async fn test_synthesis_failure_propagates() {
        let completer = scripted_completer(|_| Err(AppError::Llm("boom".to_string())));
        let result = synthesizer(completer)
            .synthesize("q", &content(&[("gdpr", "x")]), Vec::new(), None)
            .await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_general_answer_prefix_and_fallback() {
        let ok = synthesizer(scripted_completer(|_| Ok("General guidance.".to_string())));
        assert_eq!(
            ok.general_answer("q").await,
            "Note: This response is based on general legal knowledge, not specific documents.\n\nGeneral guidance."
        );

        let failing = synthesizer(scripted_completer(|_| Err(AppError::Llm("down".to_string()))));
        assert_eq!(failing.general_answer("q").await, GENERAL_KNOWLEDGE_FALLBACK);
    }
}
