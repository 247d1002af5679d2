//! Source selection: ask the completion backend, fall back to keywords.

use crate::completion::Completer;
use crate::selection::{parse_selection, SourceSelection};
use lexguide_core::AppResult;
use lexguide_knowledge::SourceRegistry;
use lexguide_llm::ChatMessage;
use lexguide_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::time::Duration;

/// Chooses which registered sources answer a question.
pub struct SourceSelector {
    completer: Completer,
    prompt: PromptDefinition,
    timeout: Duration,
    recency_terms: Vec<String>,
}

impl SourceSelector {
    pub fn new(
        completer: Completer,
        prompt: PromptDefinition,
        timeout: Duration,
        recency_terms: Vec<String>,
    ) -> Self {
        Self {
            completer,
            prompt,
            timeout,
            recency_terms: recency_terms.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Select sources for `question`.
    ///
    /// Uses the completion backend first. Unparseable output, unknown ids and
    /// backend failures all fall through to `keyword_selection`. `None` only
    /// when the registry is empty.
    pub async fn select(&self, question: &str, registry: &SourceRegistry) -> Option<SourceSelection> {
        match self.ask_backend(question, registry).await {
            Ok(output) => {
                if let Some(selection) = parse_selection(&output, registry) {
                    tracing::debug!("Backend selected sources {}", selection);
                    return Some(selection);
                }
                tracing::warn!(
                    "Unusable source selection {:?}, using keyword fallback",
                    truncate(&output, 100)
                );
            }
            Err(e) => {
                tracing::error!("Source selection failed: {}", e);
            }
        }

        let selection = keyword_selection(question, registry, &self.recency_terms);
        if let Some(ref selection) = selection {
            tracing::debug!("Keyword fallback selected sources {}", selection);
        }
        selection
    }

    async fn ask_backend(&self, question: &str, registry: &SourceRegistry) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("sources".to_string(), registry.describe());
        variables.insert("question".to_string(), question.to_string());
        let prompt = build_prompt(&self.prompt, variables)?;

        self.completer
            .complete(
                vec![ChatMessage::system(prompt.system), ChatMessage::user(prompt.user)],
                self.timeout,
            )
            .await
    }
}

/// Deterministic keyword selection.
///
/// Document sources whose trigger terms occur in the question are selected in
/// registry order; when none match, every document source is. The web source,
/// if registered, is added when a recency term occurs or when no document
/// source matched.
pub fn keyword_selection(
    question: &str,
    registry: &SourceRegistry,
    recency_terms: &[String],
) -> Option<SourceSelection> {
    let question = question.to_lowercase();

    let matched: Vec<_> = registry
        .document_sources()
        .filter(|source| source.triggers().iter().any(|t| question.contains(t.as_str())))
        .map(|source| source.id().clone())
        .collect();

    let nothing_matched = matched.is_empty();
    let mut ids = if nothing_matched {
        registry.document_sources().map(|s| s.id().clone()).collect()
    } else {
        matched
    };

    let recent = recency_terms.iter().any(|t| question.contains(t.as_str()));
    if recent || nothing_matched {
        if let Some(web) = registry.web() {
            ids.push(web.id().clone());
        }
    }

    SourceSelection::new(ids)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
