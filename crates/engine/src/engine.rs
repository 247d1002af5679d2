//! The question-answering pipeline.

use crate::coordinator::{gather, RetrievedContent};
use crate::escalation::Escalation;
use crate::memory::Exchange;
use crate::relevance::RelevanceGate;
use crate::selector::SourceSelector;
use crate::session::{Session, SessionState};
use crate::synthesis::{AnswerSynthesizer, SYNTHESIS_APOLOGY};
use lexguide_core::config::EngineSettings;
use lexguide_knowledge::{IngestStats, SourceRegistry};

/// Asked for when nothing usable was found and attempts remain.
pub const CLARIFICATION_REQUEST: &str = "I couldn't find specific information about your question in our legal documents. Could you please provide more specific details or rephrase your question?";

/// Answers legal questions from the registered sources.
///
/// Holds no conversation state of its own; callers pass a `Session`.
pub struct QaEngine {
    registry: SourceRegistry,
    selector: SourceSelector,
    gate: RelevanceGate,
    synthesizer: AnswerSynthesizer,
    settings: EngineSettings,
    ingest_stats: Vec<IngestStats>,
}

impl QaEngine {
    pub(crate) fn new(
        registry: SourceRegistry,
        selector: SourceSelector,
        gate: RelevanceGate,
        synthesizer: AnswerSynthesizer,
        settings: EngineSettings,
        ingest_stats: Vec<IngestStats>,
    ) -> Self {
        Self {
            registry,
            selector,
            gate,
            synthesizer,
            settings,
            ingest_stats,
        }
    }

    /// Start a conversation.
    pub fn new_session(&self) -> Session {
        Session::new(&self.settings)
    }

    /// Answer `question`, optionally with caller-supplied context.
    ///
    /// This function:
    /// 1. Selects sources for the question
    /// 2. Gathers text from them, falling back to web search
    /// 3. Gates web-only results on relevance
    /// 4. Escalates misses from clarification to a general-knowledge answer
    /// 5. Synthesizes an answer and records the exchange
    ///
    /// Never fails; every error degrades to a user-facing string.
    pub async fn answer(&self, session: &Session, question: &str, context: Option<&str>) -> String {
        let question = question.trim();
        if question.is_empty() {
            return CLARIFICATION_REQUEST.to_string();
        }

        tracing::info!(
            session = %session.id(),
            "Processing query: {}",
            truncate(question, 100)
        );

        let mut state = session.state.lock().await;

        let content = match self.selector.select(question, &self.registry).await {
            Some(selection) => {
                tracing::info!("Selected sources: {}", selection);
                gather(question, &selection, &self.registry).await
            }
            None => {
                tracing::warn!("No retrieval sources available");
                RetrievedContent::default()
            }
        };

        if content.is_empty() {
            tracing::info!("No content retrieved");
            return self.handle_no_content(&mut state, question).await;
        }

        if content.is_web_only() {
            let relevant = match content.iter().next() {
                Some((_, text)) => self.gate.is_relevant(question, text).await,
                None => true,
            };
            if !relevant {
                tracing::info!("Web results judged not relevant");
                return self.handle_no_content(&mut state, question).await;
            }
        }

        let history = state.memory.recent_messages(self.settings.history_exchanges);
        let answer = match self
            .synthesizer
            .synthesize(question, &content, history, context)
            .await
        {
            Ok(answer) => {
                state.memory.append(question, answer.clone());
                answer
            }
            Err(e) => {
                tracing::error!("Answer synthesis failed: {}", e);
                SYNTHESIS_APOLOGY.to_string()
            }
        };

        state.tracker.record_success(question);
        answer
    }

    /// Clear the session's conversation memory and escalation state.
    pub async fn reset(&self, session: &Session) {
        session.state.lock().await.reset();
        tracing::info!(session = %session.id(), "Conversation memory reset");
    }

    /// Exchanges answered in this session, oldest first.
    pub async fn history(&self, session: &Session) -> Vec<Exchange> {
        session.state.lock().await.memory.history()
    }

    /// Consecutive misses recorded for `question` in this session.
    pub async fn attempts(&self, session: &Session, question: &str) -> u32 {
        session.state.lock().await.tracker.attempts(question)
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Statistics from corpus ingestion at startup.
    pub fn ingest_stats(&self) -> &[IngestStats] {
        &self.ingest_stats
    }

    async fn handle_no_content(&self, state: &mut SessionState, question: &str) -> String {
        match state.tracker.record_miss(question) {
            Escalation::Clarify { attempt } => {
                tracing::info!(
                    "Asking for clarification (attempt {}/{})",
                    attempt,
                    state.tracker.max_attempts()
                );
                CLARIFICATION_REQUEST.to_string()
            }
            Escalation::GeneralKnowledge => {
                tracing::info!("Attempts exhausted, answering from general knowledge");
                self.synthesizer.general_answer(question).await
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut truncated: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
