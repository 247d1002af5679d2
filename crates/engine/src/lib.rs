//! Question-answering orchestration for Lexguide.
//!
//! A question flows through source selection, retrieval, the web relevance
//! check and escalation before an answer is synthesized:
//! - `SourceSelector` picks sources (completion backend, keyword fallback)
//! - `gather` queries them and falls back to web search
//! - `RelevanceGate` screens web-only results
//! - `EscalationTracker` turns repeated misses into a general-knowledge answer
//! - `AnswerSynthesizer` writes the answer from labeled source blocks
//! - `ConversationMemory` replays recent exchanges
//!
//! Conversation state lives in a caller-owned `Session`.
//!
//! # Example
//! ```no_run
//! use lexguide_core::AppConfig;
//! use lexguide_engine::EngineBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let engine = EngineBuilder::from_config(&config).await?;
//! let session = engine.new_session();
//! let answer = engine.answer(&session, "What are GDPR data subject rights?", None).await;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod completion;
pub mod coordinator;
pub mod engine;
pub mod escalation;
pub mod memory;
pub mod relevance;
pub mod selection;
pub mod selector;
pub mod session;
pub mod synthesis;

#[cfg(test)]
mod tests;

pub use builder::{load_corpora, web_source, EngineBuilder};
pub use completion::Completer;
pub use coordinator::{gather, RetrievedContent};
pub use engine::{QaEngine, CLARIFICATION_REQUEST};
pub use escalation::{normalize_question, Escalation, EscalationTracker};
pub use memory::{ConversationMemory, Exchange};
pub use relevance::{parse_verdict, RelevanceGate};
pub use selection::{parse_selection, SourceSelection};
pub use selector::{keyword_selection, SourceSelector};
pub use session::Session;
pub use synthesis::{
    build_source_blocks, AnswerSynthesizer, GENERAL_KNOWLEDGE_DISCLAIMER,
    GENERAL_KNOWLEDGE_FALLBACK, SYNTHESIS_APOLOGY,
};
