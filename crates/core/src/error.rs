//! Error types for Lexguide.
//!
//! This module defines a unified error enum that covers every error category
//! in the question-answering pipeline: configuration, I/O, completion backends,
//! retrieval, web search, prompts and orchestration.

use thiserror::Error;

/// Unified error type for Lexguide.
///
/// Internal functions return `Result<T, AppError>`. The engine boundary turns
/// every variant into a user-facing string, so none of these reach end users.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text-completion backend errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Chunking, embedding and retrieval backend errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Web search backend errors
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Orchestration errors
    #[error("Engine error: {0}")]
    Engine(String),

    /// A backend call exceeded its time budget
    #[error("Timed out after {0}s: {1}")]
    Timeout(u64, String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
