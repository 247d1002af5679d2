//! Embedding providers for the in-memory corpora.
//!
//! Embedding quality is not a concern of the pipeline; any provider that maps
//! text to a fixed-width vector works.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::mock::MockProvider;
pub use providers::ollama::OllamaProvider;
