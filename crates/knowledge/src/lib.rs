//! Document knowledge for Lexguide.
//!
//! Chunking, embeddings, in-memory retrieval, web search and the retrieval
//! sources the question-answering engine selects from.

pub mod chunk;
pub mod embeddings;
pub mod ingest;
pub mod metadata;
pub mod parser;
pub mod sources;
pub mod store;
pub mod web;

#[cfg(test)]
mod tests;

pub use chunk::{Chunk, ChunkConfig, ChunkMetadata, Chunker, MetadataValue};
pub use embeddings::{create_provider, EmbeddingProvider, MockProvider, OllamaProvider};
pub use ingest::{ingest_corpus, IngestStats};
pub use metadata::{extract_legal_metadata, DocumentType, LegalMetadata};
pub use sources::{
    format_web_results, probe, CorpusSource, ProbeReport, RetrievalSource, SourceId, SourceKind,
    SourceRegistry, WebSearchSource, WEB_SOURCE_ID,
};
pub use store::{BackendStats, InMemoryStore, RetrievalBackend, ScoredChunk};
pub use web::{SearchDepth, TavilyClient, WebHit, WebSearchBackend, WebSearchError};
