//! Corpus ingestion: parse, chunk and load documents into a retrieval backend.
//!
//! Runs as a batch step before questions are answered. A file that fails to
//! parse or embed is logged and counted; it never aborts the corpus.

use crate::chunk::{ChunkMetadata, Chunker, FILENAME_KEY};
use crate::metadata::extract_legal_metadata;
use crate::parser::{parse_file, DocumentFormat};
use crate::store::RetrievalBackend;
use chrono::Utc;
use lexguide_core::{AppError, AppResult};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

/// Metadata key holding the corpus id.
pub const CATEGORY_KEY: &str = "category";

/// Metadata key holding the per-document UUID.
pub const DOCUMENT_ID_KEY: &str = "document_id";

/// Outcome of ingesting one corpus directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestStats {
    pub corpus: String,
    pub documents: usize,
    pub chunks: usize,
    pub failed_documents: usize,
    pub bytes: u64,
    pub duration_secs: f64,
}

/// Ingest every supported file under `dir` into `backend`.
///
/// Chunks carry the corpus id as `category`, the file name as `filename`,
/// a fresh `document_id` and the document's legal metadata summary.
pub async fn ingest_corpus(
    corpus_id: &str,
    dir: &Path,
    chunker: &Chunker,
    backend: &dyn RetrievalBackend,
) -> AppResult<IngestStats> {
    if !dir.is_dir() {
        return Err(AppError::Knowledge(format!(
            "Corpus directory not found for '{}': {:?}",
            corpus_id, dir
        )));
    }

    let start = Instant::now();
    let mut stats = IngestStats {
        corpus: corpus_id.to_string(),
        ..Default::default()
    };

    tracing::info!("Ingesting corpus '{}' from {:?}", corpus_id, dir);

    let files = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .filter(|e| DocumentFormat::from_path(e.path()).is_some());

    for entry in files {
        match ingest_file(corpus_id, entry.path(), chunker, backend).await {
            Ok((chunks, bytes)) => {
                stats.documents += 1;
                stats.chunks += chunks;
                stats.bytes += bytes;
            }
            Err(e) => {
                tracing::error!("Failed to ingest {:?}: {}", entry.path(), e);
                stats.failed_documents += 1;
            }
        }
    }

    stats.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        "Corpus '{}' ingested: {} documents, {} chunks, {} failed, {} bytes in {:.2}s",
        corpus_id,
        stats.documents,
        stats.chunks,
        stats.failed_documents,
        stats.bytes,
        stats.duration_secs
    );

    Ok(stats)
}

/// Ingest a single file, returning (chunks added, bytes read).
async fn ingest_file(
    corpus_id: &str,
    path: &Path,
    chunker: &Chunker,
    backend: &dyn RetrievalBackend,
) -> AppResult<(usize, u64)> {
    let text = parse_file(path)?;
    let bytes = text.len() as u64;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut metadata: ChunkMetadata = extract_legal_metadata(&text).to_chunk_metadata();
    metadata.insert(CATEGORY_KEY.to_string(), corpus_id.into());
    metadata.insert(FILENAME_KEY.to_string(), filename.into());
    metadata.insert(
        DOCUMENT_ID_KEY.to_string(),
        uuid::Uuid::new_v4().to_string().into(),
    );
    metadata.insert("ingested_at".to_string(), Utc::now().to_rfc3339().into());

    let chunks = chunker.split(&text, Some(&metadata));
    if chunks.is_empty() {
        tracing::warn!("No content in {:?}", path);
        return Ok((0, bytes));
    }

    let added = backend.add_chunks(chunks).await?;

    tracing::debug!("Processed {:?}: {} chunks, {} bytes", path, added, bytes);

    Ok((added, bytes))
}
