//! Chunking pipeline orchestrator.

use super::{
    char_len,
    merging::absorb_short_pieces,
    normalize::normalize_text,
    splitters::{reduce_oversized, split_paragraphs, PARAGRAPH_SEPARATOR},
    Chunk, ChunkMetadata, CHUNK_INDEX_KEY, CHUNK_SIZE_KEY,
};
use lexguide_core::config::ChunkingSettings;

/// Configuration for the chunking pipeline, in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Upper bound for every emitted chunk
    pub max_chunk_size: usize,

    /// Chunks shorter than this are merged into a neighbor when possible
    pub min_chunk_size: usize,
}

impl ChunkConfig {
    /// Create a configuration; `max` is at least 1 and `min` never exceeds `max`.
    pub fn new(max_chunk_size: usize, min_chunk_size: usize) -> Self {
        let max_chunk_size = max_chunk_size.max(1);
        Self {
            max_chunk_size,
            min_chunk_size: min_chunk_size.min(max_chunk_size),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self::new(1500, 100)
    }
}

impl From<&ChunkingSettings> for ChunkConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self::new(settings.max_chunk_size, settings.min_chunk_size)
    }
}

/// Splits document text into bounded, paragraph-aligned chunks.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split `text` into chunks.
    ///
    /// Returns an empty vector for empty or whitespace-only input. Each chunk
    /// carries `chunk_index` and `chunk_size`; keys in `metadata` take
    /// precedence over those positional keys.
    pub fn split(&self, text: &str, metadata: Option<&ChunkMetadata>) -> Vec<Chunk> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let structural = split_paragraphs(&normalized, &self.config);
        let pieces = self.post_process(structural);

        tracing::debug!(
            "Chunker produced {} chunks from {} characters",
            pieces.len(),
            char_len(&normalized)
        );

        pieces
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                let mut chunk_metadata = ChunkMetadata::new();
                chunk_metadata.insert(CHUNK_INDEX_KEY.to_string(), index.into());
                chunk_metadata.insert(CHUNK_SIZE_KEY.to_string(), char_len(&text).into());
                if let Some(caller) = metadata {
                    chunk_metadata.extend(caller.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Chunk::new(text, chunk_metadata)
            })
            .collect()
    }

    /// Carry short blocks forward, reduce oversized ones, then settle a short tail.
    fn post_process(&self, structural: Vec<String>) -> Vec<String> {
        let min = self.config.min_chunk_size;
        let max = self.config.max_chunk_size;
        let last = structural.len().saturating_sub(1);

        let mut pieces = Vec::new();
        let mut carry: Option<String> = None;

        for (i, block) in structural.into_iter().enumerate() {
            let block = match carry.take() {
                Some(previous) => format!("{}{}{}", previous, PARAGRAPH_SEPARATOR, block),
                None => block,
            };
            let len = char_len(&block);

            if len < min && i < last {
                carry = Some(block);
            } else if len > max {
                pieces.extend(reduce_oversized(&block, &self.config));
            } else {
                pieces.push(block);
            }
        }

        absorb_short_pieces(pieces, &self.config, PARAGRAPH_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::MetadataValue;

    fn non_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn legal_text(paragraphs: usize) -> String {
        (0..paragraphs)
            .map(|i| {
                format!(
                    "Article {}. The controller shall process personal data lawfully. \
                     The data subject has the right to obtain erasure without undue delay. \
                     Processing requires a legal basis under paragraph {}.",
                    i + 1,
                    i + 2
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n\n")
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let chunker = Chunker::default();
        assert!(chunker.split("", None).is_empty());
        assert!(chunker.split(" \n\t \r\n", None).is_empty());
    }

    #[test]
    fn test_short_document_single_chunk() {
        let chunker = Chunker::default();
        let chunks = chunker.split("GDPR applies.", None);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "GDPR applies.");
        assert_eq!(chunks[0].index(), Some(0));
        assert_eq!(chunks[0].get(CHUNK_SIZE_KEY), Some(&MetadataValue::Int(13)));
    }

    #[test]
    fn test_chunks_respect_max_size() {
        let chunker = Chunker::new(ChunkConfig::new(300, 50));
        let chunks = chunker.split(&legal_text(12), None);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
            assert_eq!(chunk.text, chunk.text.trim());
            assert!(chunk.char_count() <= 300, "chunk too long: {}", chunk.char_count());
        }
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.char_count() >= 50);
        }
    }

    #[test]
    fn test_no_content_lost() {
        let input = format!(
            "{}\n\nx\n\n{}\n\n{}",
            legal_text(3),
            "Supercalifragilisticexpialidociousregulation".repeat(5),
            legal_text(2)
        );
        let chunker = Chunker::new(ChunkConfig::new(120, 40));
        let chunks = chunker.split(&input, None);

        let reassembled: String = chunks.iter().map(|c| non_whitespace(&c.text)).collect();
        assert_eq!(reassembled, non_whitespace(&normalize_text(&input)));
        assert!(chunks.iter().all(|c| c.char_count() <= 120));
    }

    #[test]
    fn test_short_paragraph_carried_forward() {
        let chunker = Chunker::new(ChunkConfig::new(60, 20));
        let text = "Scope.\n\nThis regulation applies broadly. It covers personal data.";
        let chunks = chunker.split(text, None);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Scope. This regulation applies broadly.");
        assert_eq!(chunks[1].text, "It covers personal data.");
    }

    #[test]
    fn test_short_tail_merged_into_previous() {
        let chunker = Chunker::new(ChunkConfig::new(40, 15));
        let text = "The controller shall act. The processor shall assist.\n\nEnd.";
        let chunks = chunker.split(text, None);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "The controller shall act.");
        assert_eq!(chunks[1].text, "The processor shall assist.\n\nEnd.");
    }

    #[test]
    fn test_short_remainder_of_reduced_block_joins_next_block() {
        let sentence = |len: usize| format!("A{}.", "b".repeat(len - 2));
        let paragraph = format!("{} {}", sentence(745), sentence(745));
        let middle = format!("{} {}", paragraph, sentence(41));
        let text = format!("{}\n\n{}\n\n{}", paragraph, middle, paragraph);

        let chunks = Chunker::default().split(&text, None);
        let sizes: Vec<usize> = chunks.iter().map(Chunk::char_count).collect();

        assert_eq!(sizes, vec![1491, 1491, 787, 745]);
        let reassembled: String = chunks.iter().map(|c| non_whitespace(&c.text)).collect();
        assert_eq!(reassembled, non_whitespace(&text));
    }

    #[test]
    fn test_caller_metadata_takes_precedence() {
        let chunker = Chunker::default();
        let mut metadata = ChunkMetadata::new();
        metadata.insert("category".to_string(), "gdpr".into());
        metadata.insert(CHUNK_INDEX_KEY.to_string(), 99usize.into());

        let chunks = chunker.split("Article 17 covers erasure.", Some(&metadata));
        assert_eq!(chunks[0].get("category"), Some(&MetadataValue::from("gdpr")));
        assert_eq!(chunks[0].index(), Some(99));
        assert_eq!(chunks[0].get(CHUNK_SIZE_KEY), Some(&MetadataValue::Int(26)));
    }

    #[test]
    fn test_config_bounds_are_sane() {
        let config = ChunkConfig::new(0, 10);
        assert_eq!(config.max_chunk_size, 1);
        assert_eq!(config.min_chunk_size, 1);
        assert_eq!(ChunkConfig::default(), ChunkConfig::new(1500, 100));
    }
}
