//! Document chunking for retrieval indexing.
//!
//! This module splits cleaned document text into bounded pieces:
//! - Normalizes whitespace and strips unprintable characters
//! - Accumulates paragraphs greedily up to the size bound
//! - Carries short chunks into their successor
//! - Reduces oversized chunks by sentences, then words, then grapheme clusters

mod merging;
mod normalize;
mod pipeline;
mod splitters;

pub use normalize::normalize_text;
pub use pipeline::{ChunkConfig, Chunker};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Positional metadata key: ordinal of the chunk within its document.
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// Positional metadata key: chunk length in characters.
pub const CHUNK_SIZE_KEY: &str = "chunk_size";

/// Metadata key holding the source file name.
pub const FILENAME_KEY: &str = "filename";

/// A scalar metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetadataValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Int(i) => write!(f, "{}", i),
            MetadataValue::Float(x) => write!(f, "{}", x),
            MetadataValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Str(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Str(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Int(value as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// String-keyed scalar metadata attached to a chunk.
pub type ChunkMetadata = BTreeMap<String, MetadataValue>;

/// A bounded fragment of one document.
///
/// Text is non-empty and trimmed. Chunks are never mutated after the
/// chunker emits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(text: String, metadata: ChunkMetadata) -> Self {
        Self { text, metadata }
    }

    /// Length of the text in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    /// Source file name, when the ingesting process recorded one.
    pub fn filename(&self) -> Option<&str> {
        self.get(FILENAME_KEY).and_then(MetadataValue::as_str)
    }

    pub fn index(&self) -> Option<i64> {
        self.get(CHUNK_INDEX_KEY).and_then(MetadataValue::as_int)
    }
}

/// Character length, the unit every size bound is expressed in.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
