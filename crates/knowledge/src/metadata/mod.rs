//! Legal metadata extraction for ingested documents.
//!
//! Finds article and section references, named legal instruments, a coarse
//! document type and counts of key data-protection terms. The scalar summary
//! is attached to every chunk of the document.

use crate::chunk::{ChunkMetadata, MetadataValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(article|section|pasal)\s+(\d+)").unwrap());

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(gdpr|uu\s+pdp|regulation|directive)\b(\s+(?:\(eu\)\s+)?\d+(?:[/\-]\d+)*)?").unwrap()
});

static GDPR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgdpr\b|general data protection regulation").unwrap());

static PDP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\buu\s+pdp\b|undang.*undang.*perlindungan.*data").unwrap());

static COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(company|corporate|internal|policy)\b").unwrap());

const KEY_TERMS: &[&str] = &[
    "personal data",
    "privacy",
    "consent",
    "processing",
    "controller",
    "processor",
];

/// Most article references kept in the chunk summary.
const MAX_LISTED_ARTICLES: usize = 20;

/// Coarse classification of a legal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Gdpr,
    UuPdp,
    CompanyPolicy,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Gdpr => "GDPR",
            DocumentType::UuPdp => "UU PDP",
            DocumentType::CompanyPolicy => "Company Policy",
        }
    }
}

/// Metadata extracted from one document's text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegalMetadata {
    /// Article/section references in order of first appearance, e.g. "Article 17"
    pub articles: Vec<String>,

    /// Distinct named instruments, e.g. "GDPR", "Directive 95/46"
    pub legal_references: Vec<String>,

    pub document_type: Option<DocumentType>,

    /// Case-insensitive occurrence counts of key terms that appear at least once
    pub key_terms: BTreeMap<String, usize>,
}

impl LegalMetadata {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
            && self.legal_references.is_empty()
            && self.document_type.is_none()
            && self.key_terms.is_empty()
    }

    /// Flatten into scalar chunk metadata.
    pub fn to_chunk_metadata(&self) -> ChunkMetadata {
        let mut metadata = ChunkMetadata::new();

        if !self.articles.is_empty() {
            let listed: Vec<&str> = self
                .articles
                .iter()
                .take(MAX_LISTED_ARTICLES)
                .map(String::as_str)
                .collect();
            metadata.insert("articles".to_string(), listed.join(", ").into());
        }
        if !self.legal_references.is_empty() {
            metadata.insert(
                "legal_references".to_string(),
                self.legal_references.join(", ").into(),
            );
        }
        if let Some(doc_type) = self.document_type {
            metadata.insert("document_type".to_string(), doc_type.as_str().into());
        }
        if !self.key_terms.is_empty() {
            let summary: Vec<String> = self
                .key_terms
                .iter()
                .map(|(term, count)| format!("{}={}", term, count))
                .collect();
            metadata.insert("key_terms".to_string(), MetadataValue::Str(summary.join(", ")));
        }

        metadata
    }
}

/// Extract legal metadata from document text.
pub fn extract_legal_metadata(text: &str) -> LegalMetadata {
    let mut articles: Vec<String> = Vec::new();
    for caps in ARTICLE_RE.captures_iter(text) {
        let reference = format!("{} {}", capitalize(&caps[1]), &caps[2]);
        if !articles.contains(&reference) {
            articles.push(reference);
        }
    }

    let mut legal_references: Vec<String> = Vec::new();
    for m in REFERENCE_RE.find_iter(text) {
        let reference = m.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        if !legal_references.contains(&reference) {
            legal_references.push(reference);
        }
    }

    let document_type = if GDPR_RE.is_match(text) {
        Some(DocumentType::Gdpr)
    } else if PDP_RE.is_match(text) {
        Some(DocumentType::UuPdp)
    } else if COMPANY_RE.is_match(text) {
        Some(DocumentType::CompanyPolicy)
    } else {
        None
    };

    let lower = text.to_lowercase();
    let key_terms = KEY_TERMS
        .iter()
        .map(|term| (term.to_string(), lower.matches(term).count()))
        .filter(|(_, count)| *count > 0)
        .collect();

    LegalMetadata {
        articles,
        legal_references,
        document_type,
        key_terms,
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
