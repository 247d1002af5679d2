//! Corpus file parsing and text extraction.

use lexguide_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Document formats accepted for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    PlainText,
    Csv,
}

impl DocumentFormat {
    /// Detect format from file extension; `None` for unsupported files.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "txt" => Some(Self::PlainText),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::PlainText => "text",
            Self::Csv => "csv",
        }
    }
}

/// Read a corpus file and return its text, cleaned for chunking.
pub fn parse_file(path: &Path) -> AppResult<String> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        AppError::Knowledge(format!("Unsupported document type: {:?}", path))
    })?;

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    if raw.contains('\0') {
        return Err(AppError::Knowledge(format!(
            "Binary content not supported: {:?}",
            path
        )));
    }

    let cleaned = match format {
        DocumentFormat::Markdown => clean_markdown(&raw),
        DocumentFormat::PlainText | DocumentFormat::Csv => raw,
    };

    Ok(cleaned)
}

/// Strip markdown syntax that carries no legal content.
///
/// Heading markers, fences and horizontal rules go; blank lines stay so
/// paragraph boundaries reach the chunker.
fn clean_markdown(text: &str) -> String {
    let mut lines = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```")
            || trimmed.starts_with("~~~")
            || (trimmed.len() >= 3 && trimmed.chars().all(|c| matches!(c, '-' | '*' | '_')))
        {
            continue;
        }

        let content = trimmed.trim_start_matches('#').trim();
        let content = content.trim_start_matches("> ").trim_start_matches('>');
        lines.push(content.to_string());
    }

    lines.join("\n").trim().to_string()
}
