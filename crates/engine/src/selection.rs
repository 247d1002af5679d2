//! Source selections and the strict parser for selector output.

use lexguide_knowledge::{SourceId, SourceRegistry};
use serde::Serialize;
use std::fmt;

/// An ordered set of distinct, registered source ids. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSelection(Vec<SourceId>);

impl SourceSelection {
    /// Build a selection, dropping duplicates in order. `None` when empty.
    pub fn new(ids: impl IntoIterator<Item = SourceId>) -> Option<Self> {
        let mut selected: Vec<SourceId> = Vec::new();
        for id in ids {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
        if selected.is_empty() {
            None
        } else {
            Some(Self(selected))
        }
    }

    pub fn ids(&self) -> &[SourceId] {
        &self.0
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.0.contains(id)
    }

    pub fn includes_web(&self) -> bool {
        self.0.iter().any(|id| id.is_web())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.0.iter().map(|id| id.as_str()).collect();
        write!(f, "[{}]", ids.join(", "))
    }
}

/// Parse selector output of the form `['gdpr', "pdp", web]`.
///
/// The trimmed output must be exactly one bracketed list. Items may be single-
/// or double-quoted or bare identifiers. Any malformed item rejects the whole
/// output. Unknown ids are skipped; `None` when nothing known remains.
pub fn parse_selection(output: &str, registry: &SourceRegistry) -> Option<SourceSelection> {
    let items = parse_list(output)?;

    let known = items.into_iter().filter_map(|item| {
        let id = item.to_lowercase();
        match registry.find(&id) {
            Some(source) => Some(source.id().clone()),
            None => {
                tracing::debug!("Selector named unknown source '{}'", item);
                None
            }
        }
    });

    SourceSelection::new(known)
}

fn parse_list(output: &str) -> Option<Vec<String>> {
    let inner = output.trim().strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }

    inner.split(',').map(|item| parse_item(item.trim())).collect()
}

fn parse_item(item: &str) -> Option<String> {
    let unquoted = ['\'', '"'].iter().find_map(|&quote| {
        item.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    });

    let value = match unquoted {
        Some(value) => value,
        None if item.starts_with(['\'', '"']) || item.ends_with(['\'', '"']) => return None,
        None => item,
    };

    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    valid.then(|| value.to_string())
}
