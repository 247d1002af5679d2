//! Retrieval coordination across the selected sources.

use crate::selection::SourceSelection;
use futures::future::join_all;
use lexguide_knowledge::{SourceId, SourceRegistry};
use serde::Serialize;

/// Non-empty text gathered per source, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievedContent {
    entries: Vec<(SourceId, String)>,
}

impl RetrievedContent {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the web source is the only contributor.
    pub fn is_web_only(&self) -> bool {
        matches!(self.entries.as_slice(), [(id, _)] if id.is_web())
    }

    pub fn get(&self, id: &SourceId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(source, _)| source == id)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &str)> {
        self.entries.iter().map(|(id, text)| (id, text.as_str()))
    }

    pub fn sources(&self) -> Vec<&SourceId> {
        self.entries.iter().map(|(id, _)| id).collect()
    }

    fn push(&mut self, id: SourceId, text: String) {
        self.entries.push((id, text));
    }
}

impl FromIterator<(SourceId, String)> for RetrievedContent {
    fn from_iter<I: IntoIterator<Item = (SourceId, String)>>(iter: I) -> Self {
        let mut content = Self::default();
        for (id, text) in iter {
            content.push(id, text);
        }
        content
    }
}

/// Call every selected source and keep the ones that returned text.
///
/// Selected sources are queried concurrently; results keep selection order.
/// When nothing comes back and the web source was not selected, the web
/// source is tried once on its own.
pub async fn gather(
    question: &str,
    selection: &SourceSelection,
    registry: &SourceRegistry,
) -> RetrievedContent {
    let sources: Vec<_> = selection
        .ids()
        .iter()
        .filter_map(|id| match registry.get(id) {
            Some(source) => Some(source.clone()),
            None => {
                tracing::warn!("Source '{}' is not registered", id);
                None
            }
        })
        .collect();

    let results = join_all(sources.iter().map(|source| source.retrieve(question))).await;

    let mut content = RetrievedContent::default();
    for (source, result) in sources.iter().zip(results) {
        match result {
            Some(text) if !text.trim().is_empty() => {
                tracing::debug!("Retrieved {} chars from '{}'", text.len(), source.id());
                content.push(source.id().clone(), text);
            }
            _ => tracing::debug!("No content from '{}'", source.id()),
        }
    }

    if content.is_empty() && !selection.includes_web() {
        if let Some(web) = registry.web() {
            tracing::info!("No document content found, falling back to web search");
            match web.retrieve(question).await {
                Some(text) if !text.trim().is_empty() => {
                    tracing::debug!("Retrieved {} chars from '{}'", text.len(), web.id());
                    content.push(web.id().clone(), text);
                }
                _ => tracing::debug!("No content from fallback web search"),
            }
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{registry_with, CannedSource};
    use std::sync::Arc;

    fn select(ids: &[&str]) -> SourceSelection {
        SourceSelection::new(ids.iter().map(|id| SourceId::new(*id).unwrap())).unwrap()
    }

    #[tokio::test]
    async fn test_keeps_only_non_empty_results_in_order() {
        let gdpr = Arc::new(CannedSource::corpus("gdpr", &[], Some("Article 17 text")));
        let pdp = Arc::new(CannedSource::corpus("pdp", &[], Some("   ")));
        let company = Arc::new(CannedSource::corpus("company", &[], Some("Retention policy")));
        let web = Arc::new(CannedSource::web(Some("web text")));
        let registry = registry_with(vec![gdpr.clone(), pdp.clone(), company.clone(), web.clone()]);

        let content = gather("q", &select(&["company", "pdp", "gdpr"]), &registry).await;

        let ids: Vec<&str> = content.sources().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["company", "gdpr"]);
        assert_eq!(content.get(&SourceId::new("gdpr").unwrap()), Some("Article 17 text"));
        assert_eq!(web.calls(), 0);
        assert_eq!(pdp.calls(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_web_once() {
        let gdpr = Arc::new(CannedSource::corpus("gdpr", &[], None));
        let web = Arc::new(CannedSource::web(Some("**Result**\nweb text")));
        let registry = registry_with(vec![gdpr.clone(), web.clone()]);

        let content = gather("q", &select(&["gdpr"]), &registry).await;

        assert!(content.is_web_only());
        assert_eq!(web.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_second_web_call_when_web_selected() {
        let gdpr = Arc::new(CannedSource::corpus("gdpr", &[], None));
        let web = Arc::new(CannedSource::web(None));
        let registry = registry_with(vec![gdpr, web.clone()]);

        let content = gather("q", &select(&["gdpr", "web"]), &registry).await;

        assert!(content.is_empty());
        assert_eq!(web.calls(), 1);
    }

    #[tokio::test]
    async fn test_web_with_documents_is_not_web_only() {
        let gdpr = Arc::new(CannedSource::corpus("gdpr", &[], Some("doc")));
        let web = Arc::new(CannedSource::web(Some("web")));
        let registry = registry_with(vec![gdpr, web]);

        let content = gather("q", &select(&["gdpr", "web"]), &registry).await;

        assert_eq!(content.len(), 2);
        assert!(!content.is_web_only());
    }
}
