//! Retrieval sources: the uniform `retrieve(query)` capability over corpora
//! and web search, plus the registry the engine selects from.

use crate::store::RetrievalBackend;
use crate::web::{SearchDepth, WebHit, WebSearchBackend, WebSearchError};
use async_trait::async_trait;
use lexguide_core::config::{CorpusSettings, RetrievalSettings};
use lexguide_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Identifier reserved for the web-search source.
pub const WEB_SOURCE_ID: &str = "web";

const WEB_DESCRIPTION: &str =
    "Web search for recent legal developments and information not found in the documents";

const NO_WEB_RESULTS: &str = "No relevant web search results found.";

/// A validated source identifier: lowercase ASCII letters, digits, `_` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> AppResult<Self> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::Config(format!(
                "Invalid source id '{}': use lowercase letters, digits, '_' or '-'",
                id
            )));
        }
        Ok(Self(id))
    }

    /// The web-search source id.
    pub fn web() -> Self {
        Self(WEB_SOURCE_ID.to_string())
    }

    pub fn is_web(&self) -> bool {
        self.0 == WEB_SOURCE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercased form used to label prompt blocks.
    pub fn label(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SourceId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SourceId::new(value)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

/// What a source searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Corpus,
    Web,
}

/// A retrieval source callable with a query.
///
/// `retrieve` never fails: backend errors are logged and become `None`
/// (corpora) or a descriptive string (web).
#[async_trait]
pub trait RetrievalSource: Send + Sync {
    fn id(&self) -> &SourceId;

    fn kind(&self) -> SourceKind;

    /// One-line description shown to the source selector.
    fn description(&self) -> &str;

    /// Lowercase terms that select this source in keyword fallback.
    fn triggers(&self) -> &[String];

    async fn retrieve(&self, query: &str) -> Option<String>;
}

/// A document corpus searched through a `RetrievalBackend`.
pub struct CorpusSource {
    id: SourceId,
    description: String,
    triggers: Vec<String>,
    backend: Arc<dyn RetrievalBackend>,
    k: usize,
    score_threshold: f32,
    timeout: Duration,
}

impl CorpusSource {
    pub fn new(
        corpus: &CorpusSettings,
        retrieval: &RetrievalSettings,
        backend: Arc<dyn RetrievalBackend>,
    ) -> AppResult<Self> {
        let id = SourceId::new(corpus.id.clone())?;
        if id.is_web() {
            return Err(AppError::Config(format!(
                "Corpus id '{}' is reserved for web search",
                WEB_SOURCE_ID
            )));
        }

        Ok(Self {
            id,
            description: corpus.description.clone(),
            triggers: corpus.triggers.iter().map(|t| t.to_lowercase()).collect(),
            backend,
            k: retrieval.k,
            score_threshold: retrieval.score_threshold,
            timeout: Duration::from_secs(retrieval.timeout_secs),
        })
    }

    pub fn backend(&self) -> &Arc<dyn RetrievalBackend> {
        &self.backend
    }
}

#[async_trait]
impl RetrievalSource for CorpusSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Corpus
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn triggers(&self) -> &[String] {
        &self.triggers
    }

    async fn retrieve(&self, query: &str) -> Option<String> {
        let search = self
            .backend
            .similarity_search(query, self.k, self.score_threshold);

        let hits = match tokio::time::timeout(self.timeout, search).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                tracing::error!("Retrieval from '{}' failed: {}", self.id, e);
                return None;
            }
            Err(_) => {
                tracing::error!(
                    "Retrieval from '{}' timed out after {}s",
                    self.id,
                    self.timeout.as_secs()
                );
                return None;
            }
        };

        let blocks: Vec<String> = hits
            .iter()
            .filter_map(|hit| {
                let text = hit.chunk.text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(match hit.chunk.filename() {
                    Some(name) if !name.is_empty() => format!("[Source: {}] {}", name, text),
                    _ => text.to_string(),
                })
            })
            .collect();

        tracing::debug!("Retrieved {} chunks from '{}'", blocks.len(), self.id);

        let joined = blocks.join("\n\n");
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// Web search, the fallback when no corpus has content.
pub struct WebSearchSource {
    id: SourceId,
    backend: Arc<dyn WebSearchBackend>,
    depth: SearchDepth,
    max_results: usize,
    timeout: Duration,
}

impl WebSearchSource {
    pub fn new(
        backend: Arc<dyn WebSearchBackend>,
        depth: SearchDepth,
        max_results: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            id: SourceId::web(),
            backend,
            depth,
            max_results,
            timeout,
        }
    }
}

#[async_trait]
impl RetrievalSource for WebSearchSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Web
    }

    fn description(&self) -> &str {
        WEB_DESCRIPTION
    }

    fn triggers(&self) -> &[String] {
        &[]
    }

    async fn retrieve(&self, query: &str) -> Option<String> {
        let search = self.backend.search(query, self.depth, self.max_results);

        let outcome = match tokio::time::timeout(self.timeout, search).await {
            Ok(result) => result,
            Err(_) => Err(WebSearchError::Timeout),
        };

        match outcome {
            Ok(hits) => {
                tracing::debug!("Web search returned {} results", hits.len());
                Some(format_web_results(&hits))
            }
            Err(e) => {
                tracing::error!("Web search failed: {:?}", e);
                Some(e.to_string())
            }
        }
    }
}

/// Render web hits as titled blocks separated by blank lines.
pub fn format_web_results(hits: &[WebHit]) -> String {
    if hits.is_empty() {
        return NO_WEB_RESULTS.to_string();
    }

    hits.iter()
        .map(|hit| {
            let mut block = format!("**{}**\n{}", hit.title, hit.content);
            if !hit.url.is_empty() {
                block.push_str(&format!("\n[Source: {}]", hit.url));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Registered sources in registration order.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn RetrievalSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. Ids must be unique.
    pub fn register(&mut self, source: Arc<dyn RetrievalSource>) -> AppResult<()> {
        if self.contains(source.id()) {
            return Err(AppError::Config(format!(
                "Source '{}' is already registered",
                source.id()
            )));
        }
        tracing::debug!("Registered {:?} source '{}'", source.kind(), source.id());
        self.sources.push(source);
        Ok(())
    }

    pub fn get(&self, id: &SourceId) -> Option<&Arc<dyn RetrievalSource>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    /// Look up by raw identifier text.
    pub fn find(&self, id: &str) -> Option<&Arc<dyn RetrievalSource>> {
        self.sources.iter().find(|s| s.id().as_str() == id)
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RetrievalSource>> {
        self.sources.iter()
    }

    pub fn ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|s| s.id().clone()).collect()
    }

    pub fn document_sources(&self) -> impl Iterator<Item = &Arc<dyn RetrievalSource>> {
        self.sources.iter().filter(|s| s.kind() == SourceKind::Corpus)
    }

    pub fn web(&self) -> Option<&Arc<dyn RetrievalSource>> {
        self.sources.iter().find(|s| s.kind() == SourceKind::Web)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Bullet list of `'id': description` lines for the selector prompt.
    pub fn describe(&self) -> String {
        self.sources
            .iter()
            .map(|s| format!("- '{}': {}", s.id(), s.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|s| s.id().as_str()))
            .finish()
    }
}

/// Result of calling one source with a test query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub source: String,
    pub has_result: bool,
    pub result_length: usize,
}

/// Call a source once and report whether it produced text.
pub async fn probe(source: &dyn RetrievalSource, query: &str) -> ProbeReport {
    let result = source.retrieve(query).await;
    ProbeReport {
        source: source.id().to_string(),
        has_result: result.is_some(),
        result_length: result.map(|r| r.chars().count()).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Chunk, ChunkMetadata, FILENAME_KEY};
    use crate::embeddings::MockProvider;
    use crate::store::{BackendStats, InMemoryStore, ScoredChunk};

    struct FailingBackend;

    #[async_trait]
    impl RetrievalBackend for FailingBackend {
        async fn similarity_search(&self, _: &str, _: usize, _: f32) -> AppResult<Vec<ScoredChunk>> {
            Err(AppError::Knowledge("index unavailable".to_string()))
        }

        async fn add_chunks(&self, _: Vec<Chunk>) -> AppResult<usize> {
            Ok(0)
        }

        async fn stats(&self) -> AppResult<BackendStats> {
            Ok(BackendStats::default())
        }
    }

    struct CannedWeb(Result<Vec<WebHit>, WebSearchError>);

    #[async_trait]
    impl WebSearchBackend for CannedWeb {
        async fn search(&self, _: &str, _: SearchDepth, _: usize) -> Result<Vec<WebHit>, WebSearchError> {
            self.0.clone()
        }
    }

    struct SlowWeb;

    #[async_trait]
    impl WebSearchBackend for SlowWeb {
        async fn search(&self, _: &str, _: SearchDepth, _: usize) -> Result<Vec<WebHit>, WebSearchError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    fn corpus(id: &str) -> CorpusSettings {
        CorpusSettings {
            id: id.to_string(),
            description: format!("{} documents", id),
            path: id.into(),
            triggers: vec!["GDPR".to_string()],
        }
    }

    fn retrieval(threshold: f32) -> RetrievalSettings {
        RetrievalSettings {
            k: 3,
            score_threshold: threshold,
            timeout_secs: 10,
        }
    }

    fn hit(title: &str, url: &str) -> WebHit {
        WebHit {
            title: title.to_string(),
            content: format!("{} content", title),
            url: url.to_string(),
        }
    }

    fn web_source(backend: impl WebSearchBackend + 'static) -> WebSearchSource {
        WebSearchSource::new(
            Arc::new(backend),
            SearchDepth::Advanced,
            3,
            Duration::from_millis(100),
        )
    }

    #[test]
    fn test_source_id_validation() {
        assert!(SourceId::new("gdpr").is_ok());
        assert!(SourceId::new("company_2").is_ok());
        assert!(SourceId::new("").is_err());
        assert!(SourceId::new("GDPR").is_err());
        assert!(SourceId::new("uu pdp").is_err());
        assert_eq!(SourceId::new("pdp").unwrap().label(), "PDP");
        assert!(SourceId::web().is_web());
    }

    #[test]
    fn test_web_id_reserved_for_corpora() {
        let store = Arc::new(InMemoryStore::new(Arc::new(MockProvider::new(8))));
        assert!(CorpusSource::new(&corpus("web"), &retrieval(0.7), store).is_err());
    }

    #[tokio::test]
    async fn test_corpus_source_prefixes_filenames() {
        let store = Arc::new(InMemoryStore::new(Arc::new(MockProvider::new(384))));
        let mut metadata = ChunkMetadata::new();
        metadata.insert(FILENAME_KEY.to_string(), "gdpr_art17.txt".into());
        store
            .add_chunks(vec![
                Chunk::new("Right to erasure applies.".to_string(), metadata),
                Chunk::new("Right to erasure exceptions.".to_string(), ChunkMetadata::new()),
            ])
            .await
            .unwrap();

        let source = CorpusSource::new(&corpus("gdpr"), &retrieval(0.0), store).unwrap();
        assert_eq!(source.triggers(), &["gdpr".to_string()]);

        let text = source.retrieve("Right to erasure applies").await.unwrap();
        let blocks: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "[Source: gdpr_art17.txt] Right to erasure applies.");
        assert_eq!(blocks[1], "Right to erasure exceptions.");
    }

    #[tokio::test]
    async fn test_corpus_source_nothing_above_threshold() {
        let store = Arc::new(InMemoryStore::new(Arc::new(MockProvider::new(384))));
        store
            .add_chunks(vec![Chunk::new("Office parking rules".to_string(), ChunkMetadata::new())])
            .await
            .unwrap();

        let source = CorpusSource::new(&corpus("company"), &retrieval(0.7), store).unwrap();
        assert_eq!(source.retrieve("lawful basis for processing").await, None);
    }

    #[tokio::test]
    async fn test_corpus_source_swallows_backend_errors() {
        let source =
            CorpusSource::new(&corpus("gdpr"), &retrieval(0.7), Arc::new(FailingBackend)).unwrap();
        assert_eq!(source.retrieve("anything").await, None);
    }

    #[tokio::test]
    async fn test_web_source_formats_results() {
        let source = web_source(CannedWeb(Ok(vec![
            hit("EDPB guidance", "https://edpb.europa.eu/x"),
            hit("Blog", ""),
        ])));

        let text = source.retrieve("latest EDPB guidance").await.unwrap();
        assert_eq!(
            text,
            "**EDPB guidance**\nEDPB guidance content\n[Source: https://edpb.europa.eu/x]\n\n**Blog**\nBlog content"
        );
    }

    #[tokio::test]
    async fn test_web_source_failure_strings() {
        let empty = web_source(CannedWeb(Ok(Vec::new())));
        assert_eq!(
            empty.retrieve("q").await.as_deref(),
            Some("No relevant web search results found.")
        );

        let status = web_source(CannedWeb(Err(WebSearchError::Status(502))));
        assert_eq!(
            status.retrieve("q").await.as_deref(),
            Some("Web search failed with status 502")
        );

        let slow = web_source(SlowWeb);
        assert_eq!(
            slow.retrieve("q").await.as_deref(),
            Some("Web search timed out. Please try again.")
        );
    }

    #[tokio::test]
    async fn test_registry_order_and_lookup() {
        let store: Arc<dyn RetrievalBackend> =
            Arc::new(InMemoryStore::new(Arc::new(MockProvider::new(8))));
        let mut registry = SourceRegistry::new();
        for id in ["gdpr", "pdp", "company"] {
            let source = CorpusSource::new(&corpus(id), &retrieval(0.7), store.clone()).unwrap();
            registry.register(Arc::new(source)).unwrap();
        }
        registry
            .register(Arc::new(web_source(CannedWeb(Ok(Vec::new())))))
            .unwrap();

        let ids: Vec<String> = registry.ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["gdpr", "pdp", "company", "web"]);
        assert_eq!(registry.document_sources().count(), 3);
        assert_eq!(registry.web().unwrap().id().as_str(), "web");
        assert!(registry.find("pdp").is_some());
        assert!(registry.describe().starts_with("- 'gdpr': gdpr documents"));

        let duplicate = CorpusSource::new(&corpus("gdpr"), &retrieval(0.7), store).unwrap();
        assert!(registry.register(Arc::new(duplicate)).is_err());
    }

    #[tokio::test]
    async fn test_probe_reports_length() {
        let source = web_source(CannedWeb(Ok(Vec::new())));
        let report = probe(&source, "test").await;
        assert_eq!(report.source, "web");
        assert!(report.has_result);
        assert_eq!(report.result_length, NO_WEB_RESULTS.len());
    }
}
