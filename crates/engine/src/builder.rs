//! Engine construction from configuration.

use crate::completion::Completer;
use crate::engine::QaEngine;
use crate::relevance::RelevanceGate;
use crate::selector::SourceSelector;
use crate::synthesis::AnswerSynthesizer;
use lexguide_core::config::{EngineSettings, LlmSettings};
use lexguide_core::{AppConfig, AppError, AppResult};
use lexguide_knowledge::{
    create_provider, ingest_corpus, ChunkConfig, Chunker, CorpusSource, InMemoryStore,
    IngestStats, RetrievalSource, SearchDepth, SourceRegistry, TavilyClient, WebSearchSource,
};
use lexguide_llm::{create_client, LlmClient};
use lexguide_prompt::PromptSet;
use std::sync::Arc;
use std::time::Duration;

/// Assembles a `QaEngine` from a completion client and a source registry.
pub struct EngineBuilder {
    client: Arc<dyn LlmClient>,
    registry: SourceRegistry,
    llm: LlmSettings,
    engine: EngineSettings,
    prompts: PromptSet,
    ingest_stats: Vec<IngestStats>,
}

impl EngineBuilder {
    pub fn new(client: Arc<dyn LlmClient>, registry: SourceRegistry) -> Self {
        Self {
            client,
            registry,
            llm: LlmSettings::default(),
            engine: EngineSettings::default(),
            prompts: PromptSet::builtin(),
            ingest_stats: Vec::new(),
        }
    }

    pub fn llm_settings(mut self, settings: LlmSettings) -> Self {
        self.llm = settings;
        self
    }

    pub fn engine_settings(mut self, settings: EngineSettings) -> Self {
        self.engine = settings;
        self
    }

    pub fn prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn ingest_stats(mut self, stats: Vec<IngestStats>) -> Self {
        self.ingest_stats = stats;
        self
    }

    pub fn build(self) -> AppResult<QaEngine> {
        if self.registry.is_empty() {
            return Err(AppError::Config(
                "No retrieval sources registered".to_string(),
            ));
        }

        let completer = Completer::new(self.client, &self.llm);
        let classifier_timeout = Duration::from_secs(self.engine.classifier_timeout_secs);
        let synthesis_timeout = Duration::from_secs(self.engine.synthesis_timeout_secs);

        let selector = SourceSelector::new(
            completer.clone(),
            self.prompts.select,
            classifier_timeout,
            self.engine.recency_terms.clone(),
        );
        let gate = RelevanceGate::new(
            completer.clone(),
            self.prompts.relevance,
            classifier_timeout,
            self.engine.relevance_prefix_chars,
        );
        let synthesizer = AnswerSynthesizer::new(
            completer,
            self.prompts.synthesize,
            self.prompts.general,
            synthesis_timeout,
        );

        tracing::info!(
            "Engine ready with sources {:?} (max attempts: {})",
            self.registry,
            self.engine.max_attempts
        );

        Ok(QaEngine::new(
            self.registry,
            selector,
            gate,
            synthesizer,
            self.engine,
            self.ingest_stats,
        ))
    }

    /// Build a ready engine: completion client, prompts, ingested corpora and
    /// the web-search source when a search key is configured.
    pub async fn from_config(config: &AppConfig) -> AppResult<QaEngine> {
        config.validate()?;

        let api_key = config.resolve_api_key();
        let client = create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            api_key.as_deref(),
            Duration::from_secs(config.engine.synthesis_timeout_secs),
        )?;

        let prompts = PromptSet::load(&config.workspace)?;

        let (corpora, stats) = load_corpora(config).await?;
        let mut registry = SourceRegistry::new();
        for corpus in corpora {
            registry.register(corpus)?;
        }

        if let Some(web) = web_source(config)? {
            registry.register(web)?;
        }

        EngineBuilder::new(client, registry)
            .llm_settings(config.llm.clone())
            .engine_settings(config.engine.clone())
            .prompts(prompts)
            .ingest_stats(stats)
            .build()
    }
}

/// Ingest every configured corpus into its own in-memory store.
///
/// A corpus whose directory cannot be ingested is still returned, empty, so
/// selection keeps seeing it.
pub async fn load_corpora(
    config: &AppConfig,
) -> AppResult<(Vec<Arc<dyn RetrievalSource>>, Vec<IngestStats>)> {
    let embedder = create_provider(&config.embedding)?;
    let chunker = Chunker::new(ChunkConfig::from(&config.chunking));

    let mut sources: Vec<Arc<dyn RetrievalSource>> = Vec::new();
    let mut stats = Vec::new();

    for corpus in &config.corpora {
        let store = Arc::new(InMemoryStore::new(embedder.clone()));
        let dir = config.corpus_dir(corpus);

        match ingest_corpus(&corpus.id, &dir, &chunker, store.as_ref()).await {
            Ok(corpus_stats) => stats.push(corpus_stats),
            Err(e) => tracing::warn!("Corpus '{}' starts empty: {}", corpus.id, e),
        }

        let source = CorpusSource::new(corpus, &config.retrieval, store)?;
        sources.push(Arc::new(source));
    }

    Ok((sources, stats))
}

/// The web-search source, or `None` when disabled or no key is set.
pub fn web_source(config: &AppConfig) -> AppResult<Option<Arc<dyn RetrievalSource>>> {
    let settings = &config.web_search;
    if !settings.enabled {
        tracing::debug!("Web search disabled");
        return Ok(None);
    }

    let Some(api_key) = config.resolve_search_key() else {
        tracing::warn!(
            "{} is not set; web search fallback unavailable",
            settings.api_key_env
        );
        return Ok(None);
    };

    let depth: SearchDepth = settings.depth.parse()?;
    let backend = TavilyClient::from_settings(settings, &api_key)?;

    Ok(Some(Arc::new(WebSearchSource::new(
        Arc::new(backend),
        depth,
        settings.max_results,
        Duration::from_secs(settings.timeout_secs),
    ))))
}
