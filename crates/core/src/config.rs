//! Configuration management for Lexguide.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`.lexguide/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. Every section of the YAML file is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".lexguide";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .lexguide/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// API key for the completion provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub web_search: WebSearchSettings,
    pub engine: EngineSettings,
    pub corpora: Vec<CorpusSettings>,
}

/// Text-completion backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    /// Provider identifier ("ollama" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom endpoint; provider default when absent
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Sampling temperature; kept low for consistent legal answers
    pub temperature: f32,

    /// Maximum tokens per completion
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key_env: None,
            temperature: 0.1,
            max_tokens: 2000,
        }
    }
}

/// Embedding provider settings used by the in-memory corpora.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// Provider identifier ("mock" or "ollama")
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Chunker size bounds, in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkingSettings {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            max_chunk_size: 1500,
            min_chunk_size: 100,
        }
    }
}

/// Document corpus retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalSettings {
    /// Number of chunks requested per similarity search
    pub k: usize,

    /// Minimum cosine similarity for a chunk to count as a hit
    pub score_threshold: f32,

    pub timeout_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            k: 3,
            score_threshold: 0.7,
            timeout_secs: 10,
        }
    }
}

/// Web-search fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebSearchSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key_env: String,
    pub max_results: usize,
    /// "basic" or "advanced"
    pub depth: String,
    pub timeout_secs: u64,
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.tavily.com/search".to_string(),
            api_key_env: "TAVILY_API_KEY".to_string(),
            max_results: 3,
            depth: "advanced".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Clarification requests issued before a general-knowledge answer
    pub max_attempts: u32,

    /// Prior exchanges replayed to the synthesizer
    pub history_exchanges: usize,

    /// Exchanges retained by conversation memory
    pub memory_capacity: usize,

    /// Distinct question keys retained by the escalation tracker
    pub tracker_capacity: usize,

    /// Characters of web content shown to the relevance check
    pub relevance_prefix_chars: usize,

    /// Budget for source selection and relevance checks
    pub classifier_timeout_secs: u64,

    /// Budget for synthesis and general-knowledge answers
    pub synthesis_timeout_secs: u64,

    /// Terms that pull the web-search source into a keyword selection
    pub recency_terms: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            history_exchanges: 3,
            memory_capacity: 50,
            tracker_capacity: 256,
            relevance_prefix_chars: 1000,
            classifier_timeout_secs: 10,
            synthesis_timeout_secs: 60,
            recency_terms: ["recent", "latest", "newest", "news"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// One document corpus backing a retrieval source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSettings {
    /// Source identifier (lowercase, e.g. "gdpr")
    pub id: String,

    /// Description shown to the source selector
    pub description: String,

    /// Directory holding the corpus documents, relative to the workspace
    pub path: PathBuf,

    /// Lowercase trigger terms for keyword selection
    #[serde(default)]
    pub triggers: Vec<String>,
}

impl CorpusSettings {
    fn new(id: &str, description: &str, path: &str, triggers: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            path: PathBuf::from(path),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// The three legal corpora shipped by default.
pub fn default_corpora() -> Vec<CorpusSettings> {
    vec![
        CorpusSettings::new(
            "gdpr",
            "GDPR (General Data Protection Regulation), European data protection law, data subject rights",
            "data/gdpr",
            &["gdpr", "general data protection", "european", "eu data"],
        ),
        CorpusSettings::new(
            "pdp",
            "UU PDP (Indonesian Personal Data Protection Law) and Indonesia-specific compliance",
            "data/uupdp",
            &["uu pdp", "indonesia", "indonesian data protection", "undang-undang"],
        ),
        CorpusSettings::new(
            "company",
            "Internal company data protection policies, procedures and handling guidelines",
            "data/company",
            &["company", "internal", "organizational", "corporate policy"],
        ),
    ]
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    chunking: Option<ChunkingSettings>,
    retrieval: Option<RetrievalSettings>,
    web_search: Option<WebSearchSettings>,
    engine: Option<EngineSettings>,
    corpora: Option<Vec<CorpusSettings>>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            chunking: ChunkingSettings::default(),
            retrieval: RetrievalSettings::default(),
            web_search: WebSearchSettings::default(),
            engine: EngineSettings::default(),
            corpora: default_corpora(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `LEXGUIDE_WORKSPACE`: Override workspace path
    /// - `LEXGUIDE_CONFIG`: Path to config file
    /// - `LEXGUIDE_PROVIDER`: Completion provider
    /// - `LEXGUIDE_MODEL`: Model identifier
    /// - `LEXGUIDE_ENDPOINT`: Completion endpoint
    /// - `LEXGUIDE_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use lexguide_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like `load`, with an explicit workspace and config file taking
    /// precedence over `LEXGUIDE_WORKSPACE` and `LEXGUIDE_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("LEXGUIDE_WORKSPACE").ok().map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("LEXGUIDE_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        match config.config_file.clone() {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
            }
            None => {
                let default_path = config.state_dir().join("config.yaml");
                if default_path.exists() {
                    config = config.merge_yaml(&default_path)?;
                }
            }
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("LEXGUIDE_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("LEXGUIDE_MODEL") {
            config.llm.model = model;
        }

        if let Ok(endpoint) = std::env::var("LEXGUIDE_ENDPOINT") {
            config.llm.endpoint = Some(endpoint);
        }

        config.api_key = std::env::var("LEXGUIDE_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merge_file(config_file))
    }

    fn merge_file(&self, file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(path) = file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = file.embedding {
            result.embedding = embedding;
        }
        if let Some(chunking) = file.chunking {
            result.chunking = chunking;
        }
        if let Some(retrieval) = file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(web_search) = file.web_search {
            result.web_search = web_search;
        }
        if let Some(engine) = file.engine {
            result.engine = engine;
        }
        if let Some(corpora) = file.corpora {
            result.corpora = corpora;
        }

        result
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and environment.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .lexguide directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(STATE_DIR)
    }

    /// Resolve a corpus directory against the workspace.
    pub fn corpus_dir(&self, corpus: &CorpusSettings) -> PathBuf {
        if corpus.path.is_absolute() {
            corpus.path.clone()
        } else {
            self.workspace.join(&corpus.path)
        }
    }

    /// Resolve the completion API key: explicit key first, then `apiKeyEnv`.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        self.llm
            .api_key_env
            .as_ref()
            .and_then(|env_var| std::env::var(env_var).ok())
    }

    /// Resolve the web-search API key from its environment variable.
    pub fn resolve_search_key(&self) -> Option<String> {
        std::env::var(&self.web_search.api_key_env).ok()
    }

    /// Validate the configuration before wiring the engine.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "openai"];
        if !known_providers.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                known_providers.join(", ")
            )));
        }

        if self.llm.provider == "openai" && self.resolve_api_key().is_none() {
            return Err(AppError::Config(
                "The openai provider requires an API key (LEXGUIDE_API_KEY or llm.apiKeyEnv)"
                    .to_string(),
            ));
        }

        if self.chunking.min_chunk_size == 0
            || self.chunking.min_chunk_size > self.chunking.max_chunk_size
        {
            return Err(AppError::Config(format!(
                "Invalid chunk bounds: min {} / max {}",
                self.chunking.min_chunk_size, self.chunking.max_chunk_size
            )));
        }

        if !(0.0..=1.0).contains(&self.retrieval.score_threshold) {
            return Err(AppError::Config(format!(
                "retrieval.scoreThreshold must be between 0 and 1, got {}",
                self.retrieval.score_threshold
            )));
        }

        if self.engine.max_attempts == 0 {
            return Err(AppError::Config(
                "engine.maxAttempts must be at least 1".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for corpus in &self.corpora {
            if corpus.id == "web" {
                return Err(AppError::Config(
                    "Corpus id 'web' is reserved for the web-search source".to_string(),
                ));
            }
            if !seen.insert(corpus.id.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate corpus id: {}",
                    corpus.id
                )));
            }
        }

        Ok(())
    }
}
