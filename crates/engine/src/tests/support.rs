//! Test doubles for the completion backend and retrieval sources.

use crate::completion::Completer;
use async_trait::async_trait;
use lexguide_core::config::{default_corpora, LlmSettings};
use lexguide_core::{AppError, AppResult};
use lexguide_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use lexguide_knowledge::{RetrievalSource, SourceId, SourceKind, SourceRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync>;

/// Completion client driven by a closure. Records every request.
pub struct ScriptedClient {
    responder: Responder,
    delay: Option<Duration>,
    requests: Mutex<Vec<LlmRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(
        responder: impl Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            delay: None,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn slow(delay: Duration, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(move |_| Ok(reply.to_string())),
            delay: Some(delay),
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Most completions that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Requests for one pipeline stage, in call order.
    pub fn requests_for(&self, stage: Stage) -> Vec<LlmRequest> {
        self.requests()
            .into_iter()
            .filter(|r| Stage::of(r) == stage)
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let content = (self.responder)(request)?;
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
            done: true,
        })
    }
}

pub fn scripted_completer(
    responder: impl Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
) -> Completer {
    Completer::new(ScriptedClient::new(responder), &LlmSettings::default())
}

/// Pipeline stage a request belongs to, told apart by its system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Select,
    Relevance,
    Synthesize,
    General,
}

impl Stage {
    pub fn of(request: &LlmRequest) -> Self {
        let system = request.system_prompt().unwrap_or_default();
        if system.starts_with("You are a source selector") {
            Stage::Select
        } else if system.starts_with("You are a relevance evaluator") {
            Stage::Relevance
        } else if system.starts_with("You are a legal expert.") {
            Stage::General
        } else {
            Stage::Synthesize
        }
    }
}

/// Replies per stage; `None` makes that stage fail.
#[derive(Debug, Clone)]
pub struct Replies {
    pub select: Option<&'static str>,
    pub relevance: Option<&'static str>,
    pub synthesize: Option<&'static str>,
    pub general: Option<&'static str>,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            select: None,
            relevance: Some("relevant"),
            synthesize: Some("Synthesized answer."),
            general: Some("General guidance."),
        }
    }
}

pub fn pipeline_client(replies: Replies) -> Arc<ScriptedClient> {
    ScriptedClient::new(move |request| {
        let stage = Stage::of(request);
        let reply = match stage {
            Stage::Select => replies.select,
            Stage::Relevance => replies.relevance,
            Stage::Synthesize => replies.synthesize,
            Stage::General => replies.general,
        };
        reply
            .map(str::to_string)
            .ok_or_else(|| AppError::Llm(format!("{:?} backend unavailable", stage)))
    })
}

/// Retrieval source returning a fixed response.
pub struct CannedSource {
    id: SourceId,
    kind: SourceKind,
    description: String,
    triggers: Vec<String>,
    response: Option<String>,
    calls: AtomicUsize,
}

impl CannedSource {
    pub fn corpus(id: &str, triggers: &[&str], response: Option<&str>) -> Self {
        Self {
            id: SourceId::new(id).unwrap(),
            kind: SourceKind::Corpus,
            description: format!("{} documents", id),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            response: response.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn web(response: Option<&str>) -> Self {
        Self {
            id: SourceId::web(),
            kind: SourceKind::Web,
            description: "Web search".to_string(),
            triggers: Vec::new(),
            response: response.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetrievalSource for CannedSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn triggers(&self) -> &[String] {
        &self.triggers
    }

    async fn retrieve(&self, _query: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// The default corpora with their trigger terms, plus web.
pub struct CannedSources {
    pub gdpr: Arc<CannedSource>,
    pub pdp: Arc<CannedSource>,
    pub company: Arc<CannedSource>,
    pub web: Arc<CannedSource>,
}

impl CannedSources {
    /// Responses keyed by source id; unlisted sources return nothing.
    pub fn new(responses: &[(&str, &str)]) -> Self {
        let response = |id: &str| {
            responses
                .iter()
                .find(|(source, _)| *source == id)
                .map(|(_, text)| *text)
        };

        let corpora = default_corpora();
        let corpus = |id: &str| {
            let triggers: Vec<&str> = corpora
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.triggers.iter().map(String::as_str).collect())
                .unwrap_or_default();
            Arc::new(CannedSource::corpus(id, &triggers, response(id)))
        };

        Self {
            gdpr: corpus("gdpr"),
            pdp: corpus("pdp"),
            company: corpus("company"),
            web: Arc::new(CannedSource::web(response("web"))),
        }
    }

    pub fn registry(&self) -> SourceRegistry {
        registry_with(vec![
            self.gdpr.clone(),
            self.pdp.clone(),
            self.company.clone(),
            self.web.clone(),
        ])
    }
}

pub fn registry(responses: &[(&str, &str)]) -> SourceRegistry {
    CannedSources::new(responses).registry()
}

pub fn registry_with(sources: Vec<Arc<CannedSource>>) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    for source in sources {
        registry.register(source).unwrap();
    }
    registry
}
