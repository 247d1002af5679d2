//! Web-search backend.
//!
//! `TavilyClient` talks to a Tavily-compatible search API. Failures are
//! reported as `WebSearchError` so the web source can describe them to the
//! synthesizer instead of dropping them.

use async_trait::async_trait;
use lexguide_core::config::WebSearchSettings;
use lexguide_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// How thorough a web search should be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchDepth {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(SearchDepth::Basic),
            "advanced" => Ok(SearchDepth::Advanced),
            other => Err(AppError::Config(format!(
                "Unknown search depth: {}. Supported: basic, advanced",
                other
            ))),
        }
    }
}

/// One web search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebHit {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_content")]
    pub content: String,
    #[serde(default)]
    pub url: String,
}

fn default_title() -> String {
    "Unknown Title".to_string()
}

fn default_content() -> String {
    "No content available".to_string()
}

/// Structured web-search failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WebSearchError {
    #[error("Web search failed with status {0}")]
    Status(u16),

    #[error("Web search timed out. Please try again.")]
    Timeout,

    #[error("Web search error: {0}")]
    Transport(String),

    #[error("Web search error: {0}")]
    Decode(String),
}

/// A search API returning ranked results for a query.
#[async_trait]
pub trait WebSearchBackend: Send + Sync {
    async fn search(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: usize,
    ) -> Result<Vec<WebHit>, WebSearchError>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: SearchDepth,
    max_results: usize,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WebHit>,
}

/// Client for the Tavily search API.
pub struct TavilyClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl TavilyClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Search(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from settings and a resolved API key.
    pub fn from_settings(settings: &WebSearchSettings, api_key: &str) -> AppResult<Self> {
        Self::new(
            settings.endpoint.clone(),
            api_key,
            Duration::from_secs(settings.timeout_secs),
        )
    }
}

#[async_trait]
impl WebSearchBackend for TavilyClient {
    async fn search(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: usize,
    ) -> Result<Vec<WebHit>, WebSearchError> {
        let body = SearchRequest {
            query,
            search_depth: depth,
            max_results,
            include_answer: true,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebSearchError::Timeout
                } else {
                    WebSearchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("Web search API error: {} - {}", status, detail);
            return Err(WebSearchError::Status(status.as_u16()));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                WebSearchError::Timeout
            } else {
                WebSearchError::Decode(e.to_string())
            }
        })?;

        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_parsing() {
        assert_eq!("advanced".parse::<SearchDepth>().unwrap(), SearchDepth::Advanced);
        assert_eq!("BASIC".parse::<SearchDepth>().unwrap(), SearchDepth::Basic);
        assert!("deep".parse::<SearchDepth>().is_err());
        assert_eq!(SearchDepth::default().to_string(), "advanced");
    }

    #[test]
    fn test_request_body_shape() {
        let body = SearchRequest {
            query: "UU PDP fines 2024",
            search_depth: SearchDepth::Advanced,
            max_results: 3,
            include_answer: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["search_depth"], "advanced");
        assert_eq!(json["max_results"], 3);
        assert_eq!(json["include_answer"], true);
    }

    #[test]
    fn test_response_defaults() {
        let raw = r#"{"answer": "x", "results": [{"url": "https://example.org"}, {"title": "T", "content": "C"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(parsed.results[0].title, "Unknown Title");
        assert_eq!(parsed.results[0].content, "No content available");
        assert_eq!(parsed.results[1].url, "");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            WebSearchError::Status(429).to_string(),
            "Web search failed with status 429"
        );
        assert_eq!(
            WebSearchError::Timeout.to_string(),
            "Web search timed out. Please try again."
        );
        assert_eq!(
            WebSearchError::Transport("connection refused".to_string()).to_string(),
            "Web search error: connection refused"
        );
    }
}
