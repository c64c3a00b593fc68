//! Tavily search API provider.
//!
//! Sends `POST {base_url}/search` with a bearer API key and reads the
//! `results[].{title, url}` array from the JSON response.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::types::Candidate;

/// Default Tavily API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Configuration for the Tavily provider.
#[derive(Clone)]
pub struct TavilyConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL (defaults to `https://api.tavily.com`).
    pub base_url: String,
}

impl std::fmt::Debug for TavilyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TavilyConfig {
    /// Create a config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

/// Search-index provider backed by the Tavily API.
#[derive(Debug, Clone)]
pub struct TavilyProvider {
    client: reqwest::Client,
    config: TavilyConfig,
}

impl TavilyProvider {
    /// Create a provider sharing the given HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the API key is empty.
    pub fn new(config: TavilyConfig, client: reqwest::Client) -> Result<Self, SearchError> {
        if config.api_key.trim().is_empty() {
            return Err(SearchError::Config("Tavily API key is not set".into()));
        }
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Candidate>, SearchError> {
        tracing::trace!(query, max_results, "Tavily search");

        let body = serde_json::json!({
            "query": query,
            "max_results": max_results,
        });

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Provider(format!("Tavily request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Provider(format!(
                "Tavily returned HTTP {}",
                status.as_u16()
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("invalid Tavily response: {e}")))?;

        let candidates: Vec<Candidate> = parsed
            .results
            .into_iter()
            .filter(|r| !r.url.trim().is_empty())
            .map(|r| Candidate {
                title: r.title,
                url: r.url,
            })
            .take(max_results)
            .collect();

        tracing::debug!(count = candidates.len(), "Tavily results received");
        Ok(candidates)
    }

    fn name(&self) -> &str {
        "Tavily"
    }
}
