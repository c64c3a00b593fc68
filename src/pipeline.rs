//! Search pipeline orchestration: query → candidates → concurrent fetch →
//! documents → ranked result.
//!
//! # Pipeline
//!
//! 1. Ask the provider for at most `max_candidates` candidates. A provider
//!    failure is logged and treated as zero candidates.
//! 2. Fetch every candidate concurrently, bounded by
//!    `max_concurrent_fetches`. Fan-in is positional, so documents keep the
//!    provider's order and a failed fetch becomes an empty document.
//! 3. Rank by embedding similarity and return the top documents.
//!
//! [`SearchPipeline::search`] never fails: errors, panics and timeouts are
//! logged and collapse to an empty result.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{FutureExt, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use websift_search::{
    Document, DuckDuckGoProvider, Fetcher, SearchProvider, TavilyConfig, TavilyProvider,
};

use crate::config::{ProviderKind, SiftConfig};
use crate::embedding::{EmbeddingPool, load_embedder};
use crate::error::{Result, SiftError};
use crate::rank::{RankedResultSet, RelevanceRanker};

/// Default number of candidates requested from the provider.
pub const DEFAULT_MAX_CANDIDATES: usize = 10;

/// Default whole-search deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// End-to-end search-fetch-rank pipeline.
///
/// Built once per process and shared; every dependency is injected.
#[derive(Clone)]
pub struct SearchPipeline {
    provider: Arc<dyn SearchProvider>,
    fetcher: Fetcher,
    ranker: RelevanceRanker,
    max_candidates: usize,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("provider", &self.provider.name())
            .field("max_candidates", &self.max_candidates)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SearchPipeline {
    /// Assemble a pipeline from its parts with default candidate limit and
    /// deadline.
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        fetcher: Fetcher,
        ranker: RelevanceRanker,
    ) -> Self {
        Self {
            provider,
            fetcher,
            ranker,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Set the maximum number of candidates requested (minimum 1).
    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.max(1);
        self
    }

    /// Set the whole-search deadline. `None` disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the provider, fetcher, embedder and ranker described by `config`.
    ///
    /// Loading the MiniLM backend may download and load the model, which
    /// blocks; call this from a blocking context inside async code.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Config`] for invalid settings, a search error if
    /// the HTTP client or provider cannot be built, or [`SiftError::Model`]
    /// if the embedding model cannot be loaded.
    pub fn from_config(config: &SiftConfig) -> Result<Self> {
        config.validate()?;

        let client = websift_search::http::build_client(&config.fetch)?;
        let provider: Arc<dyn SearchProvider> = match config.search.provider {
            ProviderKind::DuckDuckGo => Arc::new(DuckDuckGoProvider::new(client.clone())),
            ProviderKind::Tavily => {
                let key = config
                    .search
                    .tavily_api_key
                    .clone()
                    .ok_or_else(|| SiftError::Config("tavily_api_key is not set".into()))?;
                let tavily = TavilyConfig::new(key).with_base_url(&config.search.tavily_base_url);
                Arc::new(TavilyProvider::new(tavily, client.clone())?)
            }
        };
        let fetcher = Fetcher::with_client(client, config.fetch.clone());

        let embedder = load_embedder(&config.embedding)?;
        info!(
            provider = provider.name(),
            embedder = embedder.model_name(),
            "search pipeline ready"
        );
        let pool = EmbeddingPool::new(embedder, config.embedding.max_concurrent);
        let ranker = RelevanceRanker::new(pool, config.rank.clone());

        let timeout = (config.pipeline.timeout_seconds > 0)
            .then(|| Duration::from_secs(config.pipeline.timeout_seconds));
        Ok(Self::new(provider, fetcher, ranker)
            .with_max_candidates(config.search.max_candidates)
            .with_timeout(timeout))
    }

    /// Run the full pipeline.
    ///
    /// Never fails: any error, panic or timeout is logged and yields an
    /// empty result.
    pub async fn search(&self, query: &str) -> RankedResultSet {
        let never = CancellationToken::new();
        match self.search_cancellable(query, &never).await {
            Ok(results) => results,
            Err(e) => {
                error!(stage = e.stage(), error = %e, "search failed, returning empty result");
                trace!(query, "failed query");
                Vec::new()
            }
        }
    }

    /// Run the full pipeline, abandoning all in-flight work when `cancel`
    /// fires.
    ///
    /// Fetch and provider failures still degrade as in [`search`](Self::search);
    /// errors here are cancellation, the deadline, a failed query embedding,
    /// or a caught panic.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Cancelled`] if cancelled, [`SiftError::Timeout`]
    /// if the deadline passes, or the ranking/pipeline error otherwise.
    pub async fn search_cancellable(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<RankedResultSet> {
        if query.trim().is_empty() {
            debug!("empty query, skipping search");
            return Ok(Vec::new());
        }
        trace!(query, "search started");

        let guarded = async {
            match AssertUnwindSafe(self.run(query)).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(SiftError::Panicked(panic_message(panic.as_ref()))),
            }
        };
        let bounded = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, guarded).await {
                    Ok(result) => result,
                    Err(_) => Err(SiftError::Timeout(limit.as_secs())),
                },
                None => guarded.await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("search cancelled");
                Err(SiftError::Cancelled)
            }
            result = bounded => result,
        }
    }

    /// Retrieve and fetch candidates without ranking.
    ///
    /// Returns one document per candidate in provider order; failed fetches
    /// have empty content.
    pub async fn gather_documents(&self, query: &str) -> Vec<Document> {
        let mut candidates = match self.provider.search(query, self.max_candidates).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    stage = "provider",
                    provider = self.provider.name(),
                    error = %e,
                    "provider failed, continuing with zero candidates"
                );
                Vec::new()
            }
        };
        candidates.truncate(self.max_candidates);
        debug!(
            provider = self.provider.name(),
            count = candidates.len(),
            "retrieved candidates"
        );
        if candidates.is_empty() {
            return Vec::new();
        }

        let limit = self.fetcher.config().max_concurrent_fetches.max(1);
        let fetcher = &self.fetcher;
        let contents: Vec<String> = futures_util::stream::iter(
            candidates.iter().map(|c| fetcher.fetch_content(&c.url)),
        )
        .buffered(limit)
        .collect()
        .await;

        let documents: Vec<Document> = candidates
            .into_iter()
            .zip(contents)
            .map(|(candidate, content)| candidate.into_document(content))
            .collect();
        debug!(
            fetched = documents.iter().filter(|d| d.has_content()).count(),
            total = documents.len(),
            "fetched documents"
        );
        documents
    }

    async fn run(&self, query: &str) -> Result<RankedResultSet> {
        let documents = self.gather_documents(query).await;
        let ranked = self.ranker.rank(query, documents).await?;
        info!(results = ranked.len(), "search complete");
        Ok(ranked)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
