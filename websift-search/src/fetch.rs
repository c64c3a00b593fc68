//! Page fetcher with bounded retries and exponential backoff.
//!
//! [`Fetcher::fetch`] never fails: every URL resolves to a [`FetchOutcome`],
//! and a failed outcome degrades to empty content when documents are
//! assembled. One unreachable URL cannot fail a batch.

use std::time::Duration;

use crate::config::FetchConfig;
use crate::content;
use crate::error::{Result, SearchError};
use crate::http;
use crate::types::PageContent;

/// Upper bound on a single backoff sleep, in seconds.
const MAX_BACKOFF_SECS: f64 = 300.0;

/// Result of fetching one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was downloaded. `content` may still be empty if the page had
    /// no readable text.
    Fetched {
        /// Extracted readable text.
        content: String,
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed.
    Failed {
        /// The last error seen.
        reason: String,
        /// Attempts made.
        attempts: u32,
    },
}

impl FetchOutcome {
    /// Extracted text, or `""` for a failed fetch.
    pub fn content(&self) -> &str {
        match self {
            Self::Fetched { content, .. } => content,
            Self::Failed { .. } => "",
        }
    }

    /// Consume the outcome, yielding `""` for a failed fetch.
    pub fn into_content(self) -> String {
        match self {
            Self::Fetched { content, .. } => content,
            Self::Failed { .. } => String::new(),
        }
    }

    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fetched { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    /// Whether the page was downloaded.
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }
}

/// Sleep after the 0-based `attempt` fails: `factor * 2^attempt` seconds.
///
/// With the default factor of 0.5 this gives 0.5s, 1s, 2s, ...
pub fn backoff_delay(factor: f64, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let secs = (factor * 2f64.powi(exponent)).clamp(0.0, MAX_BACKOFF_SECS);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

/// Downloads pages and extracts their readable text.
///
/// Cheap to clone: the inner [`reqwest::Client`] is reference counted, so
/// clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Create a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Create a fetcher around an existing client.
    ///
    /// The client's own timeout applies; `config.timeout_seconds` is only
    /// used when building a client.
    pub fn with_client(client: reqwest::Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    /// The configuration this fetcher was built with.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `url`, retrying transport errors, timeouts and non-2xx
    /// statuses up to `max_retries` total attempts.
    ///
    /// Extraction runs on the blocking pool so it never holds up sibling
    /// fetches waiting on the network.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let max_attempts = self.config.max_retries.max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            match self.fetch_body(url).await {
                Ok(html) => {
                    let content = self.extract(html).await;
                    if content.is_empty() {
                        tracing::debug!(url, "no readable text extracted");
                    }
                    return FetchOutcome::Fetched {
                        content,
                        attempts: attempt + 1,
                    };
                }
                Err(err) => {
                    tracing::warn!(url, attempt = attempt + 1, error = %err, "fetch attempt failed");
                    last_error = err.to_string();
                    if attempt + 1 < max_attempts {
                        tokio::time::sleep(backoff_delay(self.config.backoff_factor, attempt)).await;
                    }
                }
            }
        }

        tracing::warn!(url, attempts = max_attempts, "failed to fetch after all attempts");
        FetchOutcome::Failed {
            reason: last_error,
            attempts: max_attempts,
        }
    }

    /// Fetch `url` and return its text, `""` on failure.
    pub async fn fetch_content(&self, url: &str) -> String {
        self.fetch(url).await.into_content()
    }

    /// Fetch a single page once, surfacing errors instead of degrading.
    ///
    /// # Errors
    ///
    /// Returns the HTTP error, or [`SearchError::Parse`] if the page has no
    /// readable text.
    pub async fn fetch_page(&self, url: &str) -> Result<PageContent> {
        let html = self.fetch_body(url).await?;
        let owned_url = url.to_owned();
        let max_chars = self.config.max_content_chars;
        tokio::task::spawn_blocking(move || {
            content::extract_content_with_limit(&html, &owned_url, max_chars)
        })
        .await
        .map_err(|e| SearchError::Parse(format!("extraction task failed: {e}")))?
    }

    /// One GET attempt; non-2xx statuses are errors.
    async fn fetch_body(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("request failed", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("body read failed", &e))?;
        tracing::trace!(url, bytes = body.len(), "page downloaded");
        Ok(body)
    }

    async fn extract(&self, html: String) -> String {
        let max_chars = self.config.max_content_chars;
        match tokio::task::spawn_blocking(move || content::extract_text(&html, max_chars)).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "extraction task failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_schedule() {
        assert_eq!(backoff_delay(0.5, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(0.5, 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(0.5, 2), Duration::from_secs(2));
    }

    #[test]
    fn backoff_is_strictly_increasing() {
        let delays: Vec<Duration> = (0..5).map(|i| backoff_delay(0.25, i)).collect();
        for pair in delays.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn backoff_zero_factor_never_sleeps() {
        assert_eq!(backoff_delay(0.0, 3), Duration::ZERO);
    }

    #[test]
    fn backoff_is_capped() {
        assert_eq!(
            backoff_delay(0.5, 1_000),
            Duration::from_secs_f64(MAX_BACKOFF_SECS)
        );
    }

    #[test]
    fn failed_outcome_degrades_to_empty_content() {
        let outcome = FetchOutcome::Failed {
            reason: "HTTP status 503".into(),
            attempts: 3,
        };
        assert_eq!(outcome.content(), "");
        assert_eq!(outcome.attempts(), 3);
        assert!(!outcome.is_fetched());
        assert_eq!(outcome.into_content(), "");
    }

    #[test]
    fn fetched_outcome_keeps_content() {
        let outcome = FetchOutcome::Fetched {
            content: "text".into(),
            attempts: 2,
        };
        assert!(outcome.is_fetched());
        assert_eq!(outcome.content(), "text");
        assert_eq!(outcome.into_content(), "text");
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = FetchConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(Fetcher::new(config).is_err());
    }

    #[tokio::test]
    async fn unreachable_url_degrades_without_panicking() {
        let fetcher = Fetcher::new(FetchConfig {
            max_retries: 2,
            backoff_factor: 0.0,
            timeout_seconds: 2,
            ..Default::default()
        })
        .expect("fetcher");
        let outcome = fetcher.fetch("http://127.0.0.1:1/unreachable").await;
        assert!(!outcome.is_fetched());
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.content(), "");
    }
}
