//! Shared HTTP client for page fetches and provider requests.
//!
//! One [`reqwest::Client`] is built per fetcher and reused for every
//! candidate so connections are pooled across a query's fan-out.

use std::borrow::Cow;
use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::config::FetchConfig;
use crate::error::SearchError;

/// Desktop browser identities. Article sites often serve stripped or
/// blocked pages to clients that look like bots.
const BROWSER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
];

/// Pages are HTML first; anything else is accepted but ranked lower.
const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5";

const MAX_REDIRECTS: usize = 10;

/// Upper bound on connection setup, independent of the per-attempt timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the client used for page fetches and provider calls.
///
/// Every request carries the configured User-Agent (or one picked from
/// [`BROWSER_AGENTS`] for the client's lifetime), HTML-preferring `Accept`
/// headers, and is bounded by `config.timeout_seconds`. Bodies are
/// transparently decompressed.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &FetchConfig) -> Result<reqwest::Client, SearchError> {
    let timeout = config.timeout();
    reqwest::Client::builder()
        .user_agent(user_agent_for(config).into_owned())
        .default_headers(page_headers())
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// The configured User-Agent, or a random browser identity.
pub fn user_agent_for(config: &FetchConfig) -> Cow<'_, str> {
    match config.user_agent.as_deref().map(str::trim) {
        Some(custom) if !custom.is_empty() => Cow::Borrowed(custom),
        _ => Cow::Borrowed(random_user_agent()),
    }
}

/// Pick one of [`BROWSER_AGENTS`] at random.
pub fn random_user_agent() -> &'static str {
    BROWSER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(BROWSER_AGENTS[0])
}

fn page_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(PAGE_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    headers
}
