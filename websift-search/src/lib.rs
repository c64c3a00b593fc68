//! # websift-search
//!
//! Candidate retrieval and page fetching for websift.
//!
//! ## Design
//!
//! - [`SearchProvider`] turns a query into ordered `(title, url)` candidates
//!   (Tavily API or DuckDuckGo HTML)
//! - [`Fetcher`] downloads each candidate with bounded retries and
//!   exponential backoff, then extracts readable text off the async path
//! - Failures degrade: a page that cannot be fetched becomes an empty
//!   document, never an error for the batch
//!
//! ## Security
//!
//! - API keys are redacted from `Debug` output and never logged
//! - Query text is logged only at trace level

pub mod config;
pub mod content;
pub mod error;
pub mod fetch;
pub mod http;
pub mod provider;
pub mod providers;
pub mod types;

pub use config::FetchConfig;
pub use error::{Result, SearchError};
pub use fetch::{FetchOutcome, Fetcher};
pub use provider::SearchProvider;
pub use providers::{DuckDuckGoProvider, TavilyConfig, TavilyProvider};
pub use types::{Candidate, Document, PageContent};

/// Fetch a single page with default settings and extract its content.
///
/// Convenience wrapper around [`Fetcher::fetch_page`].
///
/// # Errors
///
/// Returns [`SearchError::Http`], [`SearchError::Status`] or
/// [`SearchError::Timeout`] if the page cannot be fetched, or
/// [`SearchError::Parse`] if it has no readable text.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> websift_search::Result<()> {
/// let page = websift_search::fetch_page_content("https://example.com").await?;
/// println!("{}: {} words", page.title, page.word_count);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_page_content(url: &str) -> Result<PageContent> {
    Fetcher::new(FetchConfig::default())?.fetch_page(url).await
}
