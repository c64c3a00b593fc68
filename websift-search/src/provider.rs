//! Trait definition for pluggable search-index providers.
//!
//! A provider turns a query into an ordered list of [`Candidate`]s. Its
//! ranking is opaque; the order it returns is the order documents keep
//! until relevance ranking.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::Candidate;

/// A pluggable search-index backend.
///
/// Object safe so the pipeline can hold an `Arc<dyn SearchProvider>` chosen
/// at runtime from configuration. All implementations must be
/// `Send + Sync`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return at most `max_results` candidates for `query`, best first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on network failure, quota/auth rejection, or
    /// an unparseable response. Callers treat any error as zero candidates.
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<Candidate>, SearchError>;

    /// Human-readable provider name, for logs.
    fn name(&self) -> &str;
}
