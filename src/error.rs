//! Error types for the websift pipeline.

use websift_search::SearchError;

/// Top-level error type for search, fetch and rank.
///
/// [`SearchPipeline::search`](crate::pipeline::SearchPipeline::search)
/// never returns these; they surface from construction, configuration,
/// and the cancellable entry point.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Model download or loading error.
    #[error("model error: {0}")]
    Model(String),

    /// Embedding computation error.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Candidate retrieval or fetch error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Pipeline coordination error (blocking task failure).
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// A pipeline stage panicked; the panic was caught at the boundary.
    #[error("pipeline panicked: {0}")]
    Panicked(String),

    /// The caller cancelled the search.
    #[error("search cancelled")]
    Cancelled,

    /// The search exceeded its overall deadline.
    #[error("search timed out after {0}s")]
    Timeout(u64),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiftError {
    /// Pipeline stage the error is attributed to, for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Model(_) | Self::Io(_) => "setup",
            Self::Search(_) => "fetch",
            Self::Embedding(_) | Self::Pipeline(_) => "rank",
            Self::Panicked(_) => "panic",
            Self::Cancelled => "cancelled",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            SiftError::Config("top_k must be > 0".into()).to_string(),
            "config error: top_k must be > 0"
        );
        assert_eq!(SiftError::Cancelled.to_string(), "search cancelled");
        assert_eq!(SiftError::Timeout(60).to_string(), "search timed out after 60s");
    }

    #[test]
    fn search_error_converts_transparently() {
        let err: SiftError = SearchError::Status(502).into();
        assert_eq!(err.to_string(), "HTTP status 502");
    }

    #[test]
    fn stage_names_follow_variant() {
        assert_eq!(SiftError::Embedding("x".into()).stage(), "rank");
        assert_eq!(SiftError::Panicked("boom".into()).stage(), "panic");
        assert_eq!(SiftError::Timeout(1).stage(), "timeout");
        assert_eq!(SiftError::Cancelled.stage(), "cancelled");
        assert_eq!(SiftError::from(SearchError::Status(500)).stage(), "fetch");
        assert_eq!(SiftError::Config("bad".into()).stage(), "setup");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SiftError>();
    }
}
