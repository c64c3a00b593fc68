//! Error types for the websift-search crate.
//!
//! All errors use stable string messages suitable for logging and
//! programmatic handling. API keys never appear in error messages.

/// Errors that can occur while retrieving candidates or fetching pages.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search-index provider failed to return candidates.
    #[error("search provider error: {0}")]
    Provider(String),

    /// A request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// An HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status code.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Failed to parse a provider response or page body.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid fetch or provider configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Classify a [`reqwest::Error`], keeping timeouts distinct from other
    /// transport failures.
    pub(crate) fn from_reqwest(context: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for websift-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_provider() {
        let err = SearchError::Provider("quota exceeded".into());
        assert_eq!(err.to_string(), "search provider error: quota exceeded");
    }

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("exceeded 10s limit".into());
        assert_eq!(err.to_string(), "request timed out: exceeded 10s limit");
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_status() {
        let err = SearchError::Status(503);
        assert_eq!(err.to_string(), "HTTP status 503");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_retries must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_retries must be > 0");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
