//! Fetch configuration with sensible defaults.
//!
//! [`FetchConfig`] controls per-attempt timeouts, the retry/backoff policy,
//! fan-out width, and how much extracted text is kept per page.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::content::DEFAULT_MAX_CHARS;
use crate::error::SearchError;

/// Configuration for page fetching.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Total number of attempts per URL (not additional retries).
    pub max_retries: u32,
    /// Base delay in seconds; attempt `i` is followed by
    /// `backoff_factor * 2^i` seconds of sleep.
    pub backoff_factor: f64,
    /// Maximum number of fetches in flight at once.
    pub max_concurrent_fetches: usize,
    /// Maximum characters of extracted text kept per page.
    pub max_content_chars: usize,
    /// Custom User-Agent string. If `None`, a realistic browser
    /// User-Agent is picked from a built-in list.
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            max_retries: 3,
            backoff_factor: 0.5,
            max_concurrent_fetches: 10,
            max_content_chars: DEFAULT_MAX_CHARS,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_retries == 0 {
            return Err(SearchError::Config(
                "max_retries must be greater than 0".into(),
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(SearchError::Config(
                "backoff_factor must be a non-negative number".into(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(SearchError::Config(
                "max_concurrent_fetches must be greater than 0".into(),
            ));
        }
        if self.max_content_chars == 0 {
            return Err(SearchError::Config(
                "max_content_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Per-attempt timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.max_retries, 3);
        assert!((config.backoff_factor - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.max_concurrent_fetches, 10);
        assert_eq!(config.max_content_chars, DEFAULT_MAX_CHARS);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(FetchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = FetchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn zero_retries_rejected() {
        let config = FetchConfig {
            max_retries: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_retries"));
    }

    #[test]
    fn negative_backoff_rejected() {
        let config = FetchConfig {
            backoff_factor: -1.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backoff_factor"));
    }

    #[test]
    fn nan_backoff_rejected() {
        let config = FetchConfig {
            backoff_factor: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_backoff_valid() {
        let config = FetchConfig {
            backoff_factor: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let config = FetchConfig {
            max_concurrent_fetches: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_fetches"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: FetchConfig = serde_json::from_str(r#"{"max_retries": 5}"#).expect("parse");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout_seconds, 10);
    }

    #[test]
    fn timeout_duration() {
        assert_eq!(FetchConfig::default().timeout(), Duration::from_secs(10));
    }
}
