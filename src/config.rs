//! Configuration types for the search-fetch-rank pipeline.
//!
//! Loaded from TOML; every section and field has a default so partial files
//! are valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SiftError};
pub use websift_search::FetchConfig;

/// Environment variable consulted when no Tavily key is configured.
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Search-index provider settings.
    pub search: SearchConfig,
    /// Page fetching settings.
    pub fetch: FetchConfig,
    /// Embedding backend settings.
    pub embedding: EmbeddingConfig,
    /// Relevance ranking settings.
    pub rank: RankConfig,
    /// Whole-pipeline settings.
    pub pipeline: PipelineConfig,
}

/// Which search-index provider to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// DuckDuckGo HTML results. Needs no API key.
    #[default]
    DuckDuckGo,
    /// Tavily search API. Needs an API key.
    Tavily,
}

/// Search-index provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Provider to query.
    pub provider: ProviderKind,
    /// Maximum candidates requested from the provider.
    pub max_candidates: usize,
    /// Tavily API key. Falls back to `TAVILY_API_KEY` when unset.
    pub tavily_api_key: Option<String>,
    /// Tavily API base URL.
    pub tavily_base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            max_candidates: 10,
            tavily_api_key: None,
            tavily_base_url: websift_search::providers::DEFAULT_TAVILY_BASE_URL.to_owned(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("provider", &self.provider)
            .field("max_candidates", &self.max_candidates)
            .field(
                "tavily_api_key",
                &self.tavily_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("tavily_base_url", &self.tavily_base_url)
            .finish()
    }
}

/// Which embedding implementation to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// `all-MiniLM-L6-v2` ONNX model (downloaded on first use).
    #[default]
    MiniLm,
    /// Feature-hashed bag of words. Offline and deterministic.
    Hashed,
}

/// Embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding implementation.
    pub backend: EmbeddingBackend,
    /// Vector dimension for the hashed backend. The MiniLM model is fixed at 384.
    pub dimension: usize,
    /// Maximum embeddings computed at once on the blocking pool.
    pub max_concurrent: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            dimension: 384,
            max_concurrent: 4,
        }
    }
}

/// Relevance ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Documents must score strictly above this cosine similarity.
    pub threshold: f32,
    /// Maximum documents returned.
    pub top_k: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            top_k: 5,
        }
    }
}

/// Whole-pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Deadline for one search in seconds. 0 disables the deadline.
    pub timeout_seconds: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
        }
    }
}

impl SiftConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SiftError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SiftError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/websift/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("websift").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("websift")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/websift-config/config.toml")
        }
    }

    /// Load from `path`, or from the default path if it exists, or fall back
    /// to defaults; then apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or existing file cannot be loaded, or
    /// the resulting configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Fill a missing or blank Tavily key from the environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let has_key = self
            .search
            .tavily_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            if let Some(key) = lookup(TAVILY_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
                self.search.tavily_api_key = Some(key);
            }
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.search.max_candidates == 0 {
            return Err(SiftError::Config(
                "search.max_candidates must be greater than 0".into(),
            ));
        }
        if self.search.provider == ProviderKind::Tavily
            && self
                .search
                .tavily_api_key
                .as_deref()
                .is_none_or(|k| k.trim().is_empty())
        {
            return Err(SiftError::Config(format!(
                "search.tavily_api_key (or {TAVILY_API_KEY_ENV}) is required for the tavily provider"
            )));
        }
        self.fetch
            .validate()
            .map_err(|e| SiftError::Config(format!("fetch: {e}")))?;
        if self.embedding.dimension == 0 {
            return Err(SiftError::Config(
                "embedding.dimension must be greater than 0".into(),
            ));
        }
        if self.embedding.max_concurrent == 0 {
            return Err(SiftError::Config(
                "embedding.max_concurrent must be greater than 0".into(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.rank.threshold) {
            return Err(SiftError::Config(
                "rank.threshold must be within [-1, 1]".into(),
            ));
        }
        if self.rank.top_k == 0 {
            return Err(SiftError::Config("rank.top_k must be greater than 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SiftConfig::default();
        assert_eq!(config.search.provider, ProviderKind::DuckDuckGo);
        assert_eq!(config.search.max_candidates, 10);
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.timeout_seconds, 10);
        assert_eq!(config.embedding.backend, EmbeddingBackend::MiniLm);
        assert_eq!(config.embedding.dimension, 384);
        assert!((config.rank.threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.rank.top_k, 5);
        assert_eq!(config.pipeline.timeout_seconds, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = SiftConfig::default();
        config.search.provider = ProviderKind::Tavily;
        config.search.tavily_api_key = Some("tvly-abc".into());
        config.rank.top_k = 3;
        config.embedding.backend = EmbeddingBackend::Hashed;

        config.save_to_file(&path).expect("save");
        let loaded = SiftConfig::from_file(&path).expect("load");
        assert_eq!(loaded.search.provider, ProviderKind::Tavily);
        assert_eq!(loaded.search.tavily_api_key.as_deref(), Some("tvly-abc"));
        assert_eq!(loaded.rank.top_k, 3);
        assert_eq!(loaded.embedding.backend, EmbeddingBackend::Hashed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: SiftConfig = toml::from_str(
            r#"
            [search]
            provider = "tavily"

            [rank]
            threshold = 0.5
            "#,
        )
        .expect("parse");
        assert_eq!(config.search.provider, ProviderKind::Tavily);
        assert_eq!(config.search.max_candidates, 10);
        assert!((config.rank.threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.rank.top_k, 5);
        assert_eq!(config.fetch.max_retries, 3);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = SiftConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(SiftError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");
        assert!(matches!(
            SiftConfig::from_file(&path),
            Err(SiftError::Config(_))
        ));
    }

    #[test]
    fn env_override_fills_missing_key() {
        let mut config = SiftConfig::default();
        config.apply_env_overrides(|key| {
            (key == TAVILY_API_KEY_ENV).then(|| "tvly-from-env".to_owned())
        });
        assert_eq!(config.search.tavily_api_key.as_deref(), Some("tvly-from-env"));
    }

    #[test]
    fn env_override_does_not_replace_configured_key() {
        let mut config = SiftConfig::default();
        config.search.tavily_api_key = Some("tvly-file".into());
        config.apply_env_overrides(|_| Some("tvly-env".to_owned()));
        assert_eq!(config.search.tavily_api_key.as_deref(), Some("tvly-file"));
    }

    #[test]
    fn tavily_without_key_rejected() {
        let mut config = SiftConfig::default();
        config.search.provider = ProviderKind::Tavily;
        config.search.tavily_api_key = Some("   ".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tavily_api_key"));
    }

    #[test]
    fn invalid_fields_rejected() {
        let mut config = SiftConfig::default();
        config.rank.top_k = 0;
        assert!(config.validate().unwrap_err().to_string().contains("top_k"));

        let mut config = SiftConfig::default();
        config.rank.threshold = 1.5;
        assert!(config.validate().unwrap_err().to_string().contains("threshold"));

        let mut config = SiftConfig::default();
        config.fetch.max_retries = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max_retries"));

        let mut config = SiftConfig::default();
        config.embedding.max_concurrent = 0;
        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("max_concurrent")
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = SiftConfig::default();
        config.search.tavily_api_key = Some("tvly-secret".into());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("tvly-secret"));
    }
}
