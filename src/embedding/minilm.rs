//! `all-MiniLM-L6-v2` sentence embeddings via ONNX Runtime.
//!
//! ```text
//! text → tokenizer → ONNX model → mean-pool → L2-normalize → 384-dim f32
//! ```
//!
//! The model is fetched from HuggingFace Hub on first use and cached by
//! `hf-hub`.

use ort::session::{Session, SessionInputValue, SessionInputs};
use ort::value::Tensor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use super::{Embedder, l2_normalize};
use crate::error::{Result, SiftError};

const REPO_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
const MODEL_FILE: &str = "onnx/model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Output embedding dimensions.
pub const EMBEDDING_DIM: usize = 384;

/// Longer inputs are truncated to this many tokens.
const MAX_TOKENS: usize = 256;

/// Sentence embedder backed by `all-MiniLM-L6-v2`.
///
/// Inference needs exclusive access to the ONNX session, so the session sits
/// behind a mutex; callers bound parallelism with
/// [`EmbeddingPool`](super::EmbeddingPool).
pub struct MiniLmEmbedder {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

impl std::fmt::Debug for MiniLmEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniLmEmbedder")
            .field("dim", &EMBEDDING_DIM)
            .finish_non_exhaustive()
    }
}

impl MiniLmEmbedder {
    /// Load from pre-downloaded model files.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Model`] if the ONNX model or tokenizer cannot be loaded.
    pub fn new(model_path: &Path, tokenizer_path: &Path) -> Result<Self> {
        info!("loading embedding model: {}", model_path.display());
        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| SiftError::Model(format!("embedding model load failed: {e}")))?;

        let mut tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path)
            .map_err(|e| SiftError::Model(format!("embedding tokenizer load failed: {e}")))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| SiftError::Model(format!("tokenizer truncation config failed: {e}")))?;
        tokenizer.with_padding(None);

        info!("embedding model ready (dim={EMBEDDING_DIM})");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Download the model files, returning `(model_path, tokenizer_path)`.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Model`] if the download fails.
    pub fn download_model() -> Result<(PathBuf, PathBuf)> {
        info!("resolving embedding model: {REPO_ID}");
        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| SiftError::Model(format!("HF Hub API init failed: {e}")))?;
        let repo = api.model(REPO_ID.to_owned());

        let model_path = repo
            .get(MODEL_FILE)
            .map_err(|e| SiftError::Model(format!("failed to download {MODEL_FILE}: {e}")))?;
        let tokenizer_path = repo
            .get(TOKENIZER_FILE)
            .map_err(|e| SiftError::Model(format!("failed to download {TOKENIZER_FILE}: {e}")))?;
        Ok((model_path, tokenizer_path))
    }

    /// Download (if needed) and load in one step.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Model`] if download or loading fails.
    pub fn download_and_load() -> Result<Self> {
        let (model_path, tokenizer_path) = Self::download_model()?;
        Self::new(&model_path, &tokenizer_path)
    }
}

impl Embedder for MiniLmEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| SiftError::Embedding(format!("tokenization failed: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| i64::from(m))
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| i64::from(t))
            .collect();
        let seq_len = input_ids.len();
        debug!(tokens = seq_len, "embedding text");

        let mut feed: HashMap<String, SessionInputValue> = HashMap::new();
        feed.insert(
            "input_ids".to_owned(),
            Tensor::from_array(([1, seq_len], input_ids))
                .map_err(|e| SiftError::Embedding(format!("tensor creation failed: {e}")))?
                .into(),
        );
        feed.insert(
            "attention_mask".to_owned(),
            Tensor::from_array(([1, seq_len], attention_mask.clone()))
                .map_err(|e| SiftError::Embedding(format!("tensor creation failed: {e}")))?
                .into(),
        );
        feed.insert(
            "token_type_ids".to_owned(),
            Tensor::from_array(([1, seq_len], token_type_ids))
                .map_err(|e| SiftError::Embedding(format!("tensor creation failed: {e}")))?
                .into(),
        );

        let mut session = self
            .session
            .lock()
            .map_err(|_| SiftError::Embedding("embedding session lock poisoned".into()))?;
        let outputs = session
            .run(SessionInputs::from(feed))
            .map_err(|e| SiftError::Embedding(format!("ONNX inference failed: {e}")))?;

        // [1, seq_len, 384] token embeddings.
        let (_shape, data) = outputs[0_usize]
            .try_extract_tensor::<f32>()
            .map_err(|e| SiftError::Embedding(format!("failed to extract output tensor: {e}")))?;

        Ok(l2_normalize(&mean_pool(data, &attention_mask, EMBEDDING_DIM)))
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    fn model_name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }
}

/// Mean-pool token embeddings, counting only unmasked tokens.
///
/// `flat` is `[mask.len(), dim]` row-major.
fn mean_pool(flat: &[f32], mask: &[i64], dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dim];
    let mut count = 0.0f32;

    for (t, &m) in mask.iter().enumerate() {
        if m == 0 {
            continue;
        }
        let offset = t * dim;
        let Some(row) = flat.get(offset..offset + dim) else {
            break;
        };
        for (p, &f) in pooled.iter_mut().zip(row) {
            *p += f;
        }
        count += 1.0;
    }

    if count > 0.0 {
        for p in &mut pooled {
            *p /= count;
        }
    }
    pooled
}
