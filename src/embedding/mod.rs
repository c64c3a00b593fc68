//! Sentence embeddings for relevance scoring.
//!
//! [`Embedder`] is the synchronous seam; implementations are CPU-bound and
//! run on the blocking pool through [`EmbeddingPool`].

mod hashed;
mod minilm;
mod pool;

pub use hashed::HashedEmbedder;
pub use minilm::{EMBEDDING_DIM, MiniLmEmbedder};
pub use pool::EmbeddingPool;

use std::sync::Arc;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::Result;

/// Maps text to a fixed-dimension vector.
///
/// The same embedder must be used for a query and the documents it is
/// compared against.
pub trait Embedder: Send + Sync {
    /// Embed one text.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Embedding`](crate::SiftError::Embedding) if the
    /// text cannot be encoded.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output vector length.
    fn dimension(&self) -> usize;

    /// Short identifier for logs.
    fn model_name(&self) -> &str;
}

/// Build the embedder selected by `config`.
///
/// Loading the MiniLM backend downloads the model on first use.
///
/// # Errors
///
/// Returns [`SiftError::Model`](crate::SiftError::Model) if the model cannot
/// be downloaded or loaded.
pub fn load_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.backend {
        EmbeddingBackend::MiniLm => Ok(Arc::new(MiniLmEmbedder::download_and_load()?)),
        EmbeddingBackend::Hashed => Ok(Arc::new(HashedEmbedder::new(config.dimension))),
    }
}

/// L2-normalize a vector. Near-zero vectors are returned unchanged.
pub(crate) fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm < 1e-12 {
        return vec.to_vec();
    }
    vec.iter().map(|x| x / norm).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_unit_length() {
        let n = l2_normalize(&[3.0, 4.0]);
        let norm: f32 = n.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let n = l2_normalize(&[0.0; 8]);
        assert!(n.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn load_hashed_backend_offline() {
        let config = EmbeddingConfig {
            backend: EmbeddingBackend::Hashed,
            dimension: 64,
            ..Default::default()
        };
        let embedder = load_embedder(&config).expect("hashed embedder");
        assert_eq!(embedder.dimension(), 64);
        assert_eq!(embedder.model_name(), "hashed");
    }
}
