//! Feature-hashed bag-of-words embeddings.
//!
//! Needs no model files, so it backs offline runs and tests. Similarity
//! reflects shared vocabulary rather than meaning.

use super::{Embedder, l2_normalize};
use crate::error::Result;

/// Deterministic embedder hashing lowercase word tokens into buckets.
///
/// Counts are unsigned, so cosine similarity between two hashed vectors is
/// never negative. Text without word characters embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dimension: usize,
}

impl HashedEmbedder {
    /// Create an embedder producing `dimension`-length vectors (minimum 1).
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let hash = blake3::hash(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        // Dimension fits in u64 on every supported target.
        (u64::from_le_bytes(head) % self.dimension as u64) as usize
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(super::EMBEDDING_DIM)
    }
}

impl Embedder for HashedEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut counts = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            counts[self.bucket(&token.to_lowercase())] += 1.0;
        }
        Ok(l2_normalize(&counts))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hashed"
    }
}
