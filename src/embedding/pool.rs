//! Bounded concurrent embedding on the blocking thread pool.

use std::sync::Arc;
use tokio::sync::Semaphore;

use super::Embedder;
use crate::error::{Result, SiftError};

/// Runs an [`Embedder`] off the async executor with a concurrency limit.
#[derive(Clone)]
pub struct EmbeddingPool {
    embedder: Arc<dyn Embedder>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl std::fmt::Debug for EmbeddingPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingPool")
            .field("embedder", &self.embedder.model_name())
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}

impl EmbeddingPool {
    /// Create a pool allowing `max_concurrent` embeddings at once (minimum 1).
    pub fn new(embedder: Arc<dyn Embedder>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            embedder,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// The wrapped embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Maximum concurrent embeddings.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Permits currently free.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Embed one text on the blocking pool.
    ///
    /// The permit travels with the blocking task, so a dropped caller
    /// frees its slot only once the embedding actually finishes.
    ///
    /// # Errors
    ///
    /// Returns the embedder's error, or [`SiftError::Pipeline`] if the
    /// blocking task panicked.
    pub async fn embed(&self, text: String) -> Result<Vec<f32>> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| SiftError::Pipeline(format!("semaphore error: {e}")))?;

        let embedder = Arc::clone(&self.embedder);
        tokio::task::spawn_blocking(move || {
            let result = embedder.embed(&text);
            drop(permit);
            result
        })
            .await
            .map_err(|e| SiftError::Pipeline(format!("embedding task failed: {e}")))?
    }

    /// Embed every text concurrently. Results keep input order; one failure
    /// does not affect the others.
    pub async fn embed_all(&self, texts: Vec<String>) -> Vec<Result<Vec<f32>>> {
        futures_util::future::join_all(texts.into_iter().map(|text| self.embed(text))).await
    }
}
