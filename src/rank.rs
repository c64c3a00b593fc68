//! Embedding-based relevance ranking.
//!
//! Scores each document by cosine similarity between its content embedding
//! and the query embedding, keeps scores strictly above the threshold, and
//! returns the best `top_k` in descending order. Ties keep candidate order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};
use websift_search::Document;

use crate::embedding::EmbeddingPool;
use crate::error::Result;
pub use crate::config::RankConfig;

/// A document with its relevance score.
///
/// Serialises flat: `{"title", "url", "content", "relevance_score"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// The scored document.
    #[serde(flatten)]
    pub document: Document,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub relevance_score: f32,
}

/// Ranked documents, best first.
pub type RankedResultSet = Vec<ScoredDocument>;

/// Cosine similarity of two vectors.
///
/// Returns `0.0` for a zero-norm vector, mismatched lengths, or a
/// non-finite result.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;
    if !denom.is_finite() || denom < 1e-12 {
        return 0.0;
    }
    let score = dot / denom;
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Keep scores strictly above `threshold`, sort descending (stable), and
/// truncate to `top_k`.
pub fn select_top(
    mut scored: Vec<ScoredDocument>,
    threshold: f32,
    top_k: usize,
) -> RankedResultSet {
    scored.retain(|d| d.relevance_score > threshold);
    scored.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}

/// Scores and filters documents against a query.
#[derive(Debug, Clone)]
pub struct RelevanceRanker {
    pool: EmbeddingPool,
    config: RankConfig,
}

impl RelevanceRanker {
    /// Create a ranker over an embedding pool.
    pub fn new(pool: EmbeddingPool, config: RankConfig) -> Self {
        Self { pool, config }
    }

    /// Ranking settings.
    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Rank `documents` by relevance to `query`.
    ///
    /// Documents with empty content score `0.0` without being embedded. A
    /// document whose embedding fails also scores `0.0`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the query itself cannot be embedded.
    pub async fn rank(&self, query: &str, documents: Vec<Document>) -> Result<RankedResultSet> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.pool.embed(query.to_owned()).await?;

        let with_content: Vec<usize> = documents
            .iter()
            .enumerate()
            .filter(|(_, d)| d.has_content())
            .map(|(i, _)| i)
            .collect();
        let texts = with_content
            .iter()
            .map(|&i| documents[i].content.clone())
            .collect();
        let vectors = self.pool.embed_all(texts).await;

        let mut scores = vec![0.0f32; documents.len()];
        for (&index, vector) in with_content.iter().zip(vectors) {
            match vector {
                Ok(vector) => scores[index] = cosine_similarity(&query_vec, &vector),
                Err(e) => warn!(url = %documents[index].url, error = %e, "document embedding failed, scoring 0"),
            }
        }

        let scored: Vec<ScoredDocument> = documents
            .into_iter()
            .zip(scores)
            .map(|(document, relevance_score)| ScoredDocument {
                document,
                relevance_score,
            })
            .collect();
        let total = scored.len();
        let ranked = select_top(scored, self.config.threshold, self.config.top_k);
        debug!(
            scored = total,
            kept = ranked.len(),
            threshold = self.config.threshold,
            "ranked documents"
        );
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{Embedder, HashedEmbedder};
    use crate::error::SiftError;
    use std::sync::Arc;

    fn doc(title: &str, content: &str) -> Document {
        Document {
            title: title.into(),
            url: format!("https://example.com/{title}"),
            content: content.into(),
        }
    }

    fn scored(title: &str, score: f32) -> ScoredDocument {
        ScoredDocument {
            document: doc(title, "text"),
            relevance_score: score,
        }
    }

    /// Returns a fixed vector per exact text.
    struct TableEmbedder(Vec<(&'static str, Vec<f32>)>);

    impl Embedder for TableEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.0
                .iter()
                .find(|(t, _)| *t == text)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| SiftError::Embedding(format!("no vector for {text:?}")))
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "table"
        }
    }

    fn ranker(embedder: impl Embedder + 'static, threshold: f32, top_k: usize) -> RelevanceRanker {
        RelevanceRanker::new(
            EmbeddingPool::new(Arc::new(embedder), 2),
            RankConfig { threshold, top_k },
        )
    }

    #[test]
    fn cosine_basic_cases() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[3.0, 4.0]) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn cosine_degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn select_top_excludes_exact_threshold() {
        let result = select_top(vec![scored("edge", 0.3), scored("above", 0.31)], 0.3, 5);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].document.title, "above");
    }

    #[test]
    fn select_top_sorts_descending_and_truncates() {
        let input = (0..8).map(|i| scored(&format!("d{i}"), 0.35 + i as f32 * 0.05)).collect();
        let result = select_top(input, 0.3, 5);
        assert_eq!(result.len(), 5);
        assert_eq!(result[0].document.title, "d7");
        assert!(result.windows(2).all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert!(result.iter().all(|d| d.relevance_score > 0.3));
    }

    #[test]
    fn select_top_ties_keep_input_order() {
        let input = vec![
            scored("first", 0.8),
            scored("high", 0.9),
            scored("second", 0.8),
            scored("third", 0.8),
        ];
        let titles: Vec<_> = select_top(input, 0.3, 5)
            .into_iter()
            .map(|d| d.document.title)
            .collect();
        assert_eq!(titles, ["high", "first", "second", "third"]);
    }

    #[test]
    fn scored_document_serialises_flat() {
        let json = serde_json::to_value(scored("a", 0.5)).unwrap();
        assert_eq!(json["title"], "a");
        assert_eq!(json["content"], "text");
        assert_eq!(json["relevance_score"], 0.5);
    }

    #[tokio::test]
    async fn rank_filters_by_threshold() {
        let embedder = TableEmbedder(vec![
            ("q", vec![1.0, 0.0]),
            ("close", vec![3.0, 4.0]),
            ("far", vec![0.0, 1.0]),
        ]);
        // close scores exactly 0.6, so a 0.6 threshold excludes it.
        let result = ranker(embedder, 0.6, 5)
            .rank("q", vec![doc("close", "close"), doc("far", "far")])
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn rank_scores_empty_and_failed_documents_zero() {
        let embedder = TableEmbedder(vec![("q", vec![1.0, 0.0]), ("good", vec![1.0, 0.1])]);
        let result = ranker(embedder, -0.5, 5)
            .rank(
                "q",
                vec![doc("empty", ""), doc("good", "good"), doc("broken", "unknown")],
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].document.title, "good");
        assert_eq!(result[1].document.title, "empty");
        assert_eq!(result[1].relevance_score, 0.0);
        assert_eq!(result[2].relevance_score, 0.0);
    }

    #[tokio::test]
    async fn rank_query_embedding_failure_is_error() {
        let embedder = TableEmbedder(vec![]);
        let err = ranker(embedder, 0.3, 5)
            .rank("q", vec![doc("a", "a")])
            .await
            .unwrap_err();
        assert!(matches!(err, SiftError::Embedding(_)));
    }

    #[tokio::test]
    async fn rank_no_documents_is_empty() {
        let result = ranker(HashedEmbedder::new(32), 0.3, 5)
            .rank("anything", Vec::new())
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn hashed_ranking_is_deterministic() {
        let ranker = ranker(HashedEmbedder::default(), 0.0, 5);
        let docs = vec![
            doc("a", "rust ownership and borrowing"),
            doc("b", "ownership model of rust values"),
        ];
        let first = ranker.rank("rust ownership model", docs.clone()).await.unwrap();
        let second = ranker.rank("rust ownership model", docs).await.unwrap();
        assert_eq!(first, second);
    }
}
