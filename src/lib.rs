//! websift: search the web, fetch candidate pages, and rank them by
//! semantic relevance to a query.
//!
//! # Architecture
//!
//! ```text
//! query → SearchProvider → candidates → Fetcher (concurrent, retried)
//!       → documents → EmbeddingPool → RelevanceRanker → ranked result
//! ```
//!
//! - **Retrieval and fetching** live in [`websift_search`]: providers
//!   (Tavily, DuckDuckGo), the retrying [`Fetcher`](websift_search::Fetcher)
//!   and HTML text extraction
//! - **Embedding**: [`Embedder`] implementations (`all-MiniLM-L6-v2` via ONNX
//!   Runtime, or an offline hashed embedder) run on the blocking pool through
//!   [`EmbeddingPool`]
//! - **Ranking**: cosine similarity, strict threshold, stable top-K
//! - **Orchestration**: [`SearchPipeline`] wires the stages together and
//!   turns every failure into an empty result
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> websift::Result<()> {
//! let config = websift::SiftConfig::load(None)?;
//! let pipeline = websift::SearchPipeline::from_config(&config)?;
//! for doc in pipeline.search("rust ownership model").await {
//!     println!("{:.3} {}", doc.relevance_score, doc.document.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod pipeline;
pub mod rank;

pub use config::{EmbeddingBackend, ProviderKind, SiftConfig};
pub use embedding::{Embedder, EmbeddingPool, HashedEmbedder, MiniLmEmbedder};
pub use error::{Result, SiftError};
pub use pipeline::SearchPipeline;
pub use rank::{RankConfig, RankedResultSet, RelevanceRanker, ScoredDocument, select_top};
pub use websift_search::{Candidate, Document, FetchConfig, FetchOutcome, Fetcher};
