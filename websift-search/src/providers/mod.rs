//! Concrete search-index providers.
//!
//! Each provider implements [`SearchProvider`](crate::provider::SearchProvider).

mod duckduckgo;
mod tavily;

pub use duckduckgo::DuckDuckGoProvider;
pub use tavily::{DEFAULT_BASE_URL as DEFAULT_TAVILY_BASE_URL, TavilyConfig, TavilyProvider};
