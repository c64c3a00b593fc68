//! Core types for candidates, fetched documents, and extracted pages.

use serde::{Deserialize, Serialize};

/// A `(title, url)` pair returned by a search-index provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result page. Assumed well-formed, not assumed reachable.
    pub url: String,
}

impl Candidate {
    /// Create a candidate from a title and URL.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Attach fetched content, producing a [`Document`].
    pub fn into_document(self, content: String) -> Document {
        Document {
            title: self.title,
            url: self.url,
            content,
        }
    }
}

/// A candidate enriched with its extracted text.
///
/// `content` is empty when the fetch or extraction failed; that is a valid
/// terminal state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The title reported by the provider.
    pub title: String,
    /// The URL that was fetched.
    pub url: String,
    /// Readable text extracted from the page, possibly empty.
    pub content: String,
}

impl Document {
    /// Whether the fetch/extraction produced any text.
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

/// Extracted readable content from a fetched web page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was fetched.
    pub url: String,
    /// The page title extracted from HTML.
    pub title: String,
    /// Cleaned, readable text content with HTML boilerplate stripped.
    pub text: String,
    /// Number of words in the extracted text.
    pub word_count: usize,
}
