//! DuckDuckGo HTML provider — no API key required.
//!
//! Uses the HTML-only endpoint at `https://html.duckduckgo.com/html/`
//! which needs no JavaScript and tolerates automated requests.

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::types::Candidate;

/// Default HTML search endpoint.
const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo HTML search scraper.
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    /// Create a provider sharing the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }

    /// Point the provider at a different endpoint (used by tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Extract the target URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
    /// the `uddg` parameter holds the real URL.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Candidate>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Provider(format!("DuckDuckGo request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Provider(format!(
                "DuckDuckGo returned HTTP {}",
                status.as_u16()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Provider(format!("DuckDuckGo response read failed: {e}")))?;

        parse_duckduckgo_html(&html, max_results)
    }

    fn name(&self) -> &str {
        "DuckDuckGo"
    }
}

/// Parse a DuckDuckGo HTML result page into candidates, skipping ads.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<Candidate>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;

    let mut candidates = Vec::new();

    for element in document.select(&result_sel) {
        if candidates.len() >= max_results {
            break;
        }

        let Some(anchor) = element.select(&title_sel).next() else {
            continue;
        };

        let title = anchor.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(DuckDuckGoProvider::extract_url)
            .filter(|u| !u.trim().is_empty())
        else {
            continue;
        };

        candidates.push(Candidate { title, url });
    }

    tracing::debug!(count = candidates.len(), "DuckDuckGo results parsed");
    Ok(candidates)
}
