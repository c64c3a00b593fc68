//! HTML content extraction — isolates the readable text of a page.
//!
//! Parses raw HTML, picks the main content element, walks its subtree while
//! skipping boilerplate (scripts, styles, navigation, forms, landmark regions),
//! and returns clean text suitable for embedding.

use crate::error::{Result, SearchError};
use crate::types::PageContent;
use scraper::{ElementRef, Html, Node, Selector};

/// Default maximum characters to return from extracted content.
pub const DEFAULT_MAX_CHARS: usize = 100_000;

/// Suffix appended when extracted text hits the character limit.
const TRUNCATION_MARKER: &str = "\n\n[Content truncated]";

/// Content roots tried in priority order.
const CONTENT_ROOTS: &[&str] = &["article", "main", "[role=\"main\"]", "#content", "body"];

/// Elements whose entire subtree is never readable content.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "form",
    "template", "button",
];

/// ARIA landmark roles that mark non-content regions.
const BOILERPLATE_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "complementary"];

/// Elements that end a line without starting a paragraph.
const LINE_TAGS: &[&str] = &["br", "li", "tr", "dt", "dd"];

/// Elements that are separated from their neighbours by a blank line.
const PARAGRAPH_TAGS: &[&str] = &[
    "p", "div", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "table", "section", "article",
    "main", "blockquote", "pre", "figcaption", "hr",
];

/// Extract the readable text of a page, or `""` if there is none.
///
/// This is the degraded form used by the fetcher: extraction failure is not
/// an error, just an empty document.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let text = normalise_whitespace(&extract_main_text(&document));
    truncate_to_limit(&text, max_chars)
}

/// Extract readable text content from raw HTML.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content(html: &str, url: &str) -> Result<PageContent> {
    extract_content_with_limit(html, url, DEFAULT_MAX_CHARS)
}

/// Extract readable text content from raw HTML with a custom character limit.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content_with_limit(html: &str, url: &str, max_chars: usize) -> Result<PageContent> {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let text = normalise_whitespace(&extract_main_text(&document));
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }

    let text = truncate_to_limit(&text, max_chars);
    let word_count = text.split_whitespace().count();

    Ok(PageContent {
        url: url.to_owned(),
        title,
        text,
        word_count,
    })
}

/// Page title from `<title>`, falling back to the first `<h1>`.
fn extract_title(document: &Html) -> String {
    ["title", "h1"]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .filter_map(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_owned())
        })
        .find(|title| !title.is_empty())
        .unwrap_or_default()
}

/// Text of the first content root that yields any non-boilerplate text.
fn extract_main_text(document: &Html) -> String {
    for root in CONTENT_ROOTS {
        let Ok(selector) = Selector::parse(root) else {
            continue;
        };
        for element in document.select(&selector) {
            if is_boilerplate(&element) {
                continue;
            }
            let mut text = String::new();
            collect_text(element, &mut text);
            if !text.trim().is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Append the text under `element` to `out`, skipping boilerplate subtrees.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source line breaks are ordinary whitespace; only block
            // elements start new lines.
            Node::Text(text) => out.extend(text.chars().map(|ch| match ch {
                '\n' | '\r' => ' ',
                other => other,
            })),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_boilerplate(&child_el) {
                    continue;
                }
                let (before, after) = block_breaks(child_el.value().name());
                out.push_str(before);
                collect_text(child_el, out);
                out.push_str(after);
            }
            _ => {}
        }
    }
}

/// Separators emitted before and after an element's text.
fn block_breaks(tag: &str) -> (&'static str, &'static str) {
    if PARAGRAPH_TAGS.contains(&tag) {
        ("\n\n", "\n\n")
    } else if LINE_TAGS.contains(&tag) {
        ("", "\n")
    } else {
        ("", "")
    }
}

fn is_boilerplate(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if BOILERPLATE_TAGS.contains(&value.name()) {
        return true;
    }
    if value.attr("hidden").is_some() || value.attr("aria-hidden") == Some("true") {
        return true;
    }
    value
        .attr("role")
        .is_some_and(|role| BOILERPLATE_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()))
}

/// Collapse whitespace within lines and keep at most one blank line between
/// paragraphs.
fn normalise_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_blank = false;

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            pending_blank = true;
            continue;
        }
        if !result.is_empty() {
            result.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        result.push_str(&collapsed);
        pending_blank = false;
    }

    result
}

/// Keep at most `max_chars` characters, appending the truncation marker
/// when anything is cut.
fn truncate_to_limit(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_owned(),
        Some((end, _)) => {
            let mut truncated = text[..end].to_owned();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
    }
}
