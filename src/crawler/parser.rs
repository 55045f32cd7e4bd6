//! HTML link extraction
//!
//! Parses a page body and resolves every anchor `href` into an absolute URL.

use scraper::{Html, Selector};
use url::Url;

/// Extracts the links of every `<a href>` in an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - every `<a href="...">`, in document order, duplicates kept
/// - absolute, scheme-relative and path-relative hrefs (resolved against `base_url`)
///
/// **Exclude:**
/// - empty or whitespace-only hrefs
/// - fragment-only hrefs (`#section`)
/// - `javascript:` pseudo-URLs
/// - hrefs that fail to resolve (logged, not returned as errors)
///
/// Malformed or partial HTML never aborts extraction; the parser recovers the
/// way browsers do and whatever anchors survive are returned.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use link_tally::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - fragment-only hrefs
/// - javascript: pseudo-URLs
/// - hrefs that cannot be resolved against the base
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if is_javascript(href) {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => Some(absolute_url.to_string()),
        Err(e) => {
            tracing::debug!("Skipping unresolvable link {:?}: {}", href, e);
            None
        }
    }
}

fn is_javascript(href: &str) -> bool {
    href.get(..11)
        .map(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
        .unwrap_or(false)
}
