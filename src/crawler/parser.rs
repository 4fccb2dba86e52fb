//! HTML parsing for link discovery and title extraction
//!
//! Both extractors are best-effort: malformed HTML never produces an error,
//! only a shorter result list or the title placeholder.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Placeholder returned when a page has no usable `<title>` element
pub const NO_TITLE: &str = "No Title";

/// Attributes inspected for link discovery, in the order they are examined
const LINK_ATTRIBUTES: [&str; 3] = ["href", "src", "action"];

/// Extracts all linked URLs from an HTML document
///
/// Every element is examined for `href`, `src`, and `action` attributes.
/// Values that are empty after trimming, fragment-only, or `javascript:`
/// (case-insensitive) are skipped. The rest are resolved against `base_url`
/// and returned serialized, in first-seen order, without duplicates.
/// Unresolvable values are skipped silently.
///
/// Running the extractor twice on the same input yields the identical list.
///
/// # Arguments
///
/// * `html` - The HTML content to scan
/// * `base_url` - The URL of the page, used to resolve relative references
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(selector) = Selector::parse("[href], [src], [action]") else {
        return links;
    };

    for element in document.select(&selector) {
        for attribute in LINK_ATTRIBUTES {
            let Some(value) = element.value().attr(attribute) else {
                continue;
            };
            let Some(absolute) = resolve_link(value, base.as_ref()) else {
                continue;
            };
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    }

    links
}

/// Resolves a raw attribute value to an absolute URL string
///
/// Returns None for values the crawler never follows: empty strings,
/// same-page fragments, and `javascript:` pseudo-URLs. Without a parsable
/// base only absolute values survive.
fn resolve_link(value: &str, base: Option<&Url>) -> Option<String> {
    let value = value.trim();

    if value.is_empty() || value.starts_with('#') {
        return None;
    }

    if value
        .get(..11)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("javascript:"))
    {
        return None;
    }

    let resolved = match base {
        Some(base) => base.join(value).ok()?,
        None => Url::parse(value).ok()?,
    };

    Some(resolved.to_string())
}

/// Returns the contents of the first `<title>` element, trimmed
///
/// The scan is a plain substring search; a missing opening or closing tag
/// yields the [`NO_TITLE`] placeholder.
pub fn extract_title(html: &str) -> String {
    let Some(start) = html.find("<title>") else {
        return NO_TITLE.to_string();
    };

    let contents = &html[start + "<title>".len()..];
    let Some(end) = contents.find("</title>") else {
        return NO_TITLE.to_string();
    };

    contents[..end].trim().to_string()
}
