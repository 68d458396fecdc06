// src/extract/links.rs
// =============================================================================
// This module turns a page body into an ordered list of absolute URLs.
//
// How it works:
// 1. Decide whether the body is markup at all (content-type header OR a
//    sniff of the early bytes - some servers mislabel directory listings
//    as text/plain, and we still want their links)
// 2. Walk every <a href="..."> element in document order
// 3. Trim, drop self-references and non-navigable schemes
// 4. Resolve each surviving href against the page's final URL
// 5. Strip fragments and de-duplicate, first occurrence wins
//
// Rust concepts:
// - Iterators and closures: For processing the element stream
// - HashSet: For O(1) duplicate detection while keeping a Vec for order
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// href values that navigate nowhere and should never become candidates
const SKIP_HREFS: [&str; 4] = ["#", "./", "../", ".."];

// Schemes a crawler cannot follow
const SKIP_SCHEMES: [&str; 3] = ["javascript:", "mailto:", "tel:"];

// How many leading bytes we sniff for a markup root tag
const SNIFF_LEN: usize = 2048;

// Decides whether a response body is worth parsing as HTML
//
// Two signals, either is enough:
// - the Content-Type header says text/html
// - the early bytes contain an <html tag (mislabeled content)
pub fn looks_like_markup(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        if ct.to_lowercase().contains("text/html") {
            return true;
        }
    }

    // Back off to a char boundary so multi-byte text doesn't panic the slice
    let mut head_end = body.len().min(SNIFF_LEN);
    while !body.is_char_boundary(head_end) {
        head_end -= 1;
    }
    body[..head_end].to_lowercase().contains("<html")
}

// Extracts all outbound links from a page body
//
// Parameters:
//   body: the response body
//   content_type: the Content-Type header, if the server sent one
//   base_url: the page's *final* URL after redirects (resolution base)
//
// Returns: absolute URLs, fragments stripped, in first-occurrence order
// with duplicates removed. Empty if the body isn't recognizable markup
// or the base URL doesn't parse.
pub fn extract_links(body: &str, content_type: Option<&str>, base_url: &str) -> Vec<String> {
    if !looks_like_markup(content_type, body) {
        return Vec::new();
    }

    // Parse the base URL once; without it relative hrefs mean nothing
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Warning: Invalid base URL: {}", base_url);
            return Vec::new();
        }
    };

    let document = Html::parse_document(body);

    // Constant selector, known valid, so unwrap() is fine here
    let selector = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty() || SKIP_HREFS.contains(&href) {
            continue;
        }

        let lowered = href.to_lowercase();
        if SKIP_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            continue;
        }

        if let Some(absolute) = resolve(&base, href) {
            // Stable de-duplication: first occurrence keeps its position
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    }

    links
}

// Resolves a possibly-relative reference against a base URL
//
// Follows standard relative-URL resolution (scheme-relative,
// absolute-path, relative-path, query-only references all work) and
// always strips the fragment, so two addresses differing only by
// fragment collapse into one.
//
// Returns None for references that can't be resolved at all; the
// caller simply drops those.
fn resolve(base: &Url, reference: &str) -> Option<String> {
    match base.join(reference) {
        Ok(mut url) => {
            url.set_fragment(None);
            Some(url.to_string())
        }
        Err(_) => None,
    }
}
