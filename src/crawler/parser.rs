//! HTML parser for extracting links and page data
//!
//! This module handles parsing fetched HTML to extract:
//! - Outgoing links (from `<a href>` tags), absolute and deduplicated
//! - Image URLs (from `<img src>` tags)
//! - The first heading and the first paragraph

use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Most links extracted from one page
pub const MAX_LINKS_PER_PAGE: usize = 1000;

/// Largest HTML body the extractor accepts
pub const MAX_HTML_BYTES: usize = 10 * 1024 * 1024;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    /// The URL the page was fetched from
    pub url: String,

    /// Text of the first `<h1>`
    pub h1: Option<String>,

    /// Text of the first `<p>` inside `<main>`, or the first `<p>` overall
    pub first_paragraph: Option<String>,

    /// Absolute outgoing links, in document order, without duplicates
    pub outgoing_links: Vec<String>,

    /// Absolute image URLs, in document order
    pub image_urls: Vec<String>,
}

/// Parses HTML content and extracts links and page data
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` resolved against `page_url`
/// - `<a href="">`, which resolves to the page itself
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Bare `#` links
/// - Anything that does not resolve to http(s)
/// - Duplicates within the page, and everything past [`MAX_LINKS_PER_PAGE`]
///
/// # Example
///
/// ```
/// use sitewalk::crawler::parse_page;
///
/// let html = r#"<html><body><h1>Hi</h1><a href="/page">Link</a></body></html>"#;
/// let page = parse_page(html, "https://example.com/").unwrap();
/// assert_eq!(page.h1.as_deref(), Some("Hi"));
/// assert_eq!(page.outgoing_links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_page(html: &str, page_url: &str) -> Result<PageData, ExtractError> {
    check_size(html)?;
    let base = parse_base(page_url)?;

    if html.is_empty() {
        return Ok(PageData {
            url: page_url.to_string(),
            ..PageData::default()
        });
    }

    let document = Html::parse_document(html);

    Ok(PageData {
        url: page_url.to_string(),
        h1: extract_h1(&document),
        first_paragraph: extract_first_paragraph(&document),
        outgoing_links: collect_links(&document, &base),
        image_urls: collect_images(&document, &base),
    })
}

/// Extracts only the outgoing links of a page
pub fn extract_links(html: &str, base_url: &str) -> Result<Vec<String>, ExtractError> {
    check_size(html)?;
    let base = parse_base(base_url)?;

    if html.is_empty() {
        return Ok(Vec::new());
    }

    Ok(collect_links(&Html::parse_document(html), &base))
}

/// Extracts only the image URLs of a page
pub fn extract_image_urls(html: &str, base_url: &str) -> Result<Vec<String>, ExtractError> {
    check_size(html)?;
    let base = parse_base(base_url)?;
    Ok(collect_images(&Html::parse_document(html), &base))
}

fn check_size(html: &str) -> Result<(), ExtractError> {
    if html.len() > MAX_HTML_BYTES {
        return Err(ExtractError::BodyTooLarge {
            size: html.len(),
            limit: MAX_HTML_BYTES,
        });
    }
    Ok(())
}

fn parse_base(base_url: &str) -> Result<Url, ExtractError> {
    Url::parse(base_url).map_err(|e| ExtractError::InvalidBase(format!("{}: {}", base_url, e)))
}

fn collect_links(document: &Html, base: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        if links.len() >= MAX_LINKS_PER_PAGE {
            break;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(absolute) = resolve_link(href, base) {
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href == "#"
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}

fn collect_images(document: &Html, base: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .filter_map(|src| base.join(src).ok())
        .map(|url| url.to_string())
        .collect()
}

fn extract_h1(document: &Html) -> Option<String> {
    let selector = Selector::parse("h1").ok()?;
    document.select(&selector).next().and_then(element_text)
}

fn extract_first_paragraph(document: &Html) -> Option<String> {
    let main_p = Selector::parse("main p").ok()?;
    let main = Selector::parse("main").ok()?;
    let any_p = Selector::parse("p").ok()?;

    if document.select(&main).next().is_some() {
        if let Some(text) = document.select(&main_p).next().and_then(element_text) {
            return Some(text);
        }
    }

    document.select(&any_p).next().and_then(element_text)
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}
