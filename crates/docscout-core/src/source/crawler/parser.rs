//! HTML to Markdown conversion and link extraction.
//!
//! Uses the scraper crate (html5ever) to walk the parsed document. Output is
//! plain text with just enough Markdown structure for chunking: `h1`/`h2`
//! become `#`/`##` headings and `<pre>` blocks become fenced code blocks.

use super::CrawlError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Elements dropped together with everything inside them.
const STRIPPED_TAGS: &[&str] = &[
    "head", "nav", "header", "footer", "script", "style", "aside", "svg", "form", "noscript",
];

static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Converts an HTML page into Markdown-flavoured text.
///
/// **Example:**
/// ```
/// use docscout_core::source::crawler::parser::html_to_markdown;
///
/// let html = r#"<html><body><h1>Guide</h1><p>Install it.</p></body></html>"#;
/// let md = html_to_markdown(html);
/// assert_eq!(md, "# Guide\n\nInstall it.");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    collect_markdown(document.root_element(), &mut parts);

    let text = parts.join("\n");
    BLANK_LINES_RE.replace_all(&text, "\n\n").trim().to_string()
}

fn collect_markdown(element: ElementRef, parts: &mut Vec<String>) {
    let name = element.value().name();
    if STRIPPED_TAGS.contains(&name) {
        return;
    }

    match name {
        "pre" => {
            let source = element
                .descendants()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "code")
                .unwrap_or(element);
            let code: String = source.text().collect();
            parts.push(format!("\n```{}\n{}\n```\n", detect_lang(source), code));
        }
        "h1" | "h2" => {
            let title = element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            if !title.is_empty() {
                let marker = if name == "h1" { "#" } else { "##" };
                parts.push(format!("\n{} {}\n", marker, title));
            }
        }
        _ => {
            for child in element.children() {
                match child.value() {
                    Node::Text(text) => {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            parts.push(trimmed.to_string());
                        }
                    }
                    Node::Element(_) => {
                        if let Some(child_element) = ElementRef::wrap(child) {
                            collect_markdown(child_element, parts);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Language hint from a `language-*` class, or empty.
fn detect_lang<'a>(element: ElementRef<'a>) -> &'a str {
    element
        .value()
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .unwrap_or("")
}

/// Extracts all links from HTML as absolute URLs without fragment or query.
///
/// **Example:**
/// ```
/// use docscout_core::source::crawler::parser::extract_links;
///
/// let html = r#"<html><body><a href="/docs#intro">Docs</a></body></html>"#;
/// let links = extract_links(html, "https://example.com/page").unwrap();
/// assert_eq!(links, vec!["https://example.com/docs"]);
/// ```
pub fn extract_links(html: &str, base_url: &str) -> Result<Vec<String>, CrawlError> {
    let document = Html::parse_document(html);

    let base = url::Url::parse(base_url)
        .map_err(|e| CrawlError::InvalidUrl(format!("Invalid base URL {}: {}", base_url, e)))?;

    let link_selector = Selector::parse("a[href]")
        .map_err(|e| CrawlError::ParseError(format!("Invalid CSS selector: {:?}", e)))?;

    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for element in document.select(&link_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("mailto:")
            || href.starts_with("javascript:")
        {
            continue;
        }

        let Ok(mut absolute_url) = base.join(href) else {
            continue;
        };
        if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
            continue;
        }
        absolute_url.set_fragment(None);
        absolute_url.set_query(None);

        let link = absolute_url.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    Ok(links)
}

/// Converts a page URL into a cache-relative Markdown path.
///
/// The URL path is trimmed of `/` (empty becomes `index`), characters other
/// than `[A-Za-z0-9_/.-]` become `_`, a `.html`/`.htm` suffix is removed, and
/// `.md` is appended.
pub fn url_to_path(url: &url::Url) -> String {
    let trimmed = url.path().trim_matches('/');
    let raw = if trimmed.is_empty() { "index" } else { trimmed };

    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = sanitized
        .strip_suffix(".html")
        .or_else(|| sanitized.strip_suffix(".htm"))
        .unwrap_or(&sanitized);

    format!("{}.md", stem)
}
