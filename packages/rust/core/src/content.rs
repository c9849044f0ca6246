//! Text extraction for copy/export of project content.
//!
//! Generated content may arrive as HTML or as plain Markdown-ish text. Plain
//! text passes through; HTML is flattened (for the clipboard) or converted to
//! Markdown (for export).

use std::sync::LazyLock;

use contenthub_shared::{ContentHubError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use tracing::debug;

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?[a-z][a-z0-9]*(?:\s[^>]*)?/?>").expect("valid regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n\u{a0}]+").expect("valid regex"));

static MULTI_BLANK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "main", "aside", "blockquote", "pre",
    "ul", "ol", "li", "table", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "figure",
    "figcaption",
];

/// Whether `text` contains HTML markup.
pub fn looks_like_html(text: &str) -> bool {
    HTML_TAG_RE.is_match(text)
}

/// Flatten `text` to plain text: tags removed, block elements on their own
/// lines, at most one blank line in a row.
pub fn to_plain_text(text: &str) -> String {
    if !looks_like_html(text) {
        return MULTI_BLANK_RE
            .replace_all(text.trim(), "\n\n")
            .into_owned();
    }

    let fragment = Html::parse_fragment(text);
    let mut out = String::with_capacity(text.len());
    collect_text(fragment.root_element(), &mut out);

    let lines: Vec<&str> = out.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    MULTI_BLANK_RE
        .replace_all(joined.trim(), "\n\n")
        .into_owned()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&WHITESPACE_RE.replace_all(text, " "));
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
}

/// Convert `text` to Markdown for export. Non-HTML text is returned trimmed.
pub fn to_markdown(text: &str) -> Result<String> {
    if !looks_like_html(text) {
        return Ok(text.trim().to_string());
    }

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "nav", "iframe", "noscript"])
        .build();
    let markdown = converter
        .convert(text)
        .map_err(|e| ContentHubError::parse(format!("markdown conversion failed: {e}")))?;

    debug!(html_len = text.len(), md_len = markdown.len(), "converted to markdown");
    Ok(MULTI_BLANK_RE
        .replace_all(markdown.trim(), "\n\n")
        .into_owned())
}
