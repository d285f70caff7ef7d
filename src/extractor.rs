//! Content extraction for article summaries
//!
//! Feed summaries are usually HTML fragments. [`clean`] strips markup and page
//! chrome and returns readable plain text with paragraph breaks kept.

use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("literal pattern"));

/// Elements whose whole subtree is dropped
const BOILERPLATE: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe",
    "template",
];

/// Elements that start and end on their own line
const BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "tr",
    "table", "section", "article", "pre", "figure", "figcaption", "hr",
];

/// Turn a raw summary into readable plain text
///
/// Never fails: empty or markup-only input yields an empty string.
pub fn clean(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(raw);
    let mut text = String::with_capacity(raw.len());
    collect_text(fragment.root_element(), &mut text);

    let trimmed_lines = text.lines().map(str::trim).collect::<Vec<_>>().join("\n");

    BLANK_RUNS
        .replace_all(&trimmed_lines, "\n")
        .trim()
        .to_string()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if BOILERPLATE.contains(&name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };

                let is_block = BLOCKS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
