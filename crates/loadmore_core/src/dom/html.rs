//! HTML parsing and serialization helpers for `MemoryDocument`.
//!
//! Parsing is delegated to `scraper` (html5ever), then copied into a plain
//! owned tree so the arena never borrows parser state.

use scraper::{ElementRef, Html};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Owned parse result handed to the arena builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ParsedNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<ParsedNode>,
    },
    Text(String),
}

/// Parses a full document and returns its `<html>` element.
pub(super) fn parse_document(source: &str) -> ParsedNode {
    let html = Html::parse_document(source);
    convert_element(html.root_element())
}

/// Parses a body-context fragment and returns its top-level nodes.
pub(super) fn parse_fragment(source: &str) -> Vec<ParsedNode> {
    let html = Html::parse_fragment(source);
    match convert_element(html.root_element()) {
        ParsedNode::Element { children, .. } => children,
        text @ ParsedNode::Text(_) => vec![text],
    }
}

fn convert_element(element: ElementRef<'_>) -> ParsedNode {
    let value = element.value();
    let mut children = Vec::new();
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            children.push(convert_element(child_element));
        } else if let Some(text) = child.value().as_text() {
            children.push(ParsedNode::Text(String::from(&**text)));
        }
        // Comments, doctypes and processing instructions are dropped.
    }

    ParsedNode::Element {
        tag: value.name().to_ascii_lowercase(),
        attributes: value
            .attrs()
            .map(|(name, attr_value)| (name.to_string(), attr_value.to_string()))
            .collect(),
        children,
    }
}

pub(super) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(super) fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

pub(super) fn escape_text(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

pub(super) fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}
