//! Shared helpers for the integration tests.

use adf_babel::adf::{Document, Node};
use adf_babel::{ConvertOptions, Converter};
use serde_json::Value;

/// Markdown → ADF with default options.
pub fn to_adf(markdown: &str) -> Document {
    Converter::default()
        .convert(markdown)
        .expect("forward conversion succeeds")
        .document
}

/// ADF → markdown with default options.
pub fn to_markdown(document: &Document) -> String {
    Converter::default()
        .convert_reverse(document)
        .expect("reverse conversion succeeds")
}

pub fn strict() -> Converter {
    Converter::new(ConvertOptions::strict())
}

/// A document from the JSON of its `content` array.
pub fn doc(content: Value) -> Document {
    serde_json::from_value(serde_json::json!({
        "version": 1,
        "type": "doc",
        "content": content,
    }))
    .expect("valid ADF")
}

pub fn types(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|node| node.node_type.as_str()).collect()
}

/// Generated `localId`s differ on every run.
pub fn strip_local_ids(nodes: &mut [Node]) {
    for node in nodes {
        if let Some(attrs) = node.attrs.as_mut() {
            attrs.remove("localId");
        }
        if let Some(content) = node.content.as_mut() {
            strip_local_ids(content);
        }
    }
}
