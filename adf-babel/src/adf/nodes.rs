//! Core data structures for ADF documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute map shared by nodes, marks, annotations and fence headers.
pub type Attributes = serde_json::Map<String, Value>;

/// Root of an ADF document: `{version: 1, type: "doc", content: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub content: Vec<Node>,
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Document {
            version: 1,
            doc_type: "doc".to_string(),
            content,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
}

impl Node {
    pub fn new(node_type: impl Into<String>) -> Self {
        Node {
            node_type: node_type.into(),
            attrs: None,
            content: None,
            text: None,
            marks: None,
        }
    }

    /// A text leaf. Empty mark lists are omitted from the output.
    pub fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        let mut node = Node::new("text");
        node.text = Some(text.into());
        if !marks.is_empty() {
            node.marks = Some(marks);
        }
        node
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = Some(content);
        self
    }

    /// Set attributes; an empty map leaves `attrs` absent.
    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = if attrs.is_empty() { None } else { Some(attrs) };
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Attributes::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn is(&self, node_type: &str) -> bool {
        self.node_type == node_type
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref().and_then(|attrs| attrs.get(key))
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    pub fn children(&self) -> &[Node] {
        self.content.as_deref().unwrap_or(&[])
    }

    pub fn marks(&self) -> &[Mark] {
        self.marks.as_deref().unwrap_or(&[])
    }

    /// Concatenated text of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    if let Some(text) = &node.text {
        out.push_str(text);
    }
    for child in node.children() {
        collect_text(child, out);
    }
}

/// An inline (or block) mark such as `strong` or `link`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attributes>,
}

impl Mark {
    pub const CODE: &'static str = "code";
    pub const STRONG: &'static str = "strong";
    pub const EM: &'static str = "em";
    pub const STRIKE: &'static str = "strike";
    pub const LINK: &'static str = "link";
    pub const UNDERLINE: &'static str = "underline";
    pub const TEXT_COLOR: &'static str = "textColor";
    pub const BACKGROUND_COLOR: &'static str = "backgroundColor";
    pub const SUBSUP: &'static str = "subsup";

    pub fn new(mark_type: impl Into<String>) -> Self {
        Mark {
            mark_type: mark_type.into(),
            attrs: None,
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Attributes::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn code() -> Self {
        Self::new(Self::CODE)
    }

    pub fn link(href: &str, title: Option<&str>) -> Self {
        let mark = Self::new(Self::LINK).with_attr("href", href);
        match title {
            Some(title) if !title.is_empty() => mark.with_attr("title", title),
            _ => mark,
        }
    }

    pub fn is(&self, mark_type: &str) -> bool {
        self.mark_type == mark_type
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs
            .as_ref()
            .and_then(|attrs| attrs.get(key))
            .and_then(Value::as_str)
    }

    /// Marks that markdown has no syntax for and that travel through span annotations.
    pub fn is_span_mark(&self) -> bool {
        matches!(
            self.mark_type.as_str(),
            Self::UNDERLINE | Self::TEXT_COLOR | Self::BACKGROUND_COLOR | Self::SUBSUP
        )
    }
}
