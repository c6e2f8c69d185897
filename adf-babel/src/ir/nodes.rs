//! Core data structures for the generic markup tree.

use crate::adf::{Attributes, Mark};

/// A node of the generic tree: a kind, its children and any annotations that
/// were attached to it by the annotation processor.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub annotations: Vec<Annotation>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Blocks
    Document,
    FrontMatter(String),
    Paragraph,
    Heading { level: u8 },
    BlockQuote,
    List { ordered: bool, start: usize, tight: bool },
    Item,
    TaskItem { checked: bool },
    CodeBlock { info: String, literal: String, fenced: bool, fence_char: char },
    HtmlBlock(String),
    ThematicBreak,
    Table { alignments: Vec<TableCellAlignment> },
    TableRow { header: bool },
    TableCell,
    Container(Container),
    /// Parser output with no equivalent here, kept with its text content
    Unsupported { label: String, text: String },

    // Inlines
    Text(String),
    SoftBreak,
    LineBreak,
    Code(String),
    Emph,
    Strong,
    Strikethrough,
    Superscript,
    Link { url: String, title: String },
    Image { url: String, title: String },
    HtmlInline(String),
    /// Inline run wrapped by a span annotation pair
    Span { marks: Vec<Mark> },
}

/// Line span of a node in the source text (1-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub start_line: usize,
    pub end_line: usize,
}

/// Alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCellAlignment {
    Left,
    Center,
    Right,
    None,
}

/// Dialect container materialized from a `~~~kind` fence.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub kind: ContainerKind,
    pub attributes: Attributes,
    /// Inner text kept verbatim (media groups only)
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Panel,
    Expand,
    NestedExpand,
    MediaSingle,
    MediaGroup,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 5] = [
        ContainerKind::Panel,
        ContainerKind::Expand,
        ContainerKind::NestedExpand,
        ContainerKind::MediaSingle,
        ContainerKind::MediaGroup,
    ];

    /// Fence keyword, which is also the ADF node type.
    pub fn name(self) -> &'static str {
        match self {
            ContainerKind::Panel => "panel",
            ContainerKind::Expand => "expand",
            ContainerKind::NestedExpand => "nestedExpand",
            ContainerKind::MediaSingle => "mediaSingle",
            ContainerKind::MediaGroup => "mediaGroup",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Containers whose trailing siblings the nesting heuristic may absorb.
    pub fn absorbs_siblings(self) -> bool {
        matches!(
            self,
            ContainerKind::Panel | ContainerKind::Expand | ContainerKind::NestedExpand
        )
    }
}

/// Out-of-band attributes attached to a node from an annotation comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub target_kind: String,
    pub attributes: Attributes,
    pub raw: String,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            children: Vec::new(),
            annotations: Vec::new(),
            position: None,
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Node {
            children,
            ..Node::new(kind)
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::new(NodeKind::Text(text.into()))
    }

    pub fn document(children: Vec<Node>) -> Self {
        Node::with_children(NodeKind::Document, children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::with_children(NodeKind::Paragraph, children)
    }

    pub fn container(kind: ContainerKind, attributes: Attributes, children: Vec<Node>) -> Self {
        Node::with_children(
            NodeKind::Container(Container {
                kind,
                attributes,
                raw: None,
            }),
            children,
        )
    }

    pub fn annotated(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Paragraphs, headings and table cells: annotations inside them target them.
    pub fn is_content_bearing(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Paragraph | NodeKind::Heading { .. } | NodeKind::TableCell
        )
    }

    pub fn container_kind(&self) -> Option<ContainerKind> {
        match &self.kind {
            NodeKind::Container(container) => Some(container.kind),
            _ => None,
        }
    }

    /// Concatenated text content, soft breaks rendered as newlines.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// True when every inline child is text or a soft break.
    pub fn is_plain_text(&self) -> bool {
        !self.children.is_empty()
            && self
                .children
                .iter()
                .all(|child| matches!(child.kind, NodeKind::Text(_) | NodeKind::SoftBreak))
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Text(text) | NodeKind::Code(text) => out.push_str(text),
        NodeKind::SoftBreak | NodeKind::LineBreak => out.push('\n'),
        _ => {
            for child in &node.children {
                collect_text(child, out);
            }
        }
    }
}
