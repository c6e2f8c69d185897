//! Annotation side channel.
//!
//! Attributes that markdown has no syntax for travel as HTML comments in a
//! namespace (`adf` by default):
//!
//! ```text
//! <!-- adf:heading id="intro" textAlign="center" -->
//! # Introduction
//!
//! Some <!-- adf:span underline=true -->underlined<!-- /adf:span --> text.
//! ```
//!
//! A standalone comment is a block annotation. It attaches to, in order: the
//! content-bearing node it sits in (paragraph, heading, table cell), the next
//! sibling that is not an annotation, the previous one, or its parent. The
//! document root is never a target.
//!
//! An open/close pair inside inline content is a span annotation. It becomes a
//! [`NodeKind::Span`] carrying the marks named by its attributes.

use crate::adf::{Attributes, Mark};
use crate::common::attributes::{parse_attributes, render_attributes};
use crate::error::{ConvertError, Diagnostics, Stage};
use crate::ir::nodes::{Annotation, Node, NodeKind, Position};
use crate::ir::MarkupParser;
use serde_json::Value;

/// Annotation kind used when regenerating span annotations.
pub const SPAN_KIND: &str = "span";

/// A recognised annotation comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Open { kind: String, attributes: String },
    Close { kind: String },
}

/// Reads and writes annotation comments for one namespace.
#[derive(Debug, Clone)]
pub struct AnnotationSyntax {
    namespace: String,
}

impl AnnotationSyntax {
    pub fn new(namespace: impl Into<String>) -> Self {
        AnnotationSyntax {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Parse a single HTML comment as an annotation tag.
    pub fn parse_tag(&self, html: &str) -> Option<Tag> {
        let inner = html
            .trim()
            .strip_prefix("<!--")?
            .strip_suffix("-->")?
            .trim();
        if inner.contains("-->") {
            return None;
        }

        let (closing, inner) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, inner),
        };
        let rest = inner.strip_prefix(self.namespace.as_str())?.strip_prefix(':')?;
        let kind_len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
            .map_or(rest.len(), |(index, _)| index);
        let (kind, remainder) = rest.split_at(kind_len);
        if !kind.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }

        if closing {
            return remainder.trim().is_empty().then(|| Tag::Close {
                kind: kind.to_string(),
            });
        }
        if !remainder.is_empty() && !remainder.starts_with(char::is_whitespace) {
            return None;
        }
        Some(Tag::Open {
            kind: kind.to_string(),
            attributes: remainder.trim().to_string(),
        })
    }

    /// The tag carried by an HTML node of the generic tree, if any.
    pub fn node_tag(&self, node: &Node) -> Option<Tag> {
        match &node.kind {
            NodeKind::HtmlBlock(html) | NodeKind::HtmlInline(html) => self.parse_tag(html),
            _ => None,
        }
    }

    pub fn open_tag(&self, kind: &str, attributes: &Attributes) -> String {
        let rendered = render_attributes(attributes);
        if rendered.is_empty() {
            format!("<!-- {}:{kind} -->", self.namespace)
        } else {
            format!("<!-- {}:{kind} {rendered} -->", self.namespace)
        }
    }

    pub fn close_tag(&self, kind: &str) -> String {
        format!("<!-- /{}:{kind} -->", self.namespace)
    }

    fn inline_tag(&self, node: &Node) -> Option<Tag> {
        match &node.kind {
            NodeKind::HtmlInline(html) => self.parse_tag(html),
            _ => None,
        }
    }
}

/// Find annotations in `root`, attach them to their targets and remove them.
pub fn process(
    root: &mut Node,
    syntax: &AnnotationSyntax,
    parser: &dyn MarkupParser,
    diagnostics: &mut Diagnostics,
) {
    process_node(root, true, syntax, parser, diagnostics);
}

fn process_node(
    node: &mut Node,
    is_root: bool,
    syntax: &AnnotationSyntax,
    parser: &dyn MarkupParser,
    diagnostics: &mut Diagnostics,
) {
    if node.children.is_empty() {
        return;
    }
    reinline_blocks(&mut node.children, syntax, parser);
    for child in &mut node.children {
        process_node(child, false, syntax, parser, diagnostics);
    }
    pair_spans(&mut node.children, syntax, diagnostics);
    attach_block_annotations(node, is_root, syntax, diagnostics);
}

/// Marks named by a span annotation's kind and attributes.
pub fn span_marks(kind: &str, attributes: &Attributes) -> Vec<Mark> {
    let mut marks = Vec::new();

    let underline = match attributes.get(Mark::UNDERLINE) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag == "true",
        _ => kind == Mark::UNDERLINE,
    };
    if underline {
        marks.push(Mark::new(Mark::UNDERLINE));
    }

    for mark_type in [Mark::TEXT_COLOR, Mark::BACKGROUND_COLOR] {
        if let Some(color) = mark_value(attributes, kind, mark_type, "color") {
            marks.push(Mark::new(mark_type).with_attr("color", color));
        }
    }

    if let Some(variant @ ("sub" | "sup")) = mark_value(attributes, kind, Mark::SUBSUP, "type") {
        marks.push(Mark::new(Mark::SUBSUP).with_attr("type", variant));
    }
    marks
}

/// `mark_type="v"` on any span, or `key="v"` on a span of that kind.
fn mark_value<'a>(attributes: &'a Attributes, kind: &str, mark_type: &str, key: &str) -> Option<&'a str> {
    let string = |name: &str| attributes.get(name).and_then(Value::as_str);
    match string(mark_type) {
        Some(value) => Some(value),
        None if kind == mark_type => string(key),
        None => None,
    }
}

/// Span annotation attributes for marks that markdown cannot express.
pub fn span_attributes(marks: &[Mark]) -> Attributes {
    let mut attributes = Attributes::new();
    for mark in marks {
        match mark.mark_type.as_str() {
            Mark::UNDERLINE => {
                attributes.insert(Mark::UNDERLINE.to_string(), Value::Bool(true));
            }
            Mark::TEXT_COLOR | Mark::BACKGROUND_COLOR => {
                if let Some(color) = mark.attr_str("color") {
                    attributes.insert(mark.mark_type.clone(), Value::String(color.to_string()));
                }
            }
            Mark::SUBSUP => {
                if let Some(variant) = mark.attr_str("type") {
                    attributes.insert(Mark::SUBSUP.to_string(), Value::String(variant.to_string()));
                }
            }
            _ => {}
        }
    }
    attributes
}

/// Lower annotations and span nodes back into comments, the reverse of [`process`].
///
/// Block annotations become a standalone comment right before their node. Table
/// cells cannot hold blocks, so theirs open the cell content instead.
pub fn emit(node: &mut Node, syntax: &AnnotationSyntax) {
    let children = std::mem::take(&mut node.children);
    let mut out = Vec::with_capacity(children.len());
    for mut child in children {
        emit(&mut child, syntax);

        if let NodeKind::Span { marks } = &child.kind {
            let open = syntax.open_tag(SPAN_KIND, &span_attributes(marks));
            out.push(Node::new(NodeKind::HtmlInline(open)));
            out.append(&mut child.children);
            out.push(Node::new(NodeKind::HtmlInline(syntax.close_tag(SPAN_KIND))));
            continue;
        }

        let annotations = std::mem::take(&mut child.annotations);
        if matches!(child.kind, NodeKind::TableCell) {
            let tags = annotations.iter().map(|annotation| {
                Node::new(NodeKind::HtmlInline(
                    syntax.open_tag(&annotation.target_kind, &annotation.attributes),
                ))
            });
            child.children.splice(0..0, tags);
        } else {
            for annotation in &annotations {
                let tag = syntax.open_tag(&annotation.target_kind, &annotation.attributes);
                out.push(Node::new(NodeKind::HtmlBlock(format!("{tag}\n"))));
            }
        }
        out.push(child);
    }
    node.children = out;
}

fn report_problems(raw: &str, problems: Vec<String>, diagnostics: &mut Diagnostics) {
    for reason in problems {
        diagnostics.warn(
            Stage::Annotations,
            ConvertError::AnnotationParse {
                raw: raw.to_string(),
                reason,
            },
        );
    }
}

/// Turn `<!-- ns:kind -->text<!-- /ns:kind -->` pairs into span nodes.
fn pair_spans(children: &mut Vec<Node>, syntax: &AnnotationSyntax, diagnostics: &mut Diagnostics) {
    let mut i = 0;
    while i < children.len() {
        let Some(Tag::Open { kind, attributes }) = syntax.inline_tag(&children[i]) else {
            i += 1;
            continue;
        };
        let Some(close) = matching_close(children, i, &kind, syntax) else {
            i += 1;
            continue;
        };

        let mut inner: Vec<Node> = children.drain(i..=close).collect();
        inner.pop();
        let open = inner.remove(0);
        let raw = match open.kind {
            NodeKind::HtmlInline(html) => html,
            _ => String::new(),
        };
        pair_spans(&mut inner, syntax, diagnostics);

        let parsed = parse_attributes(&attributes);
        report_problems(&raw, parsed.problems, diagnostics);
        let marks = span_marks(&kind, &parsed.attributes);

        if marks.is_empty() {
            diagnostics.warn(
                Stage::Annotations,
                ConvertError::AnnotationParse {
                    raw,
                    reason: "span annotation names no marks".to_string(),
                },
            );
            let len = inner.len();
            children.splice(i..i, inner);
            i += len;
        } else {
            children.insert(i, Node::with_children(NodeKind::Span { marks }, inner));
            i += 1;
        }
    }
}

fn matching_close(
    children: &[Node],
    open: usize,
    kind: &str,
    syntax: &AnnotationSyntax,
) -> Option<usize> {
    let mut depth = 0usize;
    for (index, child) in children.iter().enumerate().skip(open + 1) {
        match syntax.inline_tag(child) {
            Some(Tag::Open { kind: other, .. }) if other == kind => depth += 1,
            Some(Tag::Close { kind: other }) if other == kind => {
                if depth == 0 {
                    return Some(index);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

enum Target {
    Parent,
    Child(usize),
}

fn attach_block_annotations(
    node: &mut Node,
    is_root: bool,
    syntax: &AnnotationSyntax,
    diagnostics: &mut Diagnostics,
) {
    let tags: Vec<Option<Tag>> = node.children.iter().map(|child| syntax.node_tag(child)).collect();
    if tags.iter().all(Option::is_none) {
        return;
    }

    let parent_bearing = node.is_content_bearing();
    let mut attachments = Vec::new();

    for (index, tag) in tags.iter().enumerate() {
        let Some(Tag::Open { kind, attributes }) = tag else {
            continue;
        };
        let raw = match &node.children[index].kind {
            NodeKind::HtmlBlock(html) | NodeKind::HtmlInline(html) => html.trim().to_string(),
            _ => String::new(),
        };
        let parsed = parse_attributes(attributes);
        report_problems(&raw, parsed.problems, diagnostics);

        let target = if parent_bearing {
            Some(Target::Parent)
        } else if let Some(next) = (index + 1..tags.len()).find(|&j| tags[j].is_none()) {
            Some(Target::Child(next))
        } else if let Some(previous) = (0..index).rev().find(|&j| tags[j].is_none()) {
            Some(Target::Child(previous))
        } else if !is_root {
            Some(Target::Parent)
        } else {
            None
        };

        match target {
            Some(target) => attachments.push((
                target,
                Annotation {
                    target_kind: kind.clone(),
                    attributes: parsed.attributes,
                    raw,
                },
            )),
            None => diagnostics.warn(
                Stage::Annotations,
                ConvertError::AnnotationParse {
                    raw,
                    reason: "no node to attach to".to_string(),
                },
            ),
        }
    }

    for (target, annotation) in attachments {
        match target {
            Target::Parent => node.annotations.push(annotation),
            Target::Child(index) => node.children[index].annotations.push(annotation),
        }
    }

    let mut index = 0;
    node.children.retain(|_| {
        let keep = tags[index].is_none();
        index += 1;
        keep
    });
}

/// A paragraph that starts with a span annotation is read by CommonMark as an
/// HTML block. Rebuild it as a paragraph, joining the lines around it that the
/// HTML block split off.
fn reinline_blocks(children: &mut Vec<Node>, syntax: &AnnotationSyntax, parser: &dyn MarkupParser) {
    let mut i = 0;
    while i < children.len() {
        let NodeKind::HtmlBlock(literal) = &children[i].kind else {
            i += 1;
            continue;
        };
        let Some(inlines) = inline_span_line(literal, syntax, parser) else {
            i += 1;
            continue;
        };

        let position = children[i].position;
        let mut paragraph = Node::paragraph(inlines);
        paragraph.position = position;

        if i > 0 && adjacent(children[i - 1].position, position) && is_paragraph(&children[i - 1]) {
            let mut previous = children.remove(i - 1);
            i -= 1;
            previous.children.push(Node::new(NodeKind::SoftBreak));
            previous.children.append(&mut paragraph.children);
            previous.position = span_positions(previous.position, position);
            paragraph = previous;
        }
        if i + 1 < children.len() && adjacent(paragraph.position, children[i + 1].position) && is_paragraph(&children[i + 1]) {
            let mut next = children.remove(i + 1);
            paragraph.children.push(Node::new(NodeKind::SoftBreak));
            paragraph.children.append(&mut next.children);
            paragraph.position = span_positions(paragraph.position, next.position);
        }

        children[i] = paragraph;
        i += 1;
    }
}

fn is_paragraph(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Paragraph)
}

fn adjacent(first: Option<Position>, second: Option<Position>) -> bool {
    matches!((first, second), (Some(a), Some(b)) if a.end_line + 1 == b.start_line)
}

fn span_positions(first: Option<Position>, second: Option<Position>) -> Option<Position> {
    match (first, second) {
        (Some(a), Some(b)) => Some(Position {
            start_line: a.start_line,
            end_line: b.end_line,
        }),
        (a, b) => a.or(b),
    }
}

enum Piece<'a> {
    Comment(&'a str),
    Text(&'a str),
}

fn split_comments(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("<!--") {
        let Some(len) = rest[start..].find("-->") else {
            break;
        };
        let end = start + len + 3;
        if start > 0 {
            pieces.push(Piece::Text(&rest[..start]));
        }
        pieces.push(Piece::Comment(&rest[start..end]));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    pieces
}

fn inline_span_line(literal: &str, syntax: &AnnotationSyntax, parser: &dyn MarkupParser) -> Option<Vec<Node>> {
    let pieces = split_comments(literal.trim_end());
    match pieces.first() {
        Some(Piece::Comment(comment)) if matches!(syntax.parse_tag(comment), Some(Tag::Open { .. })) => {}
        _ => return None,
    }
    if !pieces
        .iter()
        .any(|piece| matches!(piece, Piece::Text(text) if !text.trim().is_empty()))
    {
        return None;
    }

    let mut inlines = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Comment(comment) => inlines.push(Node::new(NodeKind::HtmlInline(comment.to_string()))),
            Piece::Text(text) => inline_text(text, parser, &mut inlines),
        }
    }
    Some(inlines)
}

fn inline_text(text: &str, parser: &dyn MarkupParser, out: &mut Vec<Node>) {
    let core = text.trim();
    if core.is_empty() {
        out.push(Node::text(text));
        return;
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];
    if !leading.is_empty() {
        out.push(Node::text(leading));
    }

    let fragment = parser.parse_fragment(core);
    match fragment.children.as_slice() {
        [paragraph] if is_paragraph(paragraph) => out.extend(paragraph.children.iter().cloned()),
        _ => out.push(Node::text(core)),
    }

    if !trailing.is_empty() {
        out.push(Node::text(trailing));
    }
}
