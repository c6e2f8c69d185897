//! Generic tree → ADF.
//!
//! Runs after annotations are attached and fences materialized. Inline content
//! goes through mark resolution and the social token scanner; media found inline
//! is lifted out of its paragraph into a block-level `mediaSingle`.

use super::{table_defaults, MappingContext, MARKS_ATTRIBUTE};
use crate::adf::{self, Attributes, Document, Mark};
use crate::common::marks::{self, Inline, MarkedLeaf};
use crate::common::social::{self, Segment, SocialToken};
use crate::error::{ConvertError, Diagnostics, Stage};
use crate::ir::nodes::{Annotation, Container, ContainerKind, Node, NodeKind};
use crate::options::UnknownNodePolicy;
use serde_json::Value;

/// Build an ADF document from a resolved generic tree.
pub fn build_document(
    root: &Node,
    cx: &MappingContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Document, ConvertError> {
    let mut builder = Builder { cx, diagnostics };
    let content = builder.blocks(&root.children)?;
    Ok(Document::new(content))
}

struct Builder<'a, 'b> {
    cx: &'a MappingContext<'a>,
    diagnostics: &'b mut Diagnostics,
}

/// Mapped inline content.
enum Piece {
    Inline(adf::Node),
    /// A `mediaSingle` that has to leave the enclosing paragraph
    Media(adf::Node),
}

impl Builder<'_, '_> {
    fn blocks(&mut self, nodes: &[Node]) -> Result<Vec<adf::Node>, ConvertError> {
        let mut out = Vec::new();
        for node in nodes {
            self.block(node, &mut out)?;
        }
        out.retain(|node| !is_blank_paragraph(node));
        Ok(out)
    }

    fn block(&mut self, node: &Node, out: &mut Vec<adf::Node>) -> Result<(), ConvertError> {
        let mut built = match &node.kind {
            NodeKind::Document | NodeKind::Item | NodeKind::TaskItem { .. } => {
                out.extend(self.blocks(&node.children)?);
                return Ok(());
            }
            NodeKind::FrontMatter(_) => return Ok(()),
            NodeKind::Paragraph => return self.paragraph(node, out),
            NodeKind::Heading { level } => {
                let content = self.inline_only(&node.children)?;
                adf::Node::new("heading")
                    .with_attr("level", (*level).clamp(1, 6))
                    .with_content(content)
            }
            NodeKind::BlockQuote => {
                adf::Node::new("blockquote").with_content(non_empty(self.blocks(&node.children)?))
            }
            NodeKind::List { ordered, start, .. } => self.list(node, *ordered, *start)?,
            NodeKind::CodeBlock { info, literal, .. } => code_block(info, literal),
            NodeKind::HtmlBlock(html) if is_comment(html) => return Ok(()),
            NodeKind::HtmlBlock(html) => return self.unknown("html", html, out),
            NodeKind::ThematicBreak => adf::Node::new("rule"),
            NodeKind::Table { .. } => self.table(node)?,
            NodeKind::Container(container) => self.container(container, node)?,
            NodeKind::Unsupported { label, text } => return self.unknown(label, text, out),
            // Inline content (or a stray row) outside any paragraph
            _ => return self.paragraph(&Node::paragraph(vec![node.clone()]), out),
        };
        self.apply_annotations(&mut built, &node.annotations);
        out.push(built);
        Ok(())
    }

    /// A paragraph splits around any media it contains.
    fn paragraph(&mut self, node: &Node, out: &mut Vec<adf::Node>) -> Result<(), ConvertError> {
        let pieces = self.inline(&node.children)?;
        let mut blocks = split_pieces(pieces);
        if blocks.is_empty() {
            return Ok(());
        }

        for annotation in &node.annotations {
            let kind = annotation.target_kind.as_str();
            let target = if kind == "media" {
                blocks
                    .iter_mut()
                    .find(|block| block.is("mediaSingle"))
                    .and_then(|single| single.content.as_mut())
                    .and_then(|content| content.first_mut())
            } else if blocks.len() == 1 && kind == "paragraph" {
                // A paragraph holding only an image is annotated as written
                blocks.first_mut()
            } else {
                blocks
                    .iter_mut()
                    .find(|block| matches_kind(kind, &block.node_type))
            };
            match target {
                Some(target) => merge_annotation(target, annotation),
                None => self.mismatch(annotation, "paragraph"),
            }
        }
        out.extend(blocks);
        Ok(())
    }

    fn list(&mut self, node: &Node, ordered: bool, start: usize) -> Result<adf::Node, ConvertError> {
        let is_task_list = !node.children.is_empty()
            && node
                .children
                .iter()
                .all(|item| matches!(item.kind, NodeKind::TaskItem { .. }));
        if is_task_list {
            return self.task_list(node);
        }

        let mut items = Vec::new();
        for item in &node.children {
            let mut list_item =
                adf::Node::new("listItem").with_content(non_empty(self.blocks(&item.children)?));
            self.apply_annotations(&mut list_item, &item.annotations);
            items.push(list_item);
        }

        let list = if ordered {
            let list = adf::Node::new("orderedList");
            if start != 1 {
                list.with_attr("order", start)
            } else {
                list
            }
        } else {
            adf::Node::new("bulletList")
        };
        Ok(list.with_content(items))
    }

    /// Task items hold inline content only; nested lists follow their item.
    fn task_list(&mut self, node: &Node) -> Result<adf::Node, ConvertError> {
        let mut content = Vec::new();
        for item in &node.children {
            let checked = matches!(item.kind, NodeKind::TaskItem { checked: true });
            let mut inline = Vec::new();
            let mut nested = Vec::new();

            for child in &item.children {
                match &child.kind {
                    NodeKind::List { .. } => self.block(child, &mut nested)?,
                    NodeKind::Paragraph | NodeKind::Heading { .. } => {
                        if !inline.is_empty() {
                            inline.push(adf::Node::new("hardBreak"));
                        }
                        inline.extend(self.inline_only(&child.children)?);
                    }
                    _ => {
                        let text = child.text_content();
                        if !text.trim().is_empty() {
                            if !inline.is_empty() {
                                inline.push(adf::Node::new("hardBreak"));
                            }
                            inline.push(adf::Node::text(text.trim_end(), Vec::new()));
                        }
                    }
                }
            }

            let mut task_item = adf::Node::new("taskItem")
                .with_attr("localId", local_id())
                .with_attr("state", if checked { "DONE" } else { "TODO" });
            if !inline.is_empty() {
                task_item = task_item.with_content(inline);
            }
            self.apply_annotations(&mut task_item, &item.annotations);
            content.push(task_item);
            content.extend(nested);
        }
        Ok(adf::Node::new("taskList")
            .with_attr("localId", local_id())
            .with_content(content))
    }

    fn table(&mut self, node: &Node) -> Result<adf::Node, ConvertError> {
        let mut rows = Vec::new();
        for row in &node.children {
            let header = matches!(row.kind, NodeKind::TableRow { header: true });
            let mut cells = Vec::new();
            for cell in &row.children {
                let forced = cell.annotations.iter().rev().find_map(|annotation| {
                    matches!(annotation.target_kind.as_str(), "tableCell" | "tableHeader")
                        .then(|| annotation.target_kind.clone())
                });
                let cell_type = forced.unwrap_or_else(|| {
                    if header { "tableHeader" } else { "tableCell" }.to_string()
                });

                let mut content = split_pieces(self.inline(&cell.children)?);
                if content.is_empty() {
                    content.push(adf::Node::new("paragraph"));
                }
                let mut built = adf::Node::new(cell_type).with_content(content);
                self.apply_annotations(&mut built, &cell.annotations);
                cells.push(built);
            }
            let mut built_row = adf::Node::new("tableRow").with_content(cells);
            self.apply_annotations(&mut built_row, &row.annotations);
            rows.push(built_row);
        }
        Ok(adf::Node::new("table")
            .with_attrs(table_defaults())
            .with_content(rows))
    }

    fn container(&mut self, container: &Container, node: &Node) -> Result<adf::Node, ConvertError> {
        let mut attrs = container.attributes.clone();
        let built = match container.kind {
            ContainerKind::Panel => {
                let panel_type = attrs
                    .remove("panelType")
                    .or_else(|| attrs.remove("type"))
                    .unwrap_or_else(|| Value::String("info".to_string()));
                attrs.insert("panelType".to_string(), panel_type);
                adf::Node::new("panel")
                    .with_attrs(attrs)
                    .with_content(non_empty(self.blocks(&node.children)?))
            }
            ContainerKind::Expand | ContainerKind::NestedExpand => adf::Node::new(container.kind.name())
                .with_attrs(attrs)
                .with_content(non_empty(self.blocks(&node.children)?)),
            ContainerKind::MediaSingle => {
                if !attrs.contains_key("layout") {
                    attrs.insert("layout".to_string(), Value::String("center".to_string()));
                }
                let media = self.container_media(&node.children)?;
                adf::Node::new("mediaSingle").with_attrs(attrs).with_content(media)
            }
            ContainerKind::MediaGroup => {
                let raw = container.raw.as_deref().unwrap_or_default();
                let media = social::media_references(raw, self.cx.emoji)
                    .into_iter()
                    .map(|(id, alt)| media_node(&format!("media:{id}"), &alt))
                    .collect();
                adf::Node::new("mediaGroup").with_attrs(attrs).with_content(media)
            }
        };
        Ok(built)
    }

    /// Media of a `~~~mediaSingle` body, with per-paragraph `media` annotations.
    fn container_media(&mut self, children: &[Node]) -> Result<Vec<adf::Node>, ConvertError> {
        let mut media = Vec::new();
        for child in children {
            if !matches!(child.kind, NodeKind::Paragraph) {
                continue;
            }
            let mut found = Vec::new();
            for piece in self.inline(&child.children)? {
                if let Piece::Media(single) = piece {
                    found.extend(single.content.unwrap_or_default());
                }
            }
            for annotation in &child.annotations {
                if annotation.target_kind == "media" {
                    for item in &mut found {
                        merge_annotation(item, annotation);
                    }
                } else {
                    self.mismatch(annotation, "media");
                }
            }
            media.extend(found);
        }
        Ok(media)
    }

    fn inline(&mut self, nodes: &[Node]) -> Result<Vec<Piece>, ConvertError> {
        let mut pieces = Vec::new();
        for inline in marks::resolve(nodes) {
            match inline {
                Inline::Leaf(leaf) => self.leaf(leaf, &mut pieces),
                Inline::HardBreak => pieces.push(Piece::Inline(adf::Node::new("hardBreak"))),
                Inline::Image { url, alt, .. } => pieces.push(Piece::Media(media_single(&url, &alt))),
                Inline::Card { url } => {
                    pieces.push(Piece::Inline(adf::Node::new("inlineCard").with_attr("url", url)))
                }
                Inline::Raw { text, .. } if is_line_break_html(&text) => {
                    pieces.push(Piece::Inline(adf::Node::new("hardBreak")))
                }
                Inline::Raw { label, text } => {
                    self.diagnostics
                        .fail_or_warn(Stage::Mapping, ConvertError::SchemaMapping(label.clone()))?;
                    if self.cx.options.unknown_nodes == UnknownNodePolicy::Placeholder {
                        pieces.push(Piece::Inline(adf::Node::text(
                            placeholder_text(&label, &text),
                            Vec::new(),
                        )));
                    }
                }
            }
        }
        Ok(pieces)
    }

    /// Inline content for nodes that cannot hold media: media degrade to text.
    fn inline_only(&mut self, nodes: &[Node]) -> Result<Vec<adf::Node>, ConvertError> {
        Ok(self
            .inline(nodes)?
            .into_iter()
            .map(|piece| match piece {
                Piece::Inline(node) => node,
                Piece::Media(single) => adf::Node::text(media_label(&single), Vec::new()),
            })
            .collect())
    }

    fn leaf(&self, leaf: MarkedLeaf, pieces: &mut Vec<Piece>) {
        if leaf.text.is_empty() {
            return;
        }
        // Code text is literal
        if leaf.has_code() {
            pieces.push(Piece::Inline(adf::Node::text(leaf.text, leaf.marks)));
            return;
        }
        for segment in social::scan(&leaf.text, self.cx.emoji) {
            match segment {
                Segment::Text(text) => pieces.push(Piece::Inline(adf::Node::text(text, leaf.marks.clone()))),
                Segment::Token { token, .. } => pieces.push(token_piece(token)),
            }
        }
    }

    fn apply_annotations(&mut self, node: &mut adf::Node, annotations: &[Annotation]) {
        for annotation in annotations {
            if matches_kind(&annotation.target_kind, &node.node_type) {
                merge_annotation(node, annotation);
            } else {
                let node_type = node.node_type.clone();
                self.mismatch(annotation, &node_type);
            }
        }
    }

    fn mismatch(&mut self, annotation: &Annotation, node_type: &str) {
        self.diagnostics.warn(
            Stage::Annotations,
            ConvertError::AnnotationParse {
                raw: annotation.raw.clone(),
                reason: format!(
                    "annotation for `{}` attached to `{node_type}`",
                    annotation.target_kind
                ),
            },
        );
    }

    fn unknown(&mut self, label: &str, text: &str, out: &mut Vec<adf::Node>) -> Result<(), ConvertError> {
        self.diagnostics
            .fail_or_warn(Stage::Mapping, ConvertError::SchemaMapping(label.to_string()))?;
        if self.cx.options.unknown_nodes == UnknownNodePolicy::Placeholder {
            out.push(paragraph_node(vec![adf::Node::text(
                placeholder_text(label, text),
                Vec::new(),
            )]));
        }
        Ok(())
    }
}

fn token_piece(token: SocialToken) -> Piece {
    let node = match token {
        SocialToken::Mention { id } => adf::Node::new("mention").with_attr("id", id),
        SocialToken::Emoji { short_name, text, id } => {
            let emoji = adf::Node::new("emoji")
                .with_attr("shortName", short_name)
                .with_attr("text", text);
            match id {
                Some(id) => emoji.with_attr("id", id),
                None => emoji,
            }
        }
        SocialToken::Date { timestamp } => adf::Node::new("date").with_attr("timestamp", timestamp),
        SocialToken::Status { text, color } => adf::Node::new("status")
            .with_attr("text", text)
            .with_attr("color", color.as_str()),
        SocialToken::InlineCard { url } => adf::Node::new("inlineCard").with_attr("url", url),
        SocialToken::MediaReference { id, alt } => {
            return Piece::Media(media_single(&format!("media:{id}"), &alt))
        }
    };
    Piece::Inline(node)
}

/// Group inline pieces into paragraphs, with lifted media between them.
fn split_pieces(pieces: Vec<Piece>) -> Vec<adf::Node> {
    let mut blocks = Vec::new();
    let mut run = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Inline(node) => run.push(node),
            Piece::Media(single) => {
                blocks.push(paragraph_node(std::mem::take(&mut run)));
                blocks.push(single);
            }
        }
    }
    blocks.push(paragraph_node(run));
    blocks.retain(|block| !is_blank_paragraph(block));
    blocks
}

fn paragraph_node(content: Vec<adf::Node>) -> adf::Node {
    adf::Node::new("paragraph").with_content(content)
}

fn non_empty(content: Vec<adf::Node>) -> Vec<adf::Node> {
    if content.is_empty() {
        vec![adf::Node::new("paragraph")]
    } else {
        content
    }
}

fn is_blank_paragraph(node: &adf::Node) -> bool {
    node.is("paragraph")
        && node.content.is_some()
        && node
            .children()
            .iter()
            .all(|child| child.is("text") && child.text.as_deref().map_or(true, |t| t.trim().is_empty()))
}

fn code_block(info: &str, literal: &str) -> adf::Node {
    let mut node = adf::Node::new("codeBlock");
    if let Some(language) = info.split_whitespace().next() {
        node = node.with_attr("language", language);
    }
    let text = literal.strip_suffix('\n').unwrap_or(literal);
    if !text.is_empty() {
        node = node.with_content(vec![adf::Node::text(text, Vec::new())]);
    }
    node
}

fn media_node(url: &str, alt: &str) -> adf::Node {
    let media = match url.strip_prefix("media:") {
        Some(id) => adf::Node::new("media")
            .with_attr("type", "file")
            .with_attr("id", id)
            .with_attr("collection", ""),
        None => adf::Node::new("media")
            .with_attr("type", "external")
            .with_attr("url", url),
    };
    if alt.is_empty() {
        media
    } else {
        media.with_attr("alt", alt)
    }
}

fn media_single(url: &str, alt: &str) -> adf::Node {
    adf::Node::new("mediaSingle")
        .with_attr("layout", "center")
        .with_content(vec![media_node(url, alt)])
}

fn media_label(single: &adf::Node) -> String {
    let Some(media) = single.children().first() else {
        return String::new();
    };
    media
        .attr_str("alt")
        .or_else(|| media.attr_str("url"))
        .or_else(|| media.attr_str("id"))
        .unwrap_or_default()
        .to_string()
}

/// Exact type, or one of the short aliases annotations may use.
fn matches_kind(kind: &str, node_type: &str) -> bool {
    kind == node_type
        || match kind {
            "cell" | "tableCell" | "tableHeader" => matches!(node_type, "tableCell" | "tableHeader"),
            "list" => matches!(node_type, "bulletList" | "orderedList" | "taskList"),
            "item" => matches!(node_type, "listItem" | "taskItem"),
            _ => false,
        }
}

/// Copy annotation attributes onto `node`. The reserved `marks` key carries
/// block marks.
fn merge_annotation(node: &mut adf::Node, annotation: &Annotation) {
    for (key, value) in &annotation.attributes {
        if key == MARKS_ATTRIBUTE {
            if let Ok(marks) = serde_json::from_value::<Vec<Mark>>(value.clone()) {
                if !marks.is_empty() {
                    node.marks = Some(marks);
                }
                continue;
            }
        }
        node.attrs
            .get_or_insert_with(Attributes::new)
            .insert(key.clone(), value.clone());
    }
}

fn is_comment(html: &str) -> bool {
    let html = html.trim();
    html.starts_with("<!--") && html.ends_with("-->")
}

fn is_line_break_html(html: &str) -> bool {
    matches!(
        html.trim().to_ascii_lowercase().as_str(),
        "<br>" | "<br/>" | "<br />"
    )
}

fn placeholder_text(label: &str, text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        format!("[{label}]")
    } else {
        text.to_string()
    }
}

fn local_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
