//! Markdown serialization (generic tree → markdown text)
//!
//! Pipeline: owned [`Node`] tree → Comrak AST → markdown string (comrak's
//! CommonMark formatter).
//!
//! Containers have no CommonMark equivalent and are written as raw `~~~kind`
//! fences. Their inner text is rendered first, so the fence can be made one
//! tilde longer than any fence inside it; the output then parses back without
//! relying on the nesting heuristics.
//!
//! Annotations are not rendered here. The annotation processor lowers them into
//! HTML nodes before the tree reaches this module.

use crate::common::attributes::render_fence_header;
use crate::error::ConvertError;
use crate::ir::nodes::{Container, Node, NodeKind, TableCellAlignment};
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeHtmlBlock, NodeLink,
    NodeList, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena, ComrakOptions};
use std::cell::RefCell;

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = super::parser::default_comrak_options();
    // Raw HTML carries annotations and container fences
    options.render.unsafe_ = true;
    options
}

/// Serialize a generic tree to markdown.
pub fn serialize_markdown(root: &Node) -> Result<String, ConvertError> {
    render_blocks(std::slice::from_ref(root))
}

fn render_blocks(nodes: &[Node]) -> Result<String, ConvertError> {
    let arena = Arena::new();
    let root = alloc(&arena, NodeValue::Document);
    for node in nodes {
        append_node(&arena, root, node)?;
    }

    let mut output = Vec::new();
    let options = default_comrak_options();
    format_commonmark(root, &options, &mut output)
        .map_err(|e| ConvertError::Serialization(format!("Comrak serialization failed: {e}")))?;

    String::from_utf8(output)
        .map_err(|e| ConvertError::Serialization(format!("UTF-8 conversion failed: {e}")))
}

fn alloc<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn append_node<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    node: &Node,
) -> Result<(), ConvertError> {
    let value = match &node.kind {
        // Transparent wrappers: their children go straight into the parent
        NodeKind::Document | NodeKind::Span { .. } => {
            for child in &node.children {
                append_node(arena, parent, child)?;
            }
            return Ok(());
        }
        NodeKind::Container(container) => {
            let literal = render_container(container, &node.children)?;
            parent.append(alloc(
                arena,
                NodeValue::HtmlBlock(NodeHtmlBlock {
                    block_type: 0,
                    literal,
                }),
            ));
            return Ok(());
        }
        NodeKind::Unsupported { text, .. } => {
            let text_node = alloc(arena, NodeValue::Text(text.clone()));
            if accepts_inline(parent) {
                parent.append(text_node);
            } else {
                let paragraph = alloc(arena, NodeValue::Paragraph);
                parent.append(paragraph);
                paragraph.append(text_node);
            }
            return Ok(());
        }

        NodeKind::FrontMatter(raw) => NodeValue::FrontMatter(raw.clone()),
        NodeKind::Paragraph => NodeValue::Paragraph,
        NodeKind::Heading { level } => NodeValue::Heading(NodeHeading {
            level: (*level).clamp(1, 6),
            setext: false,
        }),
        NodeKind::BlockQuote => NodeValue::BlockQuote,
        NodeKind::List { ordered, start, tight } => NodeValue::List(list_data(*ordered, *start, *tight)),
        NodeKind::Item => NodeValue::Item(parent_list(parent)),
        NodeKind::TaskItem { checked } => NodeValue::TaskItem(checked.then_some('x')),
        NodeKind::CodeBlock { info, literal, .. } => NodeValue::CodeBlock(NodeCodeBlock {
            fenced: true,
            fence_char: b'`',
            fence_length: 3,
            fence_offset: 0,
            info: info.clone(),
            literal: literal.clone(),
        }),
        NodeKind::HtmlBlock(html) => NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal: html.clone(),
        }),
        NodeKind::ThematicBreak => NodeValue::ThematicBreak,
        NodeKind::Table { alignments } => NodeValue::Table(NodeTable {
            alignments: alignments.iter().map(table_alignment).collect(),
            num_columns: alignments.len(),
            num_rows: node.children.len(),
            num_nonempty_cells: 0,
        }),
        NodeKind::TableRow { header } => NodeValue::TableRow(*header),
        NodeKind::TableCell => NodeValue::TableCell,

        NodeKind::Text(text) => NodeValue::Text(text.clone()),
        NodeKind::SoftBreak => NodeValue::SoftBreak,
        NodeKind::LineBreak => NodeValue::LineBreak,
        NodeKind::Code(literal) => NodeValue::Code(NodeCode {
            num_backticks: 1,
            literal: literal.clone(),
        }),
        NodeKind::HtmlInline(html) => NodeValue::HtmlInline(html.clone()),
        NodeKind::Emph => NodeValue::Emph,
        NodeKind::Strong => NodeValue::Strong,
        NodeKind::Strikethrough => NodeValue::Strikethrough,
        NodeKind::Superscript => NodeValue::Superscript,
        NodeKind::Link { url, title } => NodeValue::Link(NodeLink {
            url: url.clone(),
            title: title.clone(),
        }),
        NodeKind::Image { url, title } => NodeValue::Image(NodeLink {
            url: url.clone(),
            title: title.clone(),
        }),
    };

    let created = alloc(arena, value);
    parent.append(created);
    for child in &node.children {
        append_node(arena, created, child)?;
    }
    Ok(())
}

fn accepts_inline<'a>(node: &'a AstNode<'a>) -> bool {
    matches!(
        node.data.borrow().value,
        NodeValue::Paragraph
            | NodeValue::Heading(_)
            | NodeValue::TableCell
            | NodeValue::Emph
            | NodeValue::Strong
            | NodeValue::Strikethrough
            | NodeValue::Superscript
            | NodeValue::Link(_)
            | NodeValue::Image(_)
    )
}

fn list_data(ordered: bool, start: usize, tight: bool) -> NodeList {
    NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight,
    }
}

fn parent_list<'a>(parent: &'a AstNode<'a>) -> NodeList {
    match parent.data.borrow().value {
        NodeValue::List(list) => list,
        _ => list_data(false, 1, true),
    }
}

fn table_alignment(alignment: &TableCellAlignment) -> TableAlignment {
    match alignment {
        TableCellAlignment::Left => TableAlignment::Left,
        TableCellAlignment::Center => TableAlignment::Center,
        TableCellAlignment::Right => TableAlignment::Right,
        TableCellAlignment::None => TableAlignment::None,
    }
}

/// `~~~kind attrs\n<inner>\n~~~`, with a fence longer than any nested one.
fn render_container(container: &Container, children: &[Node]) -> Result<String, ConvertError> {
    let inner = match &container.raw {
        Some(raw) => raw.clone(),
        None => render_blocks(children)?,
    };
    let inner = inner.trim_end_matches('\n');
    let fence = "~".repeat(longest_tilde_fence(inner).max(2) + 1);

    let mut out = format!("{fence}{}", container.kind.name());
    let header = render_fence_header(&container.attributes);
    if !header.is_empty() {
        out.push(' ');
        out.push_str(&header);
    }
    out.push('\n');
    if !inner.is_empty() {
        out.push_str(inner);
        out.push('\n');
    }
    out.push_str(&fence);
    out.push('\n');
    Ok(out)
}

fn longest_tilde_fence(text: &str) -> usize {
    text.lines()
        .map(|line| line.trim_start().chars().take_while(|c| *c == '~').count())
        .max()
        .unwrap_or(0)
}
