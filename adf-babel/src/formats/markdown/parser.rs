//! Markdown parsing (markdown text → generic tree)
//!
//! Pipeline: markdown string → Comrak AST → owned [`Node`] tree.
//!
//! The Comrak arena only lives for the duration of the call; everything the
//! dialect processors need is copied into the owned tree, including source line
//! spans (used to rejoin paragraphs split by inline annotations).

use crate::ir::nodes::{Node, NodeKind, Position, TableCellAlignment};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};

pub(crate) fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    options
}

/// Parse a full document. A leading `---` block becomes a [`NodeKind::FrontMatter`].
pub fn parse_markdown(source: &str) -> Node {
    parse_with(source, &default_comrak_options())
}

/// Parse container inner text: same extensions, but no frontmatter.
pub fn parse_markdown_fragment(source: &str) -> Node {
    let mut options = default_comrak_options();
    options.extension.front_matter_delimiter = None;
    parse_with(source, &options)
}

fn parse_with(source: &str, options: &ComrakOptions) -> Node {
    let arena = Arena::new();
    let root = parse_document(&arena, source, options);
    convert_node(root)
}

fn convert_node<'a>(node: &'a AstNode<'a>) -> Node {
    let data = node.data.borrow();
    let position = Some(Position {
        start_line: data.sourcepos.start.line,
        end_line: data.sourcepos.end.line,
    });

    let kind = match &data.value {
        NodeValue::Document => NodeKind::Document,
        NodeValue::FrontMatter(raw) => NodeKind::FrontMatter(raw.clone()),
        NodeValue::BlockQuote => NodeKind::BlockQuote,
        NodeValue::List(list) => NodeKind::List {
            ordered: list.list_type == ListType::Ordered,
            start: list.start,
            tight: list.tight,
        },
        NodeValue::Item(_) => NodeKind::Item,
        NodeValue::TaskItem(symbol) => NodeKind::TaskItem {
            checked: symbol.is_some_and(|c| c != ' '),
        },
        NodeValue::CodeBlock(code) => NodeKind::CodeBlock {
            info: code.info.clone(),
            literal: code.literal.clone(),
            fenced: code.fenced,
            fence_char: code.fence_char as char,
        },
        NodeValue::HtmlBlock(html) => NodeKind::HtmlBlock(html.literal.clone()),
        NodeValue::Paragraph => NodeKind::Paragraph,
        NodeValue::Heading(heading) => NodeKind::Heading {
            level: heading.level,
        },
        NodeValue::ThematicBreak => NodeKind::ThematicBreak,
        NodeValue::Table(table) => NodeKind::Table {
            alignments: table.alignments.iter().map(convert_alignment).collect(),
        },
        NodeValue::TableRow(header) => NodeKind::TableRow { header: *header },
        NodeValue::TableCell => NodeKind::TableCell,
        NodeValue::Text(text) => NodeKind::Text(text.clone()),
        NodeValue::SoftBreak => NodeKind::SoftBreak,
        NodeValue::LineBreak => NodeKind::LineBreak,
        NodeValue::Code(code) => NodeKind::Code(code.literal.clone()),
        NodeValue::HtmlInline(html) => NodeKind::HtmlInline(html.clone()),
        NodeValue::Emph => NodeKind::Emph,
        NodeValue::Strong => NodeKind::Strong,
        NodeValue::Strikethrough => NodeKind::Strikethrough,
        NodeValue::Superscript => NodeKind::Superscript,
        NodeValue::Link(link) => NodeKind::Link {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(link) => NodeKind::Image {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        // Extensions we do not enable; keep their text so nothing silently vanishes
        other => {
            let mut text = String::new();
            collect_text(node, &mut text);
            return Node {
                position,
                ..Node::new(NodeKind::Unsupported {
                    label: node_label(other).to_string(),
                    text,
                })
            };
        }
    };

    let mut children: Vec<Node> = Vec::new();
    for child in node.children() {
        let converted = convert_node(child);
        // Comrak splits text at every potential delimiter; rejoin for the token scanner
        if let (Some(Node { kind: NodeKind::Text(previous), .. }), NodeKind::Text(text)) =
            (children.last_mut(), &converted.kind)
        {
            previous.push_str(text);
            continue;
        }
        children.push(converted);
    }

    Node {
        kind,
        children,
        annotations: Vec::new(),
        position,
    }
}

/// Name for a node kind the conversion does not map.
fn node_label(value: &NodeValue) -> &'static str {
    match value {
        NodeValue::FootnoteDefinition(_) => "footnote_definition",
        NodeValue::FootnoteReference(_) => "footnote_reference",
        NodeValue::DescriptionList => "description_list",
        NodeValue::DescriptionItem(_) => "description_item",
        NodeValue::DescriptionTerm => "description_term",
        NodeValue::DescriptionDetails => "description_details",
        NodeValue::Math(_) => "math",
        NodeValue::WikiLink(_) => "wikilink",
        NodeValue::MultilineBlockQuote(_) => "multiline_block_quote",
        NodeValue::Underline => "underline",
        NodeValue::SpoileredText => "spoiler",
        NodeValue::Escaped => "escaped",
        NodeValue::EscapedTag(_) => "escaped_tag",
        _ => "unsupported",
    }
}

fn convert_alignment(alignment: &TableAlignment) -> TableCellAlignment {
    match alignment {
        TableAlignment::Left => TableCellAlignment::Left,
        TableAlignment::Center => TableCellAlignment::Center,
        TableAlignment::Right => TableCellAlignment::Right,
        TableAlignment::None => TableCellAlignment::None,
    }
}

fn collect_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push('\n'),
        _ => {
            for child in node.children() {
                collect_text(child, output);
            }
        }
    }
}
