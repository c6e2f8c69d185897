//! ADF → generic tree.
//!
//! Attributes that markdown implies (heading level, list order, code language,
//! table defaults, task state) are written as syntax. Everything else is kept
//! as an [`Annotation`] on the node, for the annotation emitter to lower into
//! comments. Known losses: `listItem`, `tableRow` and `taskItem` attributes,
//! extra attributes of mentions and other inline nodes, and mark combinations
//! on code text.

use super::{table_defaults, MappingContext, MARKS_ATTRIBUTE};
use crate::adf::{self, Attributes, Document, Mark};
use crate::common::marks::{nest, Run, Wrapper};
use crate::common::social::{SocialToken, StatusColor};
use crate::error::{ConvertError, Diagnostics, Stage};
use crate::ir::nodes::{Annotation, Container, ContainerKind, Node, NodeKind, TableCellAlignment};
use crate::options::UnknownNodePolicy;
use serde_json::Value;

/// Build a generic tree from an ADF document.
pub fn build_tree(
    document: &Document,
    cx: &MappingContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Node, ConvertError> {
    let mut builder = Builder {
        cx,
        diagnostics,
        in_cell: false,
    };
    Ok(Node::document(builder.blocks(&document.content)?))
}

struct Builder<'a, 'b> {
    cx: &'a MappingContext<'a>,
    diagnostics: &'b mut Diagnostics,
    /// Table cells cannot hold line breaks; they get `<br>` instead
    in_cell: bool,
}

const INLINE_TYPES: [&str; 7] = [
    "text",
    "hardBreak",
    "mention",
    "emoji",
    "date",
    "status",
    "inlineCard",
];

impl Builder<'_, '_> {
    fn blocks(&mut self, nodes: &[adf::Node]) -> Result<Vec<Node>, ConvertError> {
        let mut out = Vec::new();
        let mut index = 0;
        while index < nodes.len() {
            // Inline nodes at block level are gathered into one paragraph
            let run = nodes[index..]
                .iter()
                .take_while(|node| INLINE_TYPES.contains(&node.node_type.as_str()))
                .count();
            if run > 0 {
                out.push(Node::paragraph(self.inline(&nodes[index..index + run])?));
                index += run;
                continue;
            }
            self.block(&nodes[index], &mut out)?;
            index += 1;
        }
        Ok(out)
    }

    fn block(&mut self, node: &adf::Node, out: &mut Vec<Node>) -> Result<(), ConvertError> {
        let built = match node.node_type.as_str() {
            "paragraph" => Node::paragraph(self.inline(node.children())?)
                .annotated(block_annotations(node, &[])?),
            "heading" => {
                let level = node
                    .attr("level")
                    .and_then(Value::as_u64)
                    .unwrap_or(1)
                    .clamp(1, 6) as u8;
                Node::with_children(NodeKind::Heading { level }, self.inline(node.children())?)
                    .annotated(block_annotations(node, &["level"])?)
            }
            "bulletList" | "orderedList" => self.list(node)?,
            "taskList" => self.task_list(node)?,
            "listItem" => {
                out.extend(self.blocks(node.children())?);
                return Ok(());
            }
            "blockquote" => Node::with_children(NodeKind::BlockQuote, self.blocks(node.children())?)
                .annotated(block_annotations(node, &[])?),
            "rule" => Node::new(NodeKind::ThematicBreak).annotated(block_annotations(node, &[])?),
            "codeBlock" => code_block(node)?,
            "panel" | "expand" | "nestedExpand" => self.container(node)?,
            "mediaSingle" => self.media_single(node)?,
            "mediaGroup" => media_group(node)?,
            "table" => self.table(node)?,
            other => return self.unknown(other, node, out),
        };
        out.push(built);
        Ok(())
    }

    fn list(&mut self, node: &adf::Node) -> Result<Node, ConvertError> {
        let ordered = node.is("orderedList");
        let start = node
            .attr("order")
            .and_then(Value::as_u64)
            .map_or(1, |order| order as usize);

        let mut items = Vec::new();
        for child in node.children() {
            let content = if child.is("listItem") {
                self.blocks(child.children())?
            } else {
                self.blocks(std::slice::from_ref(child))?
            };
            items.push(Node::with_children(NodeKind::Item, content));
        }
        Ok(Node::with_children(
            NodeKind::List {
                ordered,
                start,
                tight: true,
            },
            items,
        )
        .annotated(block_annotations(node, &["order"])?))
    }

    fn task_list(&mut self, node: &adf::Node) -> Result<Node, ConvertError> {
        let mut items: Vec<Node> = Vec::new();
        for child in node.children() {
            if child.is("taskList") {
                let nested = self.task_list(child)?;
                match items.last_mut() {
                    Some(previous) => previous.children.push(nested),
                    None => items.push(Node::with_children(
                        NodeKind::TaskItem { checked: false },
                        vec![nested],
                    )),
                }
                continue;
            }
            let checked = child.attr_str("state") == Some("DONE");
            let paragraph = Node::paragraph(self.inline(child.children())?);
            items.push(Node::with_children(NodeKind::TaskItem { checked }, vec![paragraph]));
        }
        Ok(Node::with_children(
            NodeKind::List {
                ordered: false,
                start: 1,
                tight: true,
            },
            items,
        )
        .annotated(block_annotations(node, &["localId"])?))
    }

    /// Panels and expands keep every attribute in the fence header.
    fn container(&mut self, node: &adf::Node) -> Result<Node, ConvertError> {
        let Some(kind) = ContainerKind::from_name(&node.node_type) else {
            return Err(ConvertError::SchemaMapping(node.node_type.clone()));
        };
        let mut attributes = node.attrs.clone().unwrap_or_default();
        if kind == ContainerKind::Panel {
            if let Some(panel_type) = attributes.remove("panelType") {
                attributes.insert("type".to_string(), panel_type);
            }
        }
        let children = self.blocks(node.children())?;
        Ok(Node::container(kind, attributes, children).annotated(marks_annotation(node)?))
    }

    /// A plain centered image stays an image; anything richer needs a fence.
    fn media_single(&mut self, node: &adf::Node) -> Result<Node, ConvertError> {
        let media: Vec<&adf::Node> = node.children().iter().filter(|child| child.is("media")).collect();
        let attributes = node.attrs.clone().unwrap_or_default();
        let centered_only = attributes
            .iter()
            .all(|(key, value)| key == "layout" && value.as_str() == Some("center"));

        if let [single] = media.as_slice() {
            if centered_only && node.marks().is_empty() {
                return Ok(image_paragraph(single));
            }
        }

        let children = media.into_iter().map(image_paragraph).collect();
        Ok(Node::container(ContainerKind::MediaSingle, attributes, children)
            .annotated(marks_annotation(node)?))
    }

    fn table(&mut self, node: &adf::Node) -> Result<Node, ConvertError> {
        let columns = node
            .children()
            .iter()
            .map(|row| row.children().len())
            .max()
            .unwrap_or(0)
            .max(1);

        let mut rows = Vec::new();
        for (index, row) in node.children().iter().enumerate() {
            let header = index == 0;
            let mut cells = Vec::new();
            for cell in row.children() {
                cells.push(self.table_cell(cell, header)?);
            }
            while cells.len() < columns {
                cells.push(Node::new(NodeKind::TableCell));
            }
            rows.push(Node::with_children(NodeKind::TableRow { header }, cells));
        }

        let defaults = table_defaults();
        let mut annotations = block_annotations(node, &[])?;
        for annotation in &mut annotations {
            annotation
                .attributes
                .retain(|key, value| defaults.get(key) != Some(value));
        }
        annotations.retain(|annotation| !annotation.attributes.is_empty());

        Ok(Node::with_children(
            NodeKind::Table {
                alignments: vec![TableCellAlignment::None; columns],
            },
            rows,
        )
        .annotated(annotations))
    }

    fn table_cell(&mut self, cell: &adf::Node, header_row: bool) -> Result<Node, ConvertError> {
        self.in_cell = true;
        let mut content = Vec::new();
        for (index, block) in cell.children().iter().enumerate() {
            if index > 0 {
                content.push(Node::new(NodeKind::HtmlInline("<br>".to_string())));
            }
            if block.is("paragraph") || block.is("heading") {
                content.extend(self.inline(block.children())?);
            } else {
                content.push(Node::text(block.plain_text()));
            }
        }
        self.in_cell = false;

        let implied = if header_row { "tableHeader" } else { "tableCell" };
        let attributes = cell.attrs.clone().unwrap_or_default();
        let annotation = if cell.node_type != implied {
            Some(cell.node_type.clone())
        } else if !attributes.is_empty() {
            Some("cell".to_string())
        } else {
            None
        };

        let cell_node = Node::with_children(NodeKind::TableCell, content);
        Ok(match annotation {
            Some(target_kind) => cell_node.annotated(vec![Annotation {
                target_kind,
                attributes,
                raw: String::new(),
            }]),
            None => cell_node,
        })
    }

    fn inline(&mut self, nodes: &[adf::Node]) -> Result<Vec<Node>, ConvertError> {
        let mut runs = Vec::new();
        for node in nodes {
            let inline = match node.node_type.as_str() {
                "text" => {
                    let text = node.text.clone().unwrap_or_default();
                    if text.is_empty() {
                        continue;
                    }
                    if node.marks().iter().any(|mark| mark.is(Mark::CODE)) {
                        runs.push(plain_run(Node::new(NodeKind::Code(text))));
                        continue;
                    }
                    let (wrappers, dropped) = Wrapper::from_marks(node.marks());
                    for mark in dropped {
                        self.diagnostics.fail_or_warn(
                            Stage::Mapping,
                            ConvertError::SchemaMapping(format!("mark `{}`", mark.mark_type)),
                        )?;
                    }
                    runs.push(Run {
                        node: Node::text(text),
                        wrappers,
                    });
                    continue;
                }
                "hardBreak" if self.in_cell => Node::new(NodeKind::HtmlInline("<br>".to_string())),
                "hardBreak" => Node::new(NodeKind::LineBreak),
                "inlineCard" => match node.attr_str("url") {
                    Some(url) => Node::with_children(
                        NodeKind::Link {
                            url: format!("card:{url}"),
                            title: String::new(),
                        },
                        vec![Node::text(url)],
                    ),
                    None => Node::text(placeholder_text(node)),
                },
                _ => match social_token(node) {
                    Some(token) => Node::text(token.to_markup()),
                    None => {
                        self.diagnostics.fail_or_warn(
                            Stage::Mapping,
                            ConvertError::SchemaMapping(node.node_type.clone()),
                        )?;
                        if self.cx.options.unknown_nodes == UnknownNodePolicy::Drop {
                            continue;
                        }
                        Node::text(placeholder_text(node))
                    }
                },
            };
            runs.push(plain_run(inline));
        }
        Ok(nest(runs))
    }

    fn unknown(&mut self, node_type: &str, node: &adf::Node, out: &mut Vec<Node>) -> Result<(), ConvertError> {
        self.diagnostics
            .fail_or_warn(Stage::Mapping, ConvertError::SchemaMapping(node_type.to_string()))?;
        if self.cx.options.unknown_nodes == UnknownNodePolicy::Placeholder {
            out.push(Node::paragraph(vec![Node::text(placeholder_text(node))]));
        }
        Ok(())
    }
}

fn plain_run(node: Node) -> Run {
    Run {
        node,
        wrappers: Vec::new(),
    }
}

/// Token for a social inline node, or `None` when it lacks its key attribute.
fn social_token(node: &adf::Node) -> Option<SocialToken> {
    match node.node_type.as_str() {
        "mention" => Some(SocialToken::Mention {
            id: node.attr_str("id")?.to_string(),
        }),
        "emoji" => Some(SocialToken::Emoji {
            short_name: node.attr_str("shortName")?.to_string(),
            text: node.attr_str("text").unwrap_or_default().to_string(),
            id: node.attr_str("id").map(str::to_string),
        }),
        "date" => {
            let timestamp = match node.attr("timestamp")? {
                Value::String(timestamp) => timestamp.clone(),
                Value::Number(timestamp) => timestamp.to_string(),
                _ => return None,
            };
            Some(SocialToken::Date { timestamp })
        }
        "status" => {
            let text = node.attr_str("text")?.trim();
            if text.is_empty() {
                return None;
            }
            Some(SocialToken::Status {
                text: text.to_string(),
                color: StatusColor::parse(node.attr_str("color").unwrap_or_default()),
            })
        }
        _ => None,
    }
}

fn placeholder_text(node: &adf::Node) -> String {
    let text = node.plain_text();
    if !text.trim().is_empty() {
        return text;
    }
    node.attr_str("text")
        .filter(|text| !text.is_empty())
        .map_or_else(|| format!("[{}]", node.node_type), str::to_string)
}

/// Annotation for attributes outside `implied`, plus the node's marks.
fn block_annotations(node: &adf::Node, implied: &[&str]) -> Result<Vec<Annotation>, ConvertError> {
    let mut attributes: Attributes = node
        .attrs
        .iter()
        .flatten()
        .filter(|(key, _)| !implied.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if !node.marks().is_empty() {
        attributes.insert(MARKS_ATTRIBUTE.to_string(), serde_json::to_value(node.marks())?);
    }
    if attributes.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![Annotation {
        target_kind: node.node_type.clone(),
        attributes,
        raw: String::new(),
    }])
}

/// Containers keep attributes in their header; only marks need an annotation.
fn marks_annotation(node: &adf::Node) -> Result<Vec<Annotation>, ConvertError> {
    if node.marks().is_empty() {
        return Ok(Vec::new());
    }
    let mut attributes = Attributes::new();
    attributes.insert(MARKS_ATTRIBUTE.to_string(), serde_json::to_value(node.marks())?);
    Ok(vec![Annotation {
        target_kind: node.node_type.clone(),
        attributes,
        raw: String::new(),
    }])
}

fn code_block(node: &adf::Node) -> Result<Node, ConvertError> {
    let text = node.plain_text();
    let literal = if text.is_empty() { text } else { format!("{text}\n") };
    Ok(Node::new(NodeKind::CodeBlock {
        info: node.attr_str("language").unwrap_or_default().to_string(),
        literal,
        fenced: true,
        fence_char: '`',
    })
    .annotated(block_annotations(node, &["language"])?))
}

/// `![alt](url)` for a media node, with a `media` annotation for whatever
/// the image syntax cannot carry.
fn image_paragraph(media: &adf::Node) -> Node {
    let url = match (media.attr_str("type"), media.attr_str("id"), media.attr_str("url")) {
        (Some("external"), _, Some(url)) => url.to_string(),
        (_, Some(id), _) => format!("media:{id}"),
        (_, None, Some(url)) => url.to_string(),
        _ => String::new(),
    };
    let alt = media.attr_str("alt").unwrap_or_default();
    let image = Node::with_children(
        NodeKind::Image {
            url,
            title: String::new(),
        },
        if alt.is_empty() { Vec::new() } else { vec![Node::text(alt)] },
    );

    let extra: Attributes = media
        .attrs
        .iter()
        .flatten()
        .filter(|(key, value)| !is_implied_media_attr(key, value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let paragraph = Node::paragraph(vec![image]);
    if extra.is_empty() {
        return paragraph;
    }
    paragraph.annotated(vec![Annotation {
        target_kind: "media".to_string(),
        attributes: extra,
        raw: String::new(),
    }])
}

fn is_implied_media_attr(key: &str, value: &Value) -> bool {
    match key {
        "id" | "alt" | "url" => true,
        "type" => matches!(value.as_str(), Some("file" | "external")),
        "collection" => value.as_str() == Some(""),
        _ => false,
    }
}

fn media_group(node: &adf::Node) -> Result<Node, ConvertError> {
    let references: Vec<String> = node
        .children()
        .iter()
        .filter_map(|media| {
            let id = media.attr_str("id")?;
            let alt = media.attr_str("alt").unwrap_or_default();
            Some(format!("![{alt}](media:{id})"))
        })
        .collect();
    Ok(Node::new(NodeKind::Container(Container {
        kind: ContainerKind::MediaGroup,
        attributes: node.attrs.clone().unwrap_or_default(),
        raw: Some(references.join("\n")),
    }))
    .annotated(marks_annotation(node)?))
}
