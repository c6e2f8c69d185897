//! Container fences: `~~~kind attr=value\n<inner>\n~~~`.
//!
//! The generic parser sees these as plain fenced code blocks. The resolver turns
//! every code block whose info word is a container kind into a
//! [`NodeKind::Container`] whose children are the parsed inner text. The same
//! shape is also recognised inside opaque text leaves (plain paragraphs,
//! indented code), where nesting can leave it after the generic parse.
//!
//! Each pass resolves one syntactic layer: freshly created containers are not
//! descended into until the next pass. Passes repeat until nothing changes or
//! `max_fence_passes` is reached; whatever is still unresolved is demoted to a
//! literal code block with a warning.
//!
//! Same-length nested fences (`~~~` inside `~~~`) close early. The inner close
//! marker then opens a stray info-less `~~~` block after the container, and the
//! blocks between container and stray marker belong inside the container.
//! Consolidation moves them back in, provided there are at most
//! `absorb_lookahead` of them and each is a container, a media paragraph or a
//! plain paragraph of another kind. Consecutive same-kind containers are never
//! nested into each other.

use crate::common::annotations::{self, AnnotationSyntax};
use crate::common::attributes::parse_attributes;
use crate::adf::Attributes;
use crate::error::{ConvertError, Diagnostics, Stage};
use crate::ir::nodes::{Container, ContainerKind, Node, NodeKind};
use crate::ir::MarkupParser;
use crate::options::ConvertOptions;
use once_cell::sync::Lazy;
use regex::Regex;

static TEXT_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^~{3,}[ \t]*(panel|expand|nestedExpand|mediaSingle|mediaGroup)\b([^\n]*)\n(?:(.*?)\n)?~{3,}$",
    )
    .expect("fence pattern compiles")
});

/// A detected container fence, before its inner text is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct FenceBlock {
    pub kind: ContainerKind,
    pub attributes: Attributes,
    pub inner_text: String,
    /// Degraded fragments of the header
    pub problems: Vec<String>,
}

impl FenceBlock {
    fn new(kind: ContainerKind, header: &str, inner_text: &str) -> Self {
        let parsed = parse_attributes(header);
        FenceBlock {
            kind,
            attributes: parsed.attributes,
            inner_text: inner_text.to_string(),
            problems: parsed.problems,
        }
    }
}

/// Detect container fence syntax on a single node.
pub fn detect(node: &Node) -> Option<FenceBlock> {
    match &node.kind {
        NodeKind::CodeBlock {
            info,
            literal,
            fenced: true,
            ..
        } => {
            let info = info.trim();
            let name = info.split_whitespace().next()?;
            let kind = ContainerKind::from_name(name)?;
            let inner = literal.strip_suffix('\n').unwrap_or(literal);
            Some(FenceBlock::new(kind, &info[name.len()..], inner))
        }
        NodeKind::CodeBlock {
            literal,
            fenced: false,
            ..
        } => detect_text(literal),
        NodeKind::Paragraph if node.is_plain_text() => detect_text(&node.text_content()),
        _ => None,
    }
}

fn detect_text(text: &str) -> Option<FenceBlock> {
    let caps = TEXT_FENCE.captures(text.trim())?;
    let kind = ContainerKind::from_name(&caps[1])?;
    let inner = caps.get(3).map_or("", |m| m.as_str());
    Some(FenceBlock::new(kind, &caps[2], inner))
}

/// Rewrites container fences into container nodes.
pub struct FenceResolver<'a> {
    parser: &'a dyn MarkupParser,
    syntax: &'a AnnotationSyntax,
    max_passes: usize,
    absorb_lookahead: usize,
}

impl<'a> FenceResolver<'a> {
    pub fn new(parser: &'a dyn MarkupParser, syntax: &'a AnnotationSyntax, options: &ConvertOptions) -> Self {
        FenceResolver {
            parser,
            syntax,
            max_passes: options.max_fence_passes,
            absorb_lookahead: options.absorb_lookahead,
        }
    }

    /// Resolve every container fence under `root`. Returns the number of passes run.
    pub fn resolve(&self, root: &mut Node, diagnostics: &mut Diagnostics) -> usize {
        let mut passes = 0;
        while passes < self.max_passes {
            passes += 1;
            let resolved = self.resolve_layer(&mut root.children, diagnostics);
            let absorbed = self.consolidate(&mut root.children, diagnostics);
            tracing::trace!(pass = passes, resolved, absorbed, "fence pass");
            if resolved + absorbed == 0 {
                return passes;
            }
        }

        let unresolved = demote_unresolved(&mut root.children);
        if unresolved > 0 {
            diagnostics.warn(
                Stage::Fences,
                ConvertError::FenceResolutionExhausted {
                    passes: self.max_passes,
                    unresolved,
                },
            );
        }
        passes
    }

    fn resolve_layer(&self, children: &mut [Node], diagnostics: &mut Diagnostics) -> usize {
        let mut count = 0;
        for child in children.iter_mut() {
            if let Some(block) = detect(child) {
                let annotations = std::mem::take(&mut child.annotations);
                let position = child.position;
                *child = self.materialize(block, diagnostics);
                child.annotations = annotations;
                child.position = position;
                count += 1;
            } else {
                count += self.resolve_layer(&mut child.children, diagnostics);
            }
        }
        count
    }

    /// Fold a fence into a container node carrying its parsed children.
    pub fn materialize(&self, block: FenceBlock, diagnostics: &mut Diagnostics) -> Node {
        for reason in block.problems {
            diagnostics.warn(
                Stage::Fences,
                ConvertError::AnnotationParse {
                    raw: format!("~~~{}", block.kind.name()),
                    reason,
                },
            );
        }

        if block.kind == ContainerKind::MediaGroup {
            return Node::new(NodeKind::Container(Container {
                kind: block.kind,
                attributes: block.attributes,
                raw: Some(block.inner_text),
            }));
        }

        let fragment = self.parse_fragment(&block.inner_text, diagnostics);
        Node::container(block.kind, block.attributes, fragment)
    }

    fn parse_fragment(&self, text: &str, diagnostics: &mut Diagnostics) -> Vec<Node> {
        let mut fragment = self.parser.parse_fragment(text);
        annotations::process(&mut fragment, self.syntax, self.parser, diagnostics);
        fragment.children
    }

    fn consolidate(&self, children: &mut Vec<Node>, diagnostics: &mut Diagnostics) -> usize {
        let mut count = 0;
        let mut i = 0;
        while i < children.len() {
            if let Some(stray) = self.absorbable_run(children, i) {
                let marker = children.remove(stray);
                let absorbed: Vec<Node> = children.drain(i + 1..stray).collect();
                children[i].children.extend(absorbed);

                let tail = match marker.kind {
                    NodeKind::CodeBlock { literal, .. } => self.parse_fragment(&literal, diagnostics),
                    _ => Vec::new(),
                };
                let at = i + 1;
                children.splice(at..at, tail);
                count += 1;
            }
            count += self.consolidate(&mut children[i].children, diagnostics);
            i += 1;
        }
        count
    }

    /// Index of the stray close marker ending the siblings that belong inside
    /// the container at `index`.
    fn absorbable_run(&self, children: &[Node], index: usize) -> Option<usize> {
        let container = &children[index];
        let kind = container.container_kind().filter(|kind| kind.absorbs_siblings())?;
        let nests = container
            .children
            .iter()
            .any(|child| child.container_kind().is_some() || detect(child).is_some());
        if !nests {
            return None;
        }

        for (offset, sibling) in children[index + 1..].iter().enumerate() {
            if is_stray_close(sibling) {
                return Some(index + 1 + offset);
            }
            if offset >= self.absorb_lookahead || !belongs_inside(sibling, kind) {
                return None;
            }
        }
        None
    }
}

/// A fenced `~~~` block without info: the leftover of a close marker.
fn is_stray_close(node: &Node) -> bool {
    matches!(
        &node.kind,
        NodeKind::CodeBlock { info, fenced: true, fence_char: '~', .. } if info.trim().is_empty()
    )
}

fn belongs_inside(node: &Node, kind: ContainerKind) -> bool {
    let sibling_kind = node
        .container_kind()
        .or_else(|| detect(node).map(|block| block.kind));
    match sibling_kind {
        Some(other) => other != kind,
        None => matches!(node.kind, NodeKind::Paragraph) && (node.is_plain_text() || is_media_paragraph(node)),
    }
}

fn is_media_paragraph(node: &Node) -> bool {
    let mut images = node.children.iter().filter(|child| !is_blank_text(child));
    images.clone().count() > 0 && images.all(|child| matches!(child.kind, NodeKind::Image { .. }))
}

fn is_blank_text(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Text(text) => text.trim().is_empty(),
        NodeKind::SoftBreak => true,
        _ => false,
    }
}

/// Replace fences left after the last pass by literal code blocks.
fn demote_unresolved(children: &mut [Node]) -> usize {
    let mut count = 0;
    for child in children.iter_mut() {
        if detect(child).is_some() {
            let literal = literal_fence_text(child);
            let annotations = std::mem::take(&mut child.annotations);
            *child = Node::new(NodeKind::CodeBlock {
                info: String::new(),
                literal,
                fenced: true,
                fence_char: '`',
            })
            .annotated(annotations);
            count += 1;
        } else {
            count += demote_unresolved(&mut child.children);
        }
    }
    count
}

fn literal_fence_text(node: &Node) -> String {
    match &node.kind {
        NodeKind::CodeBlock {
            info,
            literal,
            fenced: true,
            ..
        } => format!("~~~{info}\n{literal}~~~\n"),
        NodeKind::CodeBlock { literal, .. } => literal.clone(),
        _ => format!("{}\n", node.text_content()),
    }
}
