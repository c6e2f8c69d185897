//! Mark resolution in both directions.
//!
//! Forward, nested emphasis/strong/strike/link/code constructs of the generic
//! tree are flattened into [`MarkedLeaf`]s. Marks accumulate on the way down
//! and are emitted innermost first, so `**_x_**` yields `[em, strong]`.
//!
//! Code is exclusive: as soon as a `code` mark meets a leaf, every other mark of
//! that leaf is discarded and later marks are ignored, whatever the nesting
//! order was.
//!
//! Reverse, [`nest`] regroups marked runs into the fewest nested wrapper nodes:
//! a wrapper shared by consecutive runs is opened once around all of them, and
//! for a single run the last mark in its list ends up outermost.

use crate::adf::Mark;
use crate::ir::nodes::{Node, NodeKind};

/// Marks of one leaf, in application order (outermost first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkSet {
    marks: Vec<Mark>,
}

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_code(&self) -> bool {
        self.marks.iter().any(|mark| mark.is(Mark::CODE))
    }

    pub fn push(&mut self, mark: Mark) {
        if self.has_code() {
            return;
        }
        if mark.is(Mark::CODE) {
            self.marks.clear();
        } else {
            // The innermost occurrence of a mark type wins (e.g. nested links)
            self.marks.retain(|existing| existing.mark_type != mark.mark_type);
        }
        self.marks.push(mark);
    }

    pub fn with(&self, mark: Mark) -> Self {
        let mut next = self.clone();
        next.push(mark);
        next
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Marks innermost first, the emitted order.
    pub fn to_marks(&self) -> Vec<Mark> {
        self.marks.iter().rev().cloned().collect()
    }
}

/// Text with its resolved marks.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkedLeaf {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl MarkedLeaf {
    pub fn has_code(&self) -> bool {
        self.marks.iter().any(|mark| mark.is(Mark::CODE))
    }
}

/// Flattened inline content.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Leaf(MarkedLeaf),
    HardBreak,
    Image { url: String, alt: String, title: String },
    /// Link whose destination uses the `card:` scheme
    Card { url: String },
    /// Inline the markup has no mapping for
    Raw { label: String, text: String },
}

/// Flatten inline generic nodes into marked leaves.
pub fn resolve(nodes: &[Node]) -> Vec<Inline> {
    let mut out = Vec::new();
    for node in nodes {
        walk(node, &MarkSet::new(), &mut out);
    }
    out
}

fn walk(node: &Node, marks: &MarkSet, out: &mut Vec<Inline>) {
    match &node.kind {
        NodeKind::Text(text) => push_leaf(out, text, marks),
        NodeKind::SoftBreak => push_leaf(out, " ", marks),
        NodeKind::LineBreak => out.push(Inline::HardBreak),
        NodeKind::Code(literal) => push_leaf(out, literal, &marks.with(Mark::code())),
        NodeKind::Emph => walk_children(node, &marks.with(Mark::new(Mark::EM)), out),
        NodeKind::Strong => walk_children(node, &marks.with(Mark::new(Mark::STRONG)), out),
        NodeKind::Strikethrough => walk_children(node, &marks.with(Mark::new(Mark::STRIKE)), out),
        NodeKind::Superscript => walk_children(
            node,
            &marks.with(Mark::new(Mark::SUBSUP).with_attr("type", "sup")),
            out,
        ),
        NodeKind::Link { url, title } => match url.strip_prefix("card:") {
            Some(card) => out.push(Inline::Card {
                url: card.to_string(),
            }),
            None => walk_children(node, &marks.with(Mark::link(url, Some(title))), out),
        },
        NodeKind::Image { url, title } => out.push(Inline::Image {
            url: url.clone(),
            alt: node.text_content(),
            title: title.clone(),
        }),
        NodeKind::Span { marks: span_marks } => {
            let mut inner = marks.clone();
            for mark in span_marks {
                inner.push(mark.clone());
            }
            walk_children(node, &inner, out);
        }
        // Plain HTML comments carry no content
        NodeKind::HtmlInline(html) if html.trim_start().starts_with("<!--") => {}
        NodeKind::HtmlInline(html) => out.push(Inline::Raw {
            label: "html".to_string(),
            text: html.clone(),
        }),
        NodeKind::Unsupported { label, text } => out.push(Inline::Raw {
            label: label.clone(),
            text: text.clone(),
        }),
        _ => walk_children(node, marks, out),
    }
}

fn walk_children(node: &Node, marks: &MarkSet, out: &mut Vec<Inline>) {
    for child in &node.children {
        walk(child, marks, out);
    }
}

fn push_leaf(out: &mut Vec<Inline>, text: &str, marks: &MarkSet) {
    let marks = marks.to_marks();
    if let Some(Inline::Leaf(previous)) = out.last_mut() {
        if previous.marks == marks {
            previous.text.push_str(text);
            return;
        }
    }
    out.push(Inline::Leaf(MarkedLeaf {
        text: text.to_string(),
        marks,
    }));
}

/// Generic wrapper node a mark turns into on the way back to markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Wrapper {
    Strong,
    Em,
    Strike,
    Link { href: String, title: String },
    /// All marks without markdown syntax, carried by one span annotation
    Span(Vec<Mark>),
}

impl Wrapper {
    /// Wrappers for a mark list (innermost first), plus the marks that have no
    /// representation. `code` is not a wrapper; callers render it as a code span.
    pub fn from_marks(marks: &[Mark]) -> (Vec<Wrapper>, Vec<Mark>) {
        let mut wrappers = Vec::new();
        let mut span = Vec::new();
        let mut dropped = Vec::new();

        for mark in marks {
            match mark.mark_type.as_str() {
                Mark::STRONG => wrappers.push(Wrapper::Strong),
                Mark::EM => wrappers.push(Wrapper::Em),
                Mark::STRIKE => wrappers.push(Wrapper::Strike),
                Mark::LINK => match mark.attr_str("href") {
                    Some(href) => wrappers.push(Wrapper::Link {
                        href: href.to_string(),
                        title: mark.attr_str("title").unwrap_or_default().to_string(),
                    }),
                    None => dropped.push(mark.clone()),
                },
                Mark::CODE => {}
                _ if mark.is_span_mark() => span.push(mark.clone()),
                _ => dropped.push(mark.clone()),
            }
        }
        if !span.is_empty() {
            wrappers.push(Wrapper::Span(span));
        }
        (wrappers, dropped)
    }

    fn wrap(self, children: Vec<Node>) -> Node {
        let kind = match self {
            Wrapper::Strong => NodeKind::Strong,
            Wrapper::Em => NodeKind::Emph,
            Wrapper::Strike => NodeKind::Strikethrough,
            Wrapper::Link { href, title } => NodeKind::Link { url: href, title },
            Wrapper::Span(marks) => NodeKind::Span { marks },
        };
        Node::with_children(kind, children)
    }
}

/// An inline generic node together with the wrappers it still needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub node: Node,
    pub wrappers: Vec<Wrapper>,
}

/// Regroup runs into nested wrapper nodes.
pub fn nest(mut runs: Vec<Run>) -> Vec<Node> {
    let mut out = Vec::new();
    while !runs.is_empty() {
        let Some((wrapper, len)) = widest_wrapper(&runs) else {
            out.push(runs.remove(0).node);
            continue;
        };
        let group = runs
            .drain(..len)
            .map(|mut run| {
                run.wrappers.retain(|w| w != &wrapper);
                run
            })
            .collect();
        out.push(wrapper.wrap(nest(group)));
    }
    out
}

/// The wrapper of the first run shared by the longest prefix of runs.
/// Ties go to the outermost (last listed) wrapper.
fn widest_wrapper(runs: &[Run]) -> Option<(Wrapper, usize)> {
    let first = runs.first()?;
    let mut best: Option<(&Wrapper, usize)> = None;
    for wrapper in &first.wrappers {
        let len = runs
            .iter()
            .take_while(|run| run.wrappers.contains(wrapper))
            .count();
        if best.map_or(true, |(_, best_len)| len >= best_len) {
            best = Some((wrapper, len));
        }
    }
    best.map(|(wrapper, len)| (wrapper.clone(), len))
}
