//! Conversion engine
//!
//! Runs the components in order and owns the recovery policy:
//!
//! ```text
//! forward:  text → parse → frontmatter → annotations → fences → to_adf → Document
//! reverse:  Document → from_adf → emit annotations → (frontmatter) → stringify → text
//! ```
//!
//! Components report degradations to a per-call [`Diagnostics`]. In strict mode
//! the first one aborts the call with an error naming its stage. Otherwise the
//! call always returns a valid result: if a stage still fails, forward
//! conversion falls back to a single paragraph holding the raw input and
//! reverse conversion to the document's plain text.

use crate::adf::{self, Document};
use crate::common::annotations::{self, AnnotationSyntax};
use crate::common::emoji::{BuiltinEmoji, EmojiResolver};
use crate::common::fences::FenceResolver;
use crate::error::{ConvertError, Diagnostics, Stage, Warning};
use crate::formats::markdown::ComrakParser;
use crate::ir::nodes::{Node, NodeKind};
use crate::ir::MarkupParser;
use crate::mappings::{from_adf, to_adf, MappingContext};
use crate::options::ConvertOptions;
use serde_json::Value;
use std::sync::Arc;

/// Result of a forward conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub document: Document,
    /// Parsed frontmatter block, if the input had one
    pub frontmatter: Option<Value>,
    pub warnings: Vec<Warning>,
}

impl Conversion {
    fn empty() -> Self {
        Conversion {
            document: Document::empty(),
            frontmatter: None,
            warnings: Vec::new(),
        }
    }
}

/// Converts between extended markdown and ADF.
///
/// A converter holds no per-call state and can be shared across threads.
pub struct Converter {
    options: ConvertOptions,
    syntax: AnnotationSyntax,
    parser: Box<dyn MarkupParser>,
    emoji: Arc<dyn EmojiResolver>,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Converter {
            syntax: AnnotationSyntax::new(options.namespace.clone()),
            options,
            parser: Box::new(ComrakParser::new()),
            emoji: Arc::new(BuiltinEmoji),
        }
    }

    /// Replace the generic markup parser.
    pub fn with_parser(mut self, parser: impl MarkupParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Replace the emoji lookup used by the token scanner.
    pub fn with_emoji(mut self, emoji: impl EmojiResolver + 'static) -> Self {
        self.emoji = Arc::new(emoji);
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Extended markdown → ADF.
    pub fn convert(&self, markup: &str) -> Result<Conversion, ConvertError> {
        let mut diagnostics = Diagnostics::new(self.options.strict);
        let Some((root, raw_frontmatter)) = self.parse_input(markup)? else {
            return Ok(Conversion::empty());
        };
        let frontmatter = match raw_frontmatter {
            Some(raw) => settle_frontmatter(parse_frontmatter(&raw), &mut diagnostics)?,
            None => None,
        };
        self.finish(markup, root, frontmatter, diagnostics)
    }

    /// Same as [`Converter::convert`], with the frontmatter parsed on the
    /// blocking pool.
    #[cfg(feature = "async")]
    pub async fn convert_async(&self, markup: &str) -> Result<Conversion, ConvertError> {
        let mut diagnostics = Diagnostics::new(self.options.strict);
        let Some((root, raw_frontmatter)) = self.parse_input(markup)? else {
            return Ok(Conversion::empty());
        };
        let frontmatter = match raw_frontmatter {
            Some(raw) => {
                let parsed = tokio::task::spawn_blocking(move || parse_frontmatter(&raw))
                    .await
                    .map_err(|e| ConvertError::Frontmatter(format!("frontmatter task failed: {e}")))
                    .and_then(|result| result);
                settle_frontmatter(parsed, &mut diagnostics)?
            }
            None => None,
        };
        self.finish(markup, root, frontmatter, diagnostics)
    }

    /// ADF → extended markdown.
    pub fn convert_reverse(&self, document: &Document) -> Result<String, ConvertError> {
        self.convert_reverse_with_frontmatter(document, None)
    }

    /// ADF → extended markdown, with a leading frontmatter block.
    pub fn convert_reverse_with_frontmatter(
        &self,
        document: &Document,
        frontmatter: Option<&Value>,
    ) -> Result<String, ConvertError> {
        let mut diagnostics = Diagnostics::new(self.options.strict);
        if document.doc_type != "doc" {
            diagnostics.fail_or_warn(
                Stage::Input,
                ConvertError::Input(format!("root node is `{}`, not `doc`", document.doc_type)),
            )?;
        }
        let frontmatter = frontmatter.filter(|value| !value.is_null());
        if document.is_empty() && frontmatter.is_none() {
            return Ok(String::new());
        }

        match self.reverse(document, frontmatter, &mut diagnostics) {
            Ok(markup) => Ok(markup),
            Err(err) if !self.options.strict => {
                diagnostics.warn(Stage::Serialization, err);
                Ok(plain_text_fallback(document))
            }
            Err(err) => Err(err),
        }
    }

    /// Parse the input, splitting off the raw frontmatter. `None` for blank input.
    fn parse_input(&self, markup: &str) -> Result<Option<(Node, Option<String>)>, ConvertError> {
        if markup.trim().is_empty() {
            if self.options.strict {
                return Err(ConvertError::Input("input is empty".to_string()).at(Stage::Input));
            }
            return Ok(None);
        }
        let mut root = self.parser.parse_document(markup);
        let raw_frontmatter = take_frontmatter(&mut root);
        tracing::debug!(
            blocks = root.children.len(),
            frontmatter = raw_frontmatter.is_some(),
            "parsed markup"
        );
        Ok(Some((root, raw_frontmatter)))
    }

    fn finish(
        &self,
        markup: &str,
        mut root: Node,
        frontmatter: Option<Value>,
        mut diagnostics: Diagnostics,
    ) -> Result<Conversion, ConvertError> {
        let document = match self.forward(&mut root, &mut diagnostics) {
            Ok(document) => document,
            Err(err) if !self.options.strict => {
                diagnostics.warn(Stage::Mapping, err);
                fallback_document(markup)
            }
            Err(err) => return Err(err),
        };
        Ok(Conversion {
            document,
            frontmatter,
            warnings: diagnostics.into_warnings(),
        })
    }

    fn forward(&self, root: &mut Node, diagnostics: &mut Diagnostics) -> Result<Document, ConvertError> {
        annotations::process(root, &self.syntax, self.parser.as_ref(), diagnostics);
        tracing::debug!(warnings = diagnostics.warnings().len(), "annotations attached");

        let passes = FenceResolver::new(self.parser.as_ref(), &self.syntax, &self.options)
            .resolve(root, diagnostics);
        tracing::debug!(passes, "fences resolved");

        let document = to_adf::build_document(root, &self.context(), diagnostics)?;
        tracing::debug!(blocks = document.content.len(), "document built");
        Ok(document)
    }

    fn reverse(
        &self,
        document: &Document,
        frontmatter: Option<&Value>,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, ConvertError> {
        let mut root = from_adf::build_tree(document, &self.context(), diagnostics)?;
        annotations::emit(&mut root, &self.syntax);

        if let Some(frontmatter) = frontmatter {
            let yaml = serde_yaml::to_string(frontmatter)
                .map_err(|e| ConvertError::Frontmatter(e.to_string()).at(Stage::Frontmatter))?;
            root.children
                .insert(0, Node::new(NodeKind::FrontMatter(format!("---\n{yaml}---\n\n"))));
        }

        let markup = self
            .parser
            .stringify(&root)
            .map_err(|e| e.at(Stage::Serialization))?;
        tracing::debug!(bytes = markup.len(), "markup rendered");
        Ok(markup)
    }

    fn context(&self) -> MappingContext<'_> {
        MappingContext {
            options: &self.options,
            emoji: self.emoji.as_ref(),
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

fn take_frontmatter(root: &mut Node) -> Option<String> {
    let index = root
        .children
        .iter()
        .position(|child| matches!(child.kind, NodeKind::FrontMatter(_)))?;
    match root.children.remove(index).kind {
        NodeKind::FrontMatter(raw) => Some(raw),
        _ => None,
    }
}

/// YAML between the `---` delimiters, as JSON. An empty block is `None`.
fn parse_frontmatter(raw: &str) -> Result<Option<Value>, ConvertError> {
    let body = raw
        .lines()
        .skip(1)
        .take_while(|line| line.trim_end() != "---")
        .collect::<Vec<_>>()
        .join("\n");
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value =
        serde_yaml::from_str(&body).map_err(|e| ConvertError::Frontmatter(e.to_string()))?;
    Ok(Some(value))
}

fn settle_frontmatter(
    parsed: Result<Option<Value>, ConvertError>,
    diagnostics: &mut Diagnostics,
) -> Result<Option<Value>, ConvertError> {
    match parsed {
        Ok(value) => Ok(value),
        Err(err) => {
            diagnostics.fail_or_warn(Stage::Frontmatter, err)?;
            Ok(None)
        }
    }
}

fn fallback_document(markup: &str) -> Document {
    Document::new(vec![
        adf::Node::new("paragraph").with_content(vec![adf::Node::text(markup, Vec::new())])
    ])
}

fn plain_text_fallback(document: &Document) -> String {
    let blocks: Vec<String> = document
        .content
        .iter()
        .map(adf::Node::plain_text)
        .filter(|text| !text.is_empty())
        .collect();
    if blocks.is_empty() {
        String::new()
    } else {
        format!("{}\n", blocks.join("\n\n"))
    }
}
