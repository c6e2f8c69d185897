//! Extended markdown format
//!
//! Bidirectional conversion between the extended markdown dialect and ADF.
//!
//! # Library Choice
//!
//! The generic layer is `comrak`: one crate for both parsing and serialization,
//! CommonMark compliant, with the GFM extensions the dialect builds on (tables,
//! strikethrough, task lists, autolinks) and frontmatter support. The dialect
//! itself (fences, annotations, social tokens) is recognised on top of the
//! generic tree by the processors in [`crate::common`].
//!
//! # Element Mapping Table
//!
//! | Markdown                           | ADF                          | Notes                                   |
//! |------------------------------------|------------------------------|-----------------------------------------|
//! | `#`..`######` heading              | heading                      | level regenerated from the `#` count    |
//! | paragraph                          | paragraph                    | split around inline media               |
//! | `-` / `1.` list                    | bulletList / orderedList     | `order` only when the list starts ≠ 1   |
//! | `- [ ]` / `- [x]` list             | taskList / taskItem          | `state` TODO / DONE, fresh `localId`    |
//! | fenced code                        | codeBlock                    | first info word is the language         |
//! | `>` blockquote / `---`             | blockquote / rule            |                                         |
//! | GFM table                          | table                        | first row is the header row             |
//! | `~~~panel` etc.                    | panel, expand, nestedExpand, mediaSingle, mediaGroup | header attributes copied |
//! | `**` `_` `~~` `` ` `` `[..](..)`   | strong, em, strike, code, link marks |                                 |
//! | `<!-- adf:span ... -->`            | underline, textColor, backgroundColor, subsup marks |                  |
//! | `{user:ID}` `:name:` `{date:D}` `{status:T}` | mention, emoji, date, status |                             |
//! | `[x](card:URL)` / `![alt](media:ID)` | inlineCard / media         |                                         |
//! | `<!-- adf:kind ... -->`            | attributes of the next node  | see [`crate::common::annotations`]      |
//!
//! # Lossy Conversions
//!
//! - `listItem`, `tableRow` and `taskItem` attributes have no annotation target
//! - colspan/rowspan cells are padded to a rectangular GFM table
//! - marks combined with `code` are dropped (code is exclusive)
//! - text that happens to look like a social token (`2024-01-15`, `:x:`) comes
//!   back as that token
//! - frontmatter has no place in ADF and is returned next to the document

pub mod parser;
pub mod serializer;

use crate::adf::Document;
use crate::engine::Converter;
use crate::error::ConvertError;
use crate::format::Format;
use crate::ir::nodes::Node;
use crate::ir::MarkupParser;
use crate::options::ConvertOptions;

/// The comrak-backed generic parser and stringifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakParser;

impl ComrakParser {
    pub fn new() -> Self {
        ComrakParser
    }
}

impl MarkupParser for ComrakParser {
    fn parse_document(&self, text: &str) -> Node {
        parser::parse_markdown(text)
    }

    fn parse_fragment(&self, text: &str) -> Node {
        parser::parse_markdown_fragment(text)
    }

    fn stringify(&self, root: &Node) -> Result<String, ConvertError> {
        serializer::serialize_markdown(root)
    }
}

/// Format implementation for extended markdown
pub struct MarkdownFormat {
    converter: Converter,
}

impl MarkdownFormat {
    pub fn new(options: ConvertOptions) -> Self {
        MarkdownFormat {
            converter: Converter::new(options),
        }
    }
}

impl Default for MarkdownFormat {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Markdown extended with fences, annotations and social tokens"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, ConvertError> {
        self.converter
            .convert(source)
            .map(|conversion| conversion.document)
    }

    fn serialize(&self, doc: &Document) -> Result<String, ConvertError> {
        self.converter.convert_reverse(doc)
    }
}
