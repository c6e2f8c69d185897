//! Bidirectional conversion between extended markdown and ADF
//!
//!     This crate converts documents between an extended markdown dialect and the Atlassian
//!     Document Format (ADF), a JSON tree. The dialect is plain CommonMark/GFM plus:
//!         - container fences: `~~~panel type=info` ... `~~~` (panel, expand, nestedExpand,
//!           mediaSingle, mediaGroup), nested to any depth
//!         - social tokens: `{user:ID}`, `:emoji:`, `{date:YYYY-MM-DD}`, `{status:TEXT|color:C}`,
//!           `[x](card:URL)`, `![alt](media:ID)`
//!         - annotations: `<!-- adf:kind key="value" -->` comments carrying every attribute the
//!           markdown syntax cannot express, so that ADF → markdown → ADF keeps them.
//!
//!     This is a pure lib: no code here assumes a shell environment (std print, env vars etc.).
//!     Configuration files are the job of the adf-config crate.
//!
//! Architecture
//!
//!     Markdown parsing and printing is never done here; it is delegated to comrak and reached
//!     through the MarkupParser trait (./ir/mod.rs). The comrak AST is copied into an owned
//!     generic tree (./ir/nodes.rs) that knows nothing about the dialect. The dialect is then
//!     recognised on that tree by format-agnostic processors (./common/), and the resolved tree
//!     is mapped to ADF by the schema builders (./mappings/).
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # ConvertError, Stage, Warning, Diagnostics
//!     ├── options.rs              # ConvertOptions
//!     ├── engine.rs               # Converter: runs the pipeline, owns recovery
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── adf                     # ADF wire model
//!     ├── ir                      # Generic markup tree
//!     ├── common                  # Annotations, fences, social tokens, marks
//!     ├── mappings                # Generic tree ↔ ADF
//!     └── formats
//!         ├── markdown            # comrak parser.rs / serializer.rs, MarkdownFormat
//!         └── adf                 # ADF JSON
//!
//! Core Algorithms
//!
//!     Forward: parse → frontmatter → attach annotations → resolve fences → build ADF.
//!
//!     Fence resolution is the delicate part. A `~~~panel` inside a `~~~expand` with the same
//!     fence length closes the outer fence early under CommonMark rules. The resolver works in
//!     bounded passes, one syntactic layer per pass, and a consolidation step moves the blocks
//!     an early close left behind back into their container (see ./common/fences.rs).
//!
//!     Reverse: ADF → generic tree with annotations → annotation comments → comrak. Container
//!     fences are emitted outermost-longest so the output parses back without heuristics.
//!
//! Errors
//!
//!     Non-strict conversions never fail on content: every degradation is recorded as a
//!     Warning (and logged with tracing) and the result is always a valid document. Strict
//!     conversions stop at the first degradation with an error naming the pipeline stage.
//!
//! Testing
//!     tests
//!     ├── lib.rs                  # aggregates the modules below
//!     ├── common                  # to_adf / to_markdown / doc helpers
//!     ├── markdown
//!     │   ├── import.rs           # markdown → ADF
//!     │   ├── export.rs           # ADF → markdown
//!     │   ├── annotations.rs
//!     │   ├── fences.rs
//!     │   ├── frontmatter.rs
//!     │   ├── tables.rs
//!     │   └── roundtrip.rs
//!     └── registry
//!
pub mod adf;
pub mod common;
pub mod engine;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod mappings;
pub mod options;
pub mod registry;

pub use engine::{Conversion, Converter};
pub use error::{ConvertError, Stage, Warning};
pub use format::Format;
pub use options::{ConvertOptions, UnknownNodePolicy};
pub use registry::FormatRegistry;

/// Converts extended markdown to an ADF document with default options.
///
/// Use a [`Converter`] to change options or to get warnings and frontmatter.
pub fn convert(markup: &str) -> Result<adf::Document, ConvertError> {
    Converter::default()
        .convert(markup)
        .map(|conversion| conversion.document)
}

/// Converts an ADF document to extended markdown with default options.
pub fn convert_reverse(document: &adf::Document) -> Result<String, ConvertError> {
    Converter::default().convert_reverse(document)
}
