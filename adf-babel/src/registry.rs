//! Format registry: converting between markdown and ADF by name
//!
//! Every format parses into, or serializes from, an ADF [`Document`], so any
//! parsing format converts to any serializing one through ADF. The defaults
//! are `markdown` (`.md`, `.markdown`) and `adf` (`.json`, `.adf`); both are
//! bidirectional.

use crate::adf::Document;
use crate::error::ConvertError;
use crate::format::Format;
use crate::formats::{AdfFormat, MarkdownFormat};
use crate::options::ConvertOptions;
use std::collections::HashMap;

/// Named formats that meet at ADF.
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::with_defaults();
/// let json = registry.convert("# Title\n\n{status:Done|color:green}\n", "markdown", "adf")?;
/// let markdown = registry.convert(&json, "adf", "markdown")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// An empty registry, without even `adf`
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any format of the same name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Look up a format, or fail with [`ConvertError::FormatNotFound`].
    pub fn get(&self, name: &str) -> Result<&dyn Format, ConvertError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| ConvertError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Registered format names, sorted
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Format name for a path by extension: `page.md` is markdown, `page.json`
    /// and `page.adf` are ADF.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension))
            .map(|format| format.name().to_string())
    }

    /// Read `source` as `format` into an ADF document.
    pub fn parse(&self, source: &str, format: &str) -> Result<Document, ConvertError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(ConvertError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        fmt.parse(source)
    }

    /// Write an ADF document out as `format`.
    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, ConvertError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(ConvertError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize(doc)
    }

    /// Parse as `from`, then serialize as `to`. `markdown → markdown` is a
    /// normalizing round trip through ADF.
    pub fn convert(&self, source: &str, from: &str, to: &str) -> Result<String, ConvertError> {
        let doc = self.parse(source, from)?;
        tracing::debug!(from, to, blocks = doc.content.len(), "converting");
        self.serialize(&doc, to)
    }

    /// `markdown` with default options, and `adf`
    pub fn with_defaults() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    /// `markdown` configured by `options`, and `adf`
    pub fn with_options(options: ConvertOptions) -> Self {
        let mut registry = Self::new();
        registry.register(MarkdownFormat::new(options));
        registry.register(AdfFormat);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
