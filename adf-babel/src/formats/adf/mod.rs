//! ADF JSON format
//!
//! ADF is the pivot of every conversion, so this format is a plain JSON
//! (de)serialization of [`Document`]. Registering it lets the registry convert
//! `markdown → adf` and back through the same interface as any other pair.

use crate::adf::Document;
use crate::error::ConvertError;
use crate::format::Format;

#[derive(Debug, Default, Clone, Copy)]
pub struct AdfFormat;

impl Format for AdfFormat {
    fn name(&self) -> &str {
        "adf"
    }

    fn description(&self) -> &str {
        "Atlassian Document Format (JSON)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json", "adf"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, ConvertError> {
        if source.trim().is_empty() {
            return Ok(Document::empty());
        }
        Ok(Document::from_json(source)?)
    }

    fn serialize(&self, doc: &Document) -> Result<String, ConvertError> {
        Ok(doc.to_json()?)
    }
}
