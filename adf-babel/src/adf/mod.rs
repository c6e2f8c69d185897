//! Atlassian Document Format (ADF) wire model.
//!
//! ADF is an open-ended JSON tree: every node carries a `type` and optional
//! `attrs`, `content`, `text` and `marks`. The model here keeps that shape
//! instead of enumerating node types, so nodes the converter does not know
//! still deserialize and can be reported or preserved.

pub mod nodes;

pub use nodes::{Attributes, Document, Mark, Node};
