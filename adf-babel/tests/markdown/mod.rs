//! Markdown format tests
//!
//! Tests for bidirectional extended markdown ↔ ADF conversion.

mod annotations;
mod export;
mod fences;
mod frontmatter;
mod import;
mod roundtrip;
mod tables;
