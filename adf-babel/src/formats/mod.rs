//! Format implementations
//!
//! Every format converts between its text representation and an ADF
//! [`Document`](crate::adf::Document).

pub mod adf;
pub mod markdown;

pub use self::adf::AdfFormat;
pub use markdown::{ComrakParser, MarkdownFormat};
