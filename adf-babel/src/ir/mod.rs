//! Generic markup tree.
//!
//! This is the owned tree the generic markdown parser produces and the
//! stringifier consumes. It knows nothing about ADF; the dialect processors
//! (annotations, fences) rewrite it in place before the schema builder maps it.

pub mod nodes;

use crate::error::ConvertError;
use nodes::Node;

/// The generic markup parser and stringifier.
///
/// Implementations know plain CommonMark/GFM only. Container fences, social
/// tokens and annotations are left for the dialect processors to find.
pub trait MarkupParser: Send + Sync {
    /// Parse a whole document, recognising a leading frontmatter block.
    fn parse_document(&self, text: &str) -> Node;

    /// Parse the inner text of a container. Frontmatter is not recognised.
    fn parse_fragment(&self, text: &str) -> Node;

    /// Render a generic tree back to text.
    fn stringify(&self, root: &Node) -> Result<String, ConvertError>;
}
