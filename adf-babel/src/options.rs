//! Conversion options
//!
//! These are the knobs exposed to callers. `adf-config` deserializes the same
//! settings from TOML and converts them into [`ConvertOptions`].

/// What to do with a node that has no mapping in the target representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownNodePolicy {
    /// Keep a visible placeholder paragraph naming the node type
    #[default]
    Placeholder,
    /// Remove the node silently (a warning is still recorded)
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Raise typed errors instead of degrading
    pub strict: bool,
    /// Namespace of annotation comments, `<!-- {namespace}:kind ... -->`
    pub namespace: String,
    pub unknown_nodes: UnknownNodePolicy,
    /// Upper bound on fence resolution passes
    pub max_fence_passes: usize,
    /// How many trailing siblings the nesting heuristic may pull into a container
    pub absorb_lookahead: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            strict: false,
            namespace: "adf".to_string(),
            unknown_nodes: UnknownNodePolicy::Placeholder,
            max_fence_passes: 5,
            absorb_lookahead: 3,
        }
    }
}

impl ConvertOptions {
    pub fn strict() -> Self {
        ConvertOptions {
            strict: true,
            ..Self::default()
        }
    }
}
