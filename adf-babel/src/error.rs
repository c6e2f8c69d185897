//! Error types for conversion operations
//!
//! Every component reports through [`ConvertError`]. Whether a failure aborts the
//! conversion or degrades to a [`Warning`] is decided in one place, [`Diagnostics`],
//! based on the strict flag of the running conversion.

use std::fmt;

/// Pipeline stage a failure or warning originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Frontmatter,
    Annotations,
    Fences,
    Mapping,
    Serialization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Frontmatter => "frontmatter",
            Stage::Annotations => "annotations",
            Stage::Fences => "fences",
            Stage::Mapping => "mapping",
            Stage::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Input is empty or not a document
    #[error("invalid input: {0}")]
    Input(String),

    /// Malformed attribute syntax inside an annotation or fence header
    #[error("malformed annotation `{raw}`: {reason}")]
    AnnotationParse { raw: String, reason: String },

    /// Container fences nested deeper than the resolution pass cap
    #[error("fence nesting exceeds {passes} resolution passes; {unresolved} fence(s) left as literal text")]
    FenceResolutionExhausted { passes: usize, unresolved: usize },

    /// A node type with no mapping in the target representation
    #[error("unsupported node type `{0}`")]
    SchemaMapping(String),

    /// Frontmatter block could not be parsed
    #[error("malformed frontmatter: {0}")]
    Frontmatter(String),

    /// The generic stringifier failed
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// ADF JSON could not be read or written
    #[error("invalid ADF JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Format not found in registry
    #[error("format '{0}' not found")]
    FormatNotFound(String),

    /// Format does not support the requested direction
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// A failure re-raised in strict mode, tagged with its stage
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// Wrap this error with the stage it was raised in.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            already @ ConvertError::Stage { .. } => already,
            other => ConvertError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }
}

/// A non-fatal degradation recorded during a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

/// Collects warnings for one conversion call and applies the strict policy.
#[derive(Debug, Default)]
pub struct Diagnostics {
    strict: bool,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new(strict: bool) -> Self {
        Diagnostics {
            strict,
            warnings: Vec::new(),
        }
    }

    /// Record a warning. Never fails, regardless of mode.
    pub fn warn(&mut self, stage: Stage, error: ConvertError) {
        let message = error.to_string();
        tracing::warn!(%stage, "{message}");
        self.warnings.push(Warning { stage, message });
    }

    /// Fail in strict mode, otherwise record a warning and carry on.
    pub fn fail_or_warn(&mut self, stage: Stage, error: ConvertError) -> Result<(), ConvertError> {
        if self.strict {
            Err(error.at(stage))
        } else {
            self.warn(stage, error);
            Ok(())
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
