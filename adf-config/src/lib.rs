//! Shared configuration loader for adf-babel applications.
//!
//! `defaults/adf.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`AdfConfig`].

use adf_babel::{ConvertOptions, UnknownNodePolicy};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/adf.default.toml");

/// Top-level configuration consumed by adf-babel applications.
#[derive(Debug, Clone, Deserialize)]
pub struct AdfConfig {
    pub convert: ConvertConfig,
    pub annotations: AnnotationsConfig,
    pub fences: FencesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub strict: bool,
    pub unknown_nodes: UnknownNodes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownNodes {
    Placeholder,
    Drop,
}

impl From<UnknownNodes> for UnknownNodePolicy {
    fn from(value: UnknownNodes) -> Self {
        match value {
            UnknownNodes::Placeholder => UnknownNodePolicy::Placeholder,
            UnknownNodes::Drop => UnknownNodePolicy::Drop,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationsConfig {
    pub namespace: String,
}

/// Bounds of the container fence resolver.
#[derive(Debug, Clone, Deserialize)]
pub struct FencesConfig {
    pub max_passes: usize,
    pub absorb_lookahead: usize,
}

impl From<&AdfConfig> for ConvertOptions {
    fn from(config: &AdfConfig) -> Self {
        ConvertOptions {
            strict: config.convert.strict,
            namespace: config.annotations.namespace.clone(),
            unknown_nodes: config.convert.unknown_nodes.into(),
            max_fence_passes: config.fences.max_passes,
            absorb_lookahead: config.fences.absorb_lookahead,
        }
    }
}

impl From<AdfConfig> for ConvertOptions {
    fn from(config: AdfConfig) -> Self {
        ConvertOptions::from(&config)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<AdfConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    /// Build straight into conversion options.
    pub fn build_options(self) -> Result<ConvertOptions, ConfigError> {
        self.build().map(ConvertOptions::from)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<AdfConfig, ConfigError> {
    Loader::new().build()
}
