//! Dialect processing shared by both conversion directions.
//!
//! The generic parser knows plain markdown only. Everything the extended
//! dialect adds on top is recognised (and regenerated) here:
//!
//! - [`annotations`]: `<!-- adf:kind ... -->` attribute side channel
//! - [`fences`]: `~~~panel` style container fences, nested to any depth
//! - [`social`]: mentions, emoji, dates, status chips, cards, media references
//! - [`marks`]: nested inline constructs to and from flat mark lists
//! - [`attributes`]: the `key="value"` codec used by annotations and fences
//! - [`emoji`]: short-name lookup

pub mod annotations;
pub mod attributes;
pub mod emoji;
pub mod fences;
pub mod marks;
pub mod social;
