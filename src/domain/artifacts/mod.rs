//! Artifacts - large tool results materialized as JSON files.
//!
//! An artifact file holds one document `{metadata, data}`. Tools hand back an
//! [`ArtifactReference`] in place of the data when the result is too large to
//! return inline.

mod document;
mod naming;
mod reference;

pub use document::{ArtifactDocument, ArtifactMetadata};
pub use naming::{artifact_filename, is_artifact_filename, sanitize_prefix, ARTIFACT_EXTENSION};
pub use reference::{ArtifactListing, ArtifactReference};

use serde_json::Value;

/// Default inline-vs-file threshold, in estimated tokens.
pub const DEFAULT_MAX_TOKENS: u64 = 20_000;

/// Serialized characters per estimated token.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Estimates the token count of a JSON value from its compact serialization.
///
/// The ratio is a calibration, not a tokenizer.
pub fn estimate_tokens(value: &Value) -> u64 {
    value.to_string().len() as u64 / CHARS_PER_TOKEN
}
