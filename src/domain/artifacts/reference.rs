use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ArtifactMetadata;
use crate::domain::foundation::Timestamp;

/// Small descriptor returned in place of a result that was written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactReference {
    pub file_path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
    pub estimated_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub reason: String,
}

impl ArtifactReference {
    /// Builds a reference for a file that has already been written.
    pub fn for_written_file(
        file_path: PathBuf,
        filename: String,
        size_bytes: u64,
        metadata: &ArtifactMetadata,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            file_path,
            filename,
            size_bytes,
            estimated_tokens: metadata.estimated_tokens,
            tool: metadata.tool.clone(),
            created_at: metadata.created_at,
            extraction_type: metadata.extraction_type.clone(),
            selector: metadata.selector.clone(),
            reason: reason.into(),
        }
    }
}

/// One entry of an artifact directory listing.
///
/// `metadata` is `None` when the file could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactListing {
    pub file_path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: Timestamp,
    pub metadata: Option<Value>,
}
