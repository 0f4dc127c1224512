//! Artifact Store Port - directory of large tool results.
//!
//! Implementations own artifact file lifetimes: they write documents
//! atomically under unique names, enumerate them, and purge them by age.

use async_trait::async_trait;
use chrono::Duration;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

use crate::domain::artifacts::{ArtifactDocument, ArtifactListing, ArtifactReference};

/// Port for storing and enumerating artifact files.
///
/// # Contract
///
/// Implementations must:
/// - Write atomically (temp file + rename); readers never see a partial file
/// - Never overwrite an existing artifact
/// - List newest first
/// - Tolerate files disappearing between listing and reading
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes a new artifact and returns its reference.
    async fn store(&self, request: StoreRequest) -> Result<ArtifactReference, ArtifactError>;

    /// Enumerates artifacts, newest first.
    async fn list(&self) -> Result<Vec<ArtifactListing>, ArtifactError>;

    /// Reads an artifact by its file name.
    async fn read(&self, filename: &str) -> Result<ArtifactDocument, ArtifactError>;

    /// Reads the artifact a reference points at.
    async fn read_path(&self, path: &Path) -> Result<ArtifactDocument, ArtifactError>;

    /// Removes artifacts strictly older than `max_age`, returning the count deleted.
    async fn purge(&self, max_age: Duration) -> Result<usize, ArtifactError>;

    /// Directory the artifacts live in.
    fn directory(&self) -> &Path;
}

/// What to write into a new artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRequest {
    pub prefix: String,
    pub data: Value,
    pub metadata: Map<String, Value>,
    pub auto_saved: bool,
    pub reason: String,
}

impl StoreRequest {
    pub fn new(prefix: impl Into<String>, data: Value) -> Self {
        Self {
            prefix: prefix.into(),
            data,
            metadata: Map::new(),
            auto_saved: false,
            reason: "stored on request".to_string(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Marks the artifact as an automatic offload, with the reason recorded
    /// in the returned reference.
    pub fn offloaded(mut self, reason: impl Into<String>) -> Self {
        self.auto_saved = true;
        self.reason = reason.into();
        self
    }
}

/// Errors that can occur during artifact operations.
#[derive(Debug, Clone, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Artifact {path} is not a valid document: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Invalid artifact name: {name}")]
    InvalidName { name: String },
}

impl ArtifactError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }
}

impl From<std::io::Error> for ArtifactError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ArtifactError::not_found(err.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                ArtifactError::permission_denied(err.to_string())
            }
            _ => ArtifactError::io(err.to_string()),
        }
    }
}
