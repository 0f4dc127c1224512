//! Prompt Backend Port - one tier of the prompt store.
//!
//! The application-level `PromptStore` composes an optional remote backend
//! with a local one. Each backend only knows how to talk to its own storage.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::domain::prompts::PromptDocument;

/// Port for a single prompt storage tier.
#[async_trait]
pub trait PromptBackend: Send + Sync {
    /// Short label used in logs and results (`remote`, `local`).
    fn label(&self) -> &'static str;

    /// Persists a document, replacing any previous one with the same name.
    async fn save(&self, document: &PromptDocument) -> Result<(), PromptStoreError>;

    /// Loads the stored JSON for `name`, or `None` when it does not exist.
    async fn load(&self, name: &str) -> Result<Option<Value>, PromptStoreError>;

    /// Lists prompt names.
    async fn list(&self) -> Result<Vec<String>, PromptStoreError>;

    /// Checks that the backend is reachable.
    async fn health(&self) -> Result<(), PromptStoreError>;

    /// Capability advertisement: server id → tool names.
    ///
    /// Backends without one return an empty map.
    async fn available_tools(&self) -> Result<BTreeMap<String, Vec<String>>, PromptStoreError> {
        Ok(BTreeMap::new())
    }
}

/// Errors that can occur while using a prompt backend.
#[derive(Debug, Clone, Error)]
pub enum PromptStoreError {
    #[error("Prompt backend unreachable: {message}")]
    Unreachable { message: String },

    #[error("Prompt backend returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed prompt backend response: {message}")]
    Malformed { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error(transparent)]
    InvalidName(#[from] ValidationError),
}

impl PromptStoreError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::Status { status }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PromptStoreError {
    fn from(err: std::io::Error) -> Self {
        PromptStoreError::io(err.to_string())
    }
}

impl From<reqwest::Error> for PromptStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PromptStoreError::malformed(err.to_string())
        } else if let Some(status) = err.status() {
            PromptStoreError::status(status.as_u16())
        } else {
            PromptStoreError::unreachable(err.to_string())
        }
    }
}
