//! Tool Gateway Port - the single way orchestrators reach tool servers.
//!
//! # Guarantees
//!
//! - At-most-once delivery, no automatic retry
//! - Fresh correlation id per call
//! - Bearer token attached when configured for the server

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::domain::tools::{codes, ToolDescriptor, ToolOutput};

#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Invokes `tool` on `server`. `timeout` overrides the gateway default.
    async fn call(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
        timeout: Option<Duration>,
    ) -> Result<ToolOutput, GatewayError>;

    /// Fetches the tool descriptors a server advertises.
    async fn list_tools(&self, server: &str) -> Result<Vec<ToolDescriptor>, GatewayError>;

    /// Fetches a server's health object.
    async fn health(&self, server: &str) -> Result<Value, GatewayError>;
}

/// What went wrong on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    Status,
    Malformed,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportKind::Timeout => "timeout",
            TransportKind::Connect => "connect",
            TransportKind::Status => "status",
            TransportKind::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// Error taxonomy surfaced to orchestrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Remote,
    Validation,
    ProviderExhausted,
    ArtifactIo,
}

/// Errors returned by a gateway call.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Transport error ({kind}): {message}")]
    Transport { kind: TransportKind, message: String },

    #[error("Remote error {code}: {message}")]
    Remote {
        code: i64,
        message: String,
        data: Option<Value>,
    },
}

impl GatewayError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    pub fn remote(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
            data,
        }
    }

    /// Classifies the error. Remote codes with a well-known meaning are
    /// surfaced as their own kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Configuration { .. } => ErrorKind::Configuration,
            GatewayError::Transport { .. } => ErrorKind::Transport,
            GatewayError::Remote { code, .. } => match *code {
                codes::INVALID_PARAMS => ErrorKind::Validation,
                codes::PROVIDER_EXHAUSTED => ErrorKind::ProviderExhausted,
                codes::ARTIFACT_IO => ErrorKind::ArtifactIo,
                _ => ErrorKind::Remote,
            },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport {
                kind: TransportKind::Timeout,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_decode() {
            TransportKind::Malformed
        } else if err.is_status() {
            TransportKind::Status
        } else {
            TransportKind::Connect
        };
        GatewayError::transport(kind, err.to_string())
    }
}
