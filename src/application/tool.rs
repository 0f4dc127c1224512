//! Tool - the unit of work hosted by a tool server.
//!
//! Tools are stateless. Everything they share with the rest of the server
//! (response handling, provider chains, artifact directory) arrives through
//! the [`ToolContext`] passed to every call.

use async_trait::async_trait;
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use super::{FallbackPolicyEngine, ResponseHandler};
use crate::domain::fallback::FallbackError;
use crate::domain::foundation::ValidationError;
use crate::domain::tools::{codes, RpcError, ToolArguments, ToolDescriptor, ToolOutput};
use crate::ports::{ArtifactError, ArtifactStore};

/// A named, argument-validated computation.
///
/// `call` only ever sees arguments that already passed validation against
/// `descriptor()`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    async fn call(&self, args: ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError>;
}

/// Per-server shared services, built once at startup.
#[derive(Clone)]
pub struct ToolContext {
    responses: Arc<ResponseHandler>,
    fallback: Arc<FallbackPolicyEngine>,
    retention: Duration,
}

impl ToolContext {
    pub fn new(responses: Arc<ResponseHandler>, fallback: Arc<FallbackPolicyEngine>) -> Self {
        Self {
            responses,
            fallback,
            retention: Duration::hours(24),
        }
    }

    /// Sets the default age used when purging artifacts.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn responses(&self) -> &ResponseHandler {
        &self.responses
    }

    pub fn fallback(&self) -> &FallbackPolicyEngine {
        &self.fallback
    }

    pub fn artifacts(&self) -> &Arc<dyn ArtifactStore> {
        self.responses.store()
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }
}

/// Errors raised while serving a `tools/call` request.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for '{tool}': {source}")]
    Validation {
        tool: String,
        #[source]
        source: ValidationError,
    },

    #[error("Tool '{tool}' exceeded the {seconds}s time limit")]
    Timeout { tool: String, seconds: u64 },

    #[error(transparent)]
    Fallback(#[from] FallbackError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("{message}")]
    Internal { message: String },
}

impl ToolError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    pub fn validation(tool: impl Into<String>, source: ValidationError) -> Self {
        Self::Validation {
            tool: tool.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i64 {
        match self {
            ToolError::Parse { .. } => codes::PARSE_ERROR,
            ToolError::InvalidRequest { .. } => codes::INVALID_REQUEST,
            ToolError::UnknownTool { .. } => codes::METHOD_NOT_FOUND,
            ToolError::Validation { .. } => codes::INVALID_PARAMS,
            ToolError::Timeout { .. } => codes::TOOL_TIMEOUT,
            ToolError::Fallback(FallbackError::NoChain(_)) => codes::INTERNAL,
            ToolError::Fallback(_) => codes::PROVIDER_EXHAUSTED,
            ToolError::Artifact(_) => codes::ARTIFACT_IO,
            ToolError::Internal { .. } => codes::INTERNAL,
        }
    }

    /// Structured detail carried in `error.data`, when there is any.
    pub fn data(&self) -> Option<Value> {
        match self {
            ToolError::Validation { source, .. } => Some(json!({"field": source.field()})),
            ToolError::Fallback(err) => Some(json!({"attempts": err.attempts()})),
            _ => None,
        }
    }

    pub fn to_rpc_error(&self) -> RpcError {
        RpcError {
            code: self.code(),
            message: self.to_string(),
            data: self.data(),
        }
    }
}
