//! HTTP handlers for a tool server.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

use crate::application::ToolServer;
use crate::domain::foundation::Timestamp;
use crate::domain::tools::CallResponse;

/// Application state for tool server endpoints.
#[derive(Clone)]
pub struct ToolServerState {
    pub server: Arc<ToolServer>,
}

/// Runs one `tools/call` request.
///
/// POST /call
///
/// Always answers `200`; failures travel inside the envelope. The body is
/// taken raw so unparseable JSON still produces a parse-error envelope
/// rather than an extractor rejection.
pub async fn call_tool(State(state): State<ToolServerState>, body: Bytes) -> Json<CallResponse> {
    Json(state.server.dispatch_bytes(&body).await)
}

/// Lists hosted tools with their argument schemas.
///
/// GET /tools
pub async fn list_tools(State(state): State<ToolServerState>) -> Json<Value> {
    Json(json!({ "tools": state.server.descriptors() }))
}

/// GET /health
pub async fn health(State(state): State<ToolServerState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": state.server.service(),
        "timestamp": Timestamp::now(),
    }))
}
