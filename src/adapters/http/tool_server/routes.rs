//! Axum router configuration for a tool server.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{call_tool, health, list_tools, ToolServerState};
use crate::adapters::http::middleware::{auth_middleware, AuthState};
use crate::application::ToolServer;

/// Default number of requests served at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Create the tool server router.
///
/// # Routes
///
/// - `POST /call` - JSON-RPC `tools/call` envelope in, envelope out
/// - `GET /tools` - Hosted tool descriptors
/// - `GET /health` - Liveness probe
///
/// All routes sit behind the bearer check when `auth` carries a token.
pub fn tool_server_router(
    server: Arc<ToolServer>,
    auth: AuthState,
    max_concurrent_requests: usize,
) -> Router {
    Router::new()
        .route("/call", post(call_tool))
        .route("/tools", get(list_tools))
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(auth, auth_middleware))
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests.max(1)))
        .layer(TraceLayer::new_for_http())
        .with_state(ToolServerState { server })
}

/// Serves `router` on `listener` until Ctrl-C.
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
