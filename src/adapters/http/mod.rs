//! HTTP adapters - the tool server surface and its middleware.

pub mod middleware;
pub mod tool_server;

pub use middleware::{auth_middleware, AuthRejection, AuthState};
pub use tool_server::{serve, tool_server_router, ToolServerState, DEFAULT_MAX_CONCURRENT_REQUESTS};
