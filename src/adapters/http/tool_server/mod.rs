//! Tool server HTTP surface: `/call`, `/tools`, `/health`.

mod handlers;
mod routes;

pub use handlers::{call_tool, health, list_tools, ToolServerState};
pub use routes::{serve, tool_server_router, DEFAULT_MAX_CONCURRENT_REQUESTS};
