//! Application layer - services that coordinate domain types and ports.
//!
//! - `ResponseHandler` - inline-vs-artifact decision for tool results
//! - `FallbackPolicyEngine` - ordered provider chains per capability
//! - `Tool`, `ToolRegistry`, `ToolServer` - hosting and dispatching tools
//! - `PromptStore` - two-tier prompt storage
//! - `Orchestrator` - workflows composed from gateway calls

mod fallback_engine;
mod orchestrator;
mod prompt_store;
mod response_handler;
mod tool;
mod tool_registry;
mod tool_server;

pub use fallback_engine::{FallbackObserver, FallbackPolicyEngine, NoOpFallbackObserver};
pub use orchestrator::{
    ListingDraft, ListingRequest, Orchestrator, OrchestratorError, ADS_SERVER, CONTENT_SERVER,
    DEFAULT_CACHE_CAPACITY,
};
pub use prompt_store::{ConnectionStatus, PromptLocation, PromptStore};
pub use response_handler::ResponseHandler;
pub use tool::{Tool, ToolContext, ToolError};
pub use tool_registry::{RegisteredTool, RegistryError, ToolRegistry};
pub use tool_server::{ToolServer, DEFAULT_TOOL_TIMEOUT};
