//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application layer and the outside world. Adapters implement these ports.
//!
//! - `ArtifactStore` - directory of large tool results
//! - `PromptBackend` - one tier (remote or local) of the prompt store
//! - `CapabilityProvider` - an entry of a fallback chain (e.g. a geocoder)
//! - `ToolGateway` - typed remote invocation of tool servers

mod artifact_store;
mod capability_provider;
mod prompt_backend;
mod tool_gateway;

pub use artifact_store::{ArtifactError, ArtifactStore, StoreRequest};
pub use capability_provider::CapabilityProvider;
pub use prompt_backend::{PromptBackend, PromptStoreError};
pub use tool_gateway::{ErrorKind, GatewayError, ToolGateway, TransportKind};
