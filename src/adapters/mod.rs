//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application layer to the outside world:
//! - `artifacts` - artifact directory on the local filesystem
//! - `prompts` - local and HTTP prompt backends
//! - `gateway` - HTTP dispatch gateway to tool servers
//! - `geocoding` - Google and Nominatim capability providers
//! - `tools` - the five tool catalogs
//! - `http` - axum surface that hosts a tool server

pub mod artifacts;
pub mod gateway;
pub mod geocoding;
pub mod http;
pub mod prompts;
pub mod tools;

pub use artifacts::LocalArtifactStore;
pub use gateway::{HttpToolGateway, ServerRecord};
pub use geocoding::{GoogleGeocoder, GoogleGeocoderConfig, NominatimConfig, NominatimGeocoder};
pub use prompts::{HttpPromptBackend, HttpPromptConfig, LocalPromptBackend};
pub use tools::ServerKind;
