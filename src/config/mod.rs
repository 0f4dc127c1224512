//! Application configuration module
//!
//! Configuration is loaded from environment variables with the `config` and
//! `dotenvy` crates. Structured keys use the `PIATA` prefix with `__` between
//! nested names; the short deployment variables (`MCP_SERVER_URL`,
//! `ARTIFACT_DIR`, ...) are applied on top of them.
//!
//! # Example
//!
//! ```no_run
//! use piata_mcp::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Artifacts go to {}", config.artifacts.dir.display());
//! ```

mod artifacts;
mod error;
mod gateway;
mod prompts;
mod providers;
mod server;

pub use artifacts::{retention_duration, ArtifactsConfig, MAX_RETENTION_HOURS};
pub use error::{ConfigError, ValidationError};
pub use gateway::{GatewayConfig, GatewayServerConfig};
pub use prompts::PromptsConfig;
pub use providers::ProvidersConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;
use std::collections::HashMap;

/// Flat deployment variables and the structured key each one sets.
const FLAT_OVERRIDES: &[(&str, &[&str])] = &[
    ("MCP_SERVER_URL", &["prompts.remote_url"]),
    ("MCP_AUTH_TOKEN", &["prompts.auth_token", "server.auth_token"]),
    ("ARTIFACT_DIR", &["artifacts.dir"]),
    ("ARTIFACT_MAX_TOKENS", &["artifacts.max_tokens"]),
    ("ARTIFACT_RETENTION_HOURS", &["artifacts.retention_hours"]),
    ("PROMPT_DIR", &["prompts.local_dir"]),
    ("GOOGLE_MAPS_API_KEY", &["providers.google_maps_api_key"]),
    ("NOMINATIM_URL", &["providers.nominatim_url"]),
];

/// Root application configuration
///
/// Every section has usable defaults, so an empty environment yields a
/// working local setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Tool server listener (host, port, auth, limits)
    #[serde(default)]
    pub server: ServerConfig,

    /// Artifact directory, inline threshold and retention
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Remote prompt service and local prompt directory
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Tool servers reachable through the dispatch gateway
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Geocoding providers
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Reads `.env` first when present.
    ///
    /// # Environment Variable Format
    ///
    /// - `PIATA__SERVER__PORT=9000` -> `server.port = 9000`
    /// - `PIATA__GATEWAY__SERVERS__ADS__BASE_URL=...` -> `gateway.servers.ads.base_url`
    /// - `ARTIFACT_DIR=/var/lib/piata` -> `artifacts.dir`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();
        Self::load_from(std::env::vars())
    }

    /// Load configuration from an explicit set of variables.
    pub fn load_from<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        let mut builder = config::Config::builder().add_source(
            config::Environment::default()
                .prefix("PIATA")
                .separator("__")
                .source(Some(vars.clone())),
        );

        for (variable, keys) in FLAT_OVERRIDES {
            let value = vars
                .get(*variable)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            if value.is_none() {
                continue;
            }
            for key in *keys {
                builder = builder.set_override_option(*key, value.clone())?;
            }
        }

        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found, section by section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.artifacts.validate()?;
        self.prompts.validate()?;
        self.gateway.validate()?;
        self.providers.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
