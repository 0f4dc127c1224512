//! Dispatch gateway configuration

use secrecy::Secret;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::error::{check_http_url, ValidationError};
use crate::adapters::gateway::ServerRecord;
use crate::adapters::tools::ServerKind;

/// One tool server the gateway can reach
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayServerConfig {
    pub base_url: String,

    /// Overrides `server.auth_token` for this server
    pub auth_token: Option<Secret<String>>,

    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Tool servers known to the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Per-call timeout when the caller gives none, in seconds
    #[serde(default = "default_timeout")]
    pub default_timeout_secs: u64,

    /// Server id to location; the five local servers when empty
    #[serde(default)]
    pub servers: BTreeMap<String, GatewayServerConfig>,

    /// Most pure-tool results the orchestrator keeps; 0 disables the cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl GatewayConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    /// Server records for the gateway. `shared_token` is used for servers
    /// without a token of their own.
    pub fn server_records(&self, shared_token: Option<&Secret<String>>) -> Vec<ServerRecord> {
        let with_token = |record: ServerRecord, own: Option<&Secret<String>>| {
            match own.or(shared_token) {
                Some(token) => record.with_auth_token(token.clone()),
                None => record,
            }
        };

        if self.servers.is_empty() {
            return ServerKind::ALL
                .iter()
                .map(|kind| {
                    let record = ServerRecord::new(
                        kind.as_str(),
                        format!("http://127.0.0.1:{}", kind.default_port()),
                    );
                    with_token(record, None)
                })
                .collect();
        }

        self.servers
            .iter()
            .map(|(id, server)| {
                let record = ServerRecord::new(id.clone(), server.base_url.trim())
                    .with_capabilities(server.capabilities.clone());
                with_token(record, server.auth_token.as_ref())
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_timeout_secs == 0 || self.default_timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout("gateway.default_timeout_secs"));
        }
        for (id, server) in &self.servers {
            check_http_url(format!("gateway.servers.{}.base_url", id), &server.base_url)?;
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout(),
            servers: BTreeMap::new(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_cache_capacity() -> usize {
    crate::application::DEFAULT_CACHE_CAPACITY
}
