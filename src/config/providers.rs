//! Capability provider configuration (geocoding)

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::{check_http_url, ValidationError};
use crate::adapters::geocoding::{
    GoogleGeocoderConfig, NominatimConfig, GOOGLE_DEFAULT_BASE_URL, NOMINATIM_DEFAULT_BASE_URL,
};

/// Geocoder credentials and endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Google Maps key; Google is skipped when unset
    pub google_maps_api_key: Option<Secret<String>>,

    #[serde(default = "default_google_url")]
    pub google_base_url: String,

    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// Identifying User-Agent required by Nominatim's usage policy
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn google(&self) -> GoogleGeocoderConfig {
        GoogleGeocoderConfig::new(self.google_maps_api_key.clone())
            .with_base_url(self.google_base_url.trim())
            .with_timeout(self.timeout())
    }

    pub fn nominatim(&self) -> NominatimConfig {
        NominatimConfig::default()
            .with_base_url(self.nominatim_url.trim())
            .with_user_agent(self.user_agent.trim())
            .with_timeout(self.timeout())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_http_url("providers.google_base_url", &self.google_base_url)?;
        check_http_url("providers.nominatim_url", &self.nominatim_url)?;
        if self.user_agent.trim().is_empty() {
            return Err(ValidationError::EmptyValue("providers.user_agent"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("providers.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            google_maps_api_key: None,
            google_base_url: default_google_url(),
            nominatim_url: default_nominatim_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_google_url() -> String {
    GOOGLE_DEFAULT_BASE_URL.to_string()
}

fn default_nominatim_url() -> String {
    NOMINATIM_DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("piata-mcp/{} (+https://www.piata.ro)", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProvidersConfig::default();
        assert!(config.google_maps_api_key.is_none());
        assert!(config.validate().is_ok());
        assert!(config.nominatim().user_agent.starts_with("piata-mcp/"));
    }

    #[test]
    fn test_blank_user_agent_is_rejected() {
        let config = ProvidersConfig {
            user_agent: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptyValue("providers.user_agent"))
        );
    }
}
