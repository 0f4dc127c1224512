//! Nominatim (OpenStreetMap) geocoding provider.
//!
//! Free and keyless, but the usage policy requires an identifying
//! User-Agent and rejects clients that send too many requests.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{classify_http_status, classify_transport, GeocodeQuery};
use crate::domain::fallback::{Capability, ProviderFailure};
use crate::ports::CapabilityProvider;

pub const NOMINATIM_PROVIDER_ID: &str = "nominatim";
pub const NOMINATIM_DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_DEFAULT_BASE_URL.to_string(),
            user_agent: format!("piata-mcp/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(10),
        }
    }
}

impl NominatimConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimPlace {
    fn into_result(self) -> Result<Value, ProviderFailure> {
        let parse = |raw: &str| {
            raw.parse::<f64>()
                .map_err(|_| ProviderFailure::network(format!("invalid coordinate '{}'", raw)))
        };
        Ok(json!({
            "latitude": parse(&self.lat)?,
            "longitude": parse(&self.lon)?,
            "formatted_address": self.display_name,
        }))
    }
}

pub struct NominatimGeocoder {
    config: NominatimConfig,
    client: Client,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl CapabilityProvider for NominatimGeocoder {
    fn id(&self) -> &str {
        NOMINATIM_PROVIDER_ID
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::Geocode | Capability::ReverseGeocode)
    }

    async fn attempt(
        &self,
        capability: Capability,
        input: &Value,
    ) -> Result<Value, ProviderFailure> {
        let query = GeocodeQuery::from_input(capability, input)?;

        let request = match &query {
            GeocodeQuery::Forward { address } => self.client.get(self.endpoint("search")).query(&[
                ("q", address.as_str()),
                ("format", "json"),
                ("limit", "1"),
            ]),
            GeocodeQuery::Reverse {
                latitude,
                longitude,
            } => self.client.get(self.endpoint("reverse")).query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ]),
        };

        let response = request.send().await.map_err(classify_transport)?;
        if !response.status().is_success() {
            return Err(classify_http_status(response.status()));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderFailure::network(format!("invalid response: {}", e)))?;

        let place = match (query, body) {
            (GeocodeQuery::Forward { .. }, Value::Array(mut places)) => {
                if places.is_empty() {
                    return Err(ProviderFailure::empty_result("no places found"));
                }
                places.swap_remove(0)
            }
            (GeocodeQuery::Reverse { .. }, body) if body.get("error").is_some() => {
                return Err(ProviderFailure::empty_result(
                    body["error"].as_str().unwrap_or("no place at coordinates").to_string(),
                ))
            }
            (GeocodeQuery::Reverse { .. }, body @ Value::Object(_)) => body,
            (_, other) => {
                return Err(ProviderFailure::network(format!(
                    "unexpected response shape: {}",
                    other
                )))
            }
        };

        serde_json::from_value::<NominatimPlace>(place)
            .map_err(|e| ProviderFailure::network(format!("invalid place: {}", e)))?
            .into_result()
    }
}
