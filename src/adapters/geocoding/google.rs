//! Google Geocoding provider.
//!
//! Needs an API key; without one the fallback engine skips it. Google reports
//! most failures in the body `status` field with HTTP 200, so classification
//! looks at both.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{classify_http_status, classify_transport, GeocodeQuery};
use crate::domain::fallback::{Capability, ProviderFailure};
use crate::ports::CapabilityProvider;

pub const GOOGLE_PROVIDER_ID: &str = "google";
pub const GOOGLE_DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
pub const GOOGLE_CREDENTIALS_TAG: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, Clone)]
pub struct GoogleGeocoderConfig {
    api_key: Option<Secret<String>>,
    pub base_url: String,
    pub timeout: Duration,
}

impl GoogleGeocoderConfig {
    pub fn new(api_key: Option<Secret<String>>) -> Self {
        Self {
            api_key,
            base_url: GOOGLE_DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    formatted_address: String,
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    config: GoogleGeocoderConfig,
    client: Client,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleGeocoderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/maps/api/geocode/json",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Maps a non-OK body status to a failure class.
    fn classify_status(status: &str, detail: Option<String>) -> ProviderFailure {
        let message = detail.unwrap_or_else(|| status.to_string());
        match status {
            "ZERO_RESULTS" => ProviderFailure::empty_result(message),
            "REQUEST_DENIED" => ProviderFailure::credential_rejected(message),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => ProviderFailure::quota_exceeded(message),
            "INVALID_REQUEST" => ProviderFailure::empty_result(message),
            _ => ProviderFailure::network(message),
        }
    }
}

#[async_trait]
impl CapabilityProvider for GoogleGeocoder {
    fn id(&self) -> &str {
        GOOGLE_PROVIDER_ID
    }

    fn credentials_tag(&self) -> Option<&str> {
        Some(GOOGLE_CREDENTIALS_TAG)
    }

    fn has_credentials(&self) -> bool {
        self.config
            .api_key
            .as_ref()
            .map(|k| !k.expose_secret().trim().is_empty())
            .unwrap_or(false)
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
        let key = self
            .config
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().clone())
            .unwrap_or_default();

        let mut params = vec![("key", key)];
        match &query {
            GeocodeQuery::Forward { address } => params.push(("address", address.clone())),
            GeocodeQuery::Reverse {
                latitude,
                longitude,
            } => params.push(("latlng", format!("{},{}", latitude, longitude))),
        }

        let response = self
            .client
            .get(self.endpoint())
            .query(&params)
            .send()
            .await
            .map_err(classify_transport)?;

        if response.status() != StatusCode::OK {
            return Err(classify_http_status(response.status()));
        }

        let body: GoogleResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::network(format!("invalid response: {}", e)))?;

        if body.status != "OK" {
            return Err(Self::classify_status(&body.status, body.error_message));
        }

        let first = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ProviderFailure::empty_result("no results"))?;

        Ok(json!({
            "latitude": first.geometry.location.lat,
            "longitude": first.geometry.location.lng,
            "formatted_address": first.formatted_address,
        }))
    }
}
