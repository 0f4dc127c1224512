//! Geocoding providers for the `geocode` and `reverse_geocode` chains.

mod google;
mod nominatim;

pub use google::{
    GoogleGeocoder, GoogleGeocoderConfig, GOOGLE_CREDENTIALS_TAG, GOOGLE_DEFAULT_BASE_URL,
    GOOGLE_PROVIDER_ID,
};
pub use nominatim::{
    NominatimConfig, NominatimGeocoder, NOMINATIM_DEFAULT_BASE_URL, NOMINATIM_PROVIDER_ID,
};

use reqwest::StatusCode;
use serde_json::Value;

use crate::domain::fallback::{Capability, ProviderFailure};

/// Provider-neutral geocoding request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GeocodeQuery {
    Forward { address: String },
    Reverse { latitude: f64, longitude: f64 },
}

impl GeocodeQuery {
    /// Reads `{address}` or `{latitude, longitude}` depending on capability.
    pub(crate) fn from_input(capability: Capability, input: &Value) -> Result<Self, ProviderFailure> {
        match capability {
            Capability::Geocode => input
                .get("address")
                .and_then(Value::as_str)
                .filter(|a| !a.trim().is_empty())
                .map(|a| GeocodeQuery::Forward {
                    address: a.to_string(),
                })
                .ok_or_else(|| ProviderFailure::empty_result("no address given")),
            Capability::ReverseGeocode => {
                let lat = input.get("latitude").and_then(Value::as_f64);
                let lon = input.get("longitude").and_then(Value::as_f64);
                match (lat, lon) {
                    (Some(latitude), Some(longitude)) => Ok(GeocodeQuery::Reverse {
                        latitude,
                        longitude,
                    }),
                    _ => Err(ProviderFailure::empty_result("no coordinates given")),
                }
            }
        }
    }
}

pub(crate) fn classify_transport(err: reqwest::Error) -> ProviderFailure {
    ProviderFailure::network(err.to_string())
}

pub(crate) fn classify_http_status(status: StatusCode) -> ProviderFailure {
    let message = format!("HTTP {}", status);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderFailure::credential_rejected(message)
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderFailure::quota_exceeded(message),
        StatusCode::NOT_FOUND => ProviderFailure::empty_result(message),
        _ => ProviderFailure::network(message),
    }
}
