//! Fallback chains - capabilities, failure classes and attempt records.
//!
//! The ordering and switching rules live in the application layer; this
//! module only holds the vocabulary shared by providers and callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A coarse classification under which providers are substitutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Geocode,
    ReverseGeocode,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Geocode => "geocode",
            Capability::ReverseGeocode => "reverse_geocode",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geocode" => Ok(Capability::Geocode),
            "reverse_geocode" => Ok(Capability::ReverseGeocode),
            other => Err(format!("unknown capability '{}'", other)),
        }
    }
}

/// Why a provider did not produce a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Required credentials are not configured; the provider was never contacted.
    CredentialMissing,
    CredentialRejected,
    QuotaExceeded,
    NetworkError,
    EmptyResult,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::CredentialMissing => "credential_missing",
            FailureClass::CredentialRejected => "credential_rejected",
            FailureClass::QuotaExceeded => "quota_exceeded",
            FailureClass::NetworkError => "network_error",
            FailureClass::EmptyResult => "empty_result",
        }
    }

    /// Whether the provider was actually contacted before failing.
    pub fn was_contacted(&self) -> bool {
        !matches!(self, FailureClass::CredentialMissing)
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified provider failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{class}: {message}")]
pub struct ProviderFailure {
    pub class: FailureClass,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn credential_rejected(message: impl Into<String>) -> Self {
        Self::new(FailureClass::CredentialRejected, message)
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(FailureClass::QuotaExceeded, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureClass::NetworkError, message)
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::new(FailureClass::EmptyResult, message)
    }
}

/// Record of one provider in a chain traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    pub provider_id: String,
    /// `None` when this provider produced the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<FailureClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProviderAttempt {
    pub fn succeeded(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            classification: None,
            detail: None,
        }
    }

    pub fn failed(provider_id: impl Into<String>, failure: &ProviderFailure) -> Self {
        Self {
            provider_id: provider_id.into(),
            classification: Some(failure.class),
            detail: Some(failure.message.clone()),
        }
    }
}

/// Successful chain traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackSuccess {
    pub provider_id: String,
    pub result: Value,
    /// Set when a provider other than the first one answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub attempts: Vec<ProviderAttempt>,
}

/// Errors from a chain traversal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FallbackError {
    #[error("No providers configured for {0}")]
    NoChain(Capability),

    #[error("All providers failed for {capability}: {}", summarize(.attempts))]
    ProviderExhausted {
        capability: Capability,
        attempts: Vec<ProviderAttempt>,
    },
}

impl FallbackError {
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            FallbackError::NoChain(_) => &[],
            FallbackError::ProviderExhausted { attempts, .. } => attempts,
        }
    }
}

/// Renders `google=credential_rejected, nominatim=network_error`.
pub fn summarize(attempts: &[ProviderAttempt]) -> String {
    attempts
        .iter()
        .map(|a| match a.classification {
            Some(class) => format!("{}={}", a.provider_id, class),
            None => format!("{}=ok", a.provider_id),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
