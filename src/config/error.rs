//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address '{0}'")]
    InvalidSocketAddr(String),

    #[error("Invalid timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("max_concurrent_requests must be between 1 and 1024")]
    InvalidConcurrency,

    #[error("Invalid URL for {field}: '{value}'")]
    InvalidUrl { field: String, value: String },

    #[error("Artifact max_tokens must be greater than zero")]
    InvalidTokenThreshold,

    #[error("Artifact retention_hours must be between 1 and {max}", max = super::artifacts::MAX_RETENTION_HOURS)]
    InvalidRetention,

    #[error("{0} cannot be empty")]
    EmptyValue(&'static str),
}

/// Accepts absolute `http` and `https` URLs.
pub(crate) fn check_http_url(field: impl Into<String>, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty() && !rest.starts_with('/'))
        .unwrap_or(false);
    if has_scheme && has_host {
        Ok(())
    } else {
        Err(ValidationError::InvalidUrl {
            field: field.into(),
            value: value.to_string(),
        })
    }
}
