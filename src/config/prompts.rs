//! Prompt store configuration

use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{check_http_url, ValidationError};

/// Remote prompt service plus the local fallback directory
#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    /// Base URL of the remote prompt service; local only when unset
    pub remote_url: Option<String>,

    /// Bearer token for the remote service
    pub auth_token: Option<Secret<String>>,

    /// Local prompt directory
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// Remote request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl PromptsConfig {
    /// Remote URL, ignoring a blank value.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = self.remote_url() {
            check_http_url("prompts.remote_url", url)?;
        }
        if self.local_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyValue("prompts.local_dir"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("prompts.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            auth_token: None,
            local_dir: default_local_dir(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("./prompts")
}

fn default_timeout() -> u64 {
    10
}
