//! Artifact store configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Longest accepted retention: one hundred years.
pub const MAX_RETENTION_HOURS: u64 = 24 * 365 * 100;

/// Where large tool results are written and how long they are kept
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Artifact directory
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Inline-vs-file threshold, in estimated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,

    /// Default age for purges, in hours
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
}

impl ArtifactsConfig {
    pub fn retention(&self) -> Result<chrono::Duration, ValidationError> {
        retention_duration(self.retention_hours)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyValue("artifacts.dir"));
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidTokenThreshold);
        }
        if self.retention_hours == 0 {
            return Err(ValidationError::InvalidRetention);
        }
        retention_duration(self.retention_hours)?;
        Ok(())
    }
}

/// Converts a purge age in hours, rejecting ages past [`MAX_RETENTION_HOURS`].
pub fn retention_duration(hours: u64) -> Result<chrono::Duration, ValidationError> {
    if hours > MAX_RETENTION_HOURS {
        return Err(ValidationError::InvalidRetention);
    }
    i64::try_from(hours)
        .ok()
        .and_then(chrono::TimeDelta::try_hours)
        .ok_or(ValidationError::InvalidRetention)
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            max_tokens: default_max_tokens(),
            retention_hours: default_retention_hours(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("./element_clones")
}

fn default_max_tokens() -> u64 {
    crate::domain::artifacts::DEFAULT_MAX_TOKENS
}

fn default_retention_hours() -> u64 {
    24
}
