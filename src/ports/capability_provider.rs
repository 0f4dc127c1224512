//! Capability Provider Port - one entry of a fallback chain.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::fallback::{Capability, ProviderFailure};

/// An external provider able to serve one or more capabilities.
///
/// Implementations classify every failure; the fallback engine decides
/// whether to move on.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Stable provider id reported in results and attempt records.
    fn id(&self) -> &str;

    /// Name of the credential this provider needs, if any.
    fn credentials_tag(&self) -> Option<&str> {
        None
    }

    /// Whether the required credentials are configured.
    fn has_credentials(&self) -> bool {
        true
    }

    /// Whether this provider can serve `capability`.
    fn supports(&self, capability: Capability) -> bool;

    /// Attempts the capability once.
    async fn attempt(&self, capability: Capability, input: &Value)
        -> Result<Value, ProviderFailure>;
}
