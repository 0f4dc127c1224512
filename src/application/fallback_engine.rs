//! Fallback Policy Engine - ordered provider chains per capability.
//!
//! Providers are tried in strict list order. A provider without credentials
//! is skipped (`credential_missing`) without being contacted; every other
//! classified failure moves on to the next entry. A panic inside a provider
//! counts as `network_error`.
//!
//! # Example
//!
//! ```ignore
//! let engine = FallbackPolicyEngine::new()
//!     .with_chain(Capability::Geocode, vec![google, nominatim]);
//!
//! let success = engine.invoke(Capability::Geocode, &json!({"address": "Cluj"})).await?;
//! println!("answered by {}", success.provider_id);
//! ```

use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::domain::fallback::{
    summarize, Capability, FailureClass, FallbackError, FallbackSuccess, ProviderAttempt,
    ProviderFailure,
};
use crate::ports::CapabilityProvider;

/// Receives a notification each time the engine moves past a provider.
pub trait FallbackObserver: Send + Sync {
    fn on_switch(&self, capability: Capability, from: &str, to: &str, class: FailureClass);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy)]
pub struct NoOpFallbackObserver;

impl FallbackObserver for NoOpFallbackObserver {
    fn on_switch(&self, _: Capability, _: &str, _: &str, _: FailureClass) {}
}

pub struct FallbackPolicyEngine {
    chains: HashMap<Capability, Vec<Arc<dyn CapabilityProvider>>>,
    observer: Arc<dyn FallbackObserver>,
}

impl Default for FallbackPolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackPolicyEngine {
    pub fn new() -> Self {
        Self {
            chains: HashMap::new(),
            observer: Arc::new(NoOpFallbackObserver),
        }
    }

    /// Sets the ordered chain for a capability, replacing any previous one.
    ///
    /// Providers that do not support the capability are left out.
    pub fn with_chain(
        mut self,
        capability: Capability,
        providers: Vec<Arc<dyn CapabilityProvider>>,
    ) -> Self {
        let chain = providers
            .into_iter()
            .filter(|p| p.supports(capability))
            .collect();
        self.chains.insert(capability, chain);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn FallbackObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Provider ids of a chain, in order.
    pub fn chain(&self, capability: Capability) -> Vec<&str> {
        self.chains
            .get(&capability)
            .map(|chain| chain.iter().map(|p| p.id()).collect())
            .unwrap_or_default()
    }

    /// Runs the chain for `capability` until one provider succeeds.
    pub async fn invoke(
        &self,
        capability: Capability,
        input: &Value,
    ) -> Result<FallbackSuccess, FallbackError> {
        let chain = match self.chains.get(&capability) {
            Some(chain) if !chain.is_empty() => chain,
            _ => return Err(FallbackError::NoChain(capability)),
        };

        let mut attempts: Vec<ProviderAttempt> = Vec::with_capacity(chain.len());

        for (index, provider) in chain.iter().enumerate() {
            let outcome = if provider.has_credentials() {
                Self::attempt(provider.as_ref(), capability, input).await
            } else {
                Err(ProviderFailure::new(
                    FailureClass::CredentialMissing,
                    format!(
                        "{} is not configured",
                        provider.credentials_tag().unwrap_or("credential")
                    ),
                ))
            };

            match outcome {
                Ok(result) => {
                    attempts.push(ProviderAttempt::succeeded(provider.id()));
                    let note = (index > 0).then(|| {
                        format!(
                            "Served by {} after earlier providers failed: {}",
                            provider.id(),
                            summarize(&attempts[..index])
                        )
                    });
                    return Ok(FallbackSuccess {
                        provider_id: provider.id().to_string(),
                        result,
                        note,
                        attempts,
                    });
                }
                Err(failure) => {
                    if let Some(next) = chain.get(index + 1) {
                        tracing::warn!(
                            capability = %capability,
                            from = provider.id(),
                            to = next.id(),
                            classification = %failure.class,
                            detail = %failure.message,
                            "Falling back to next provider"
                        );
                        self.observer
                            .on_switch(capability, provider.id(), next.id(), failure.class);
                    } else {
                        tracing::warn!(
                            capability = %capability,
                            provider = provider.id(),
                            classification = %failure.class,
                            detail = %failure.message,
                            "Last provider in chain failed"
                        );
                    }
                    attempts.push(ProviderAttempt::failed(provider.id(), &failure));
                }
            }
        }

        Err(FallbackError::ProviderExhausted {
            capability,
            attempts,
        })
    }

    async fn attempt(
        provider: &dyn CapabilityProvider,
        capability: Capability,
        input: &Value,
    ) -> Result<Value, ProviderFailure> {
        let result = AssertUnwindSafe(provider.attempt(capability, input))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(ProviderFailure::network(format!(
                    "{} failed unexpectedly",
                    provider.id()
                )))
            })?;

        if is_empty(&result) {
            return Err(ProviderFailure::empty_result(format!(
                "{} returned no result",
                provider.id()
            )));
        }
        Ok(result)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
