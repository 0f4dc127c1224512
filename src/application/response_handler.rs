//! Response Handler - inline or offload a tool result.
//!
//! Results whose estimated size is at or below the threshold are returned
//! unchanged. Larger results are written to the artifact store and the
//! caller gets an [`ArtifactReference`] instead.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::artifacts::{estimate_tokens, ArtifactReference, DEFAULT_MAX_TOKENS};
use crate::domain::tools::ToolOutput;
use crate::ports::{ArtifactError, ArtifactStore, StoreRequest};

pub struct ResponseHandler {
    store: Arc<dyn ArtifactStore>,
    max_tokens: u64,
}

impl ResponseHandler {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn max_tokens(&self) -> u64 {
        self.max_tokens
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Returns `data` inline, or offloads it when it exceeds the threshold.
    ///
    /// The artifact is fully written before the reference is returned.
    pub async fn handle(
        &self,
        data: Value,
        prefix: &str,
        metadata: Option<Map<String, Value>>,
    ) -> Result<ToolOutput, ArtifactError> {
        let estimated = estimate_tokens(&data);
        if estimated <= self.max_tokens {
            return Ok(ToolOutput::Inline(data));
        }

        let reason = format!(
            "Response of ~{} tokens exceeds the inline limit of {} tokens",
            estimated, self.max_tokens
        );
        let request = StoreRequest::new(prefix, data)
            .with_metadata(metadata.unwrap_or_default())
            .offloaded(reason);

        let reference: ArtifactReference = self.store.store(request).await?;
        tracing::info!(
            path = %reference.file_path.display(),
            estimated_tokens = reference.estimated_tokens,
            threshold = self.max_tokens,
            "Offloaded large response to artifact"
        );
        Ok(ToolOutput::Artifact(reference))
    }
}
