//! Orchestrator - composes tool calls and prompts into workflows.
//!
//! All tool traffic goes through the [`ToolGateway`]. Results are cached
//! across requests only for tools whose descriptor is marked pure, and only
//! when they came back inline. The cache holds at most
//! [`DEFAULT_CACHE_CAPACITY`] entries unless configured otherwise, evicting
//! the oldest insert first.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use thiserror::Error;

use super::PromptStore;
use crate::domain::tools::{ToolDescriptor, ToolOutput};
use crate::ports::{
    ArtifactError, ArtifactStore, ErrorKind, GatewayError, PromptStoreError, ToolGateway,
};

pub const ADS_SERVER: &str = "ads";
pub const CONTENT_SERVER: &str = "content";

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Prompt store error: {0}")]
    Prompt(#[from] PromptStoreError),

    #[error("Unexpected result from {tool}: {message}")]
    UnexpectedResult { tool: String, message: String },
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::Gateway(e) => e.kind(),
            OrchestratorError::Artifact(_) => ErrorKind::ArtifactIo,
            OrchestratorError::Prompt(PromptStoreError::InvalidName(_)) => ErrorKind::Validation,
            OrchestratorError::Prompt(_) => ErrorKind::Transport,
            OrchestratorError::UnexpectedResult { .. } => ErrorKind::Remote,
        }
    }

    fn unexpected(tool: &str, message: impl Into<String>) -> Self {
        OrchestratorError::UnexpectedResult {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

/// Input of the listing preparation workflow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingRequest {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub condition: Option<String>,
    /// Name of a stored prompt to attach to the draft.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Output of the listing preparation workflow.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDraft {
    pub title: String,
    pub title_suggestions: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Value>,
    pub notes: Vec<String>,
}

type CacheKey = (String, String, String);

/// Insertion-ordered result cache with a fixed capacity.
struct PureCache {
    entries: HashMap<CacheKey, Value>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl PureCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, value: Value) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), value).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub struct Orchestrator {
    gateway: Arc<dyn ToolGateway>,
    artifacts: Arc<dyn ArtifactStore>,
    prompts: Option<Arc<PromptStore>>,
    descriptors: RwLock<HashMap<String, Vec<ToolDescriptor>>>,
    cache: Mutex<PureCache>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn ToolGateway>, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self {
            gateway,
            artifacts,
            prompts: None,
            descriptors: RwLock::new(HashMap::new()),
            cache: Mutex::new(PureCache::new(DEFAULT_CACHE_CAPACITY)),
        }
    }

    /// Caps the number of cached pure results; zero disables caching.
    pub fn with_cache_capacity(self, capacity: usize) -> Self {
        Self {
            cache: Mutex::new(PureCache::new(capacity)),
            ..self
        }
    }

    /// Number of pure results currently cached.
    pub fn cached_results(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn with_prompts(mut self, prompts: Arc<PromptStore>) -> Self {
        self.prompts = Some(prompts);
        self
    }

    /// Fetches and remembers the descriptors a server advertises.
    pub async fn discover(&self, server: &str) -> Result<Vec<ToolDescriptor>, OrchestratorError> {
        let descriptors = self.gateway.list_tools(server).await?;
        if let Ok(mut known) = self.descriptors.write() {
            known.insert(server.to_string(), descriptors.clone());
        }
        Ok(descriptors)
    }

    /// Whether a previously discovered descriptor marks the tool pure.
    pub fn is_pure(&self, server: &str, tool: &str) -> bool {
        self.descriptors
            .read()
            .ok()
            .and_then(|known| {
                known
                    .get(server)
                    .and_then(|tools| tools.iter().find(|d| d.name() == tool))
                    .map(ToolDescriptor::is_pure)
            })
            .unwrap_or(false)
    }

    /// Invokes a tool through the gateway.
    pub async fn call(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
        timeout: Option<Duration>,
    ) -> Result<ToolOutput, OrchestratorError> {
        let pure = self.is_pure(server, tool);
        let key = (server.to_string(), tool.to_string(), arguments.to_string());

        if pure {
            if let Some(hit) = self.cache.lock().ok().and_then(|c| c.get(&key)) {
                tracing::debug!(server, tool, "Serving pure tool result from cache");
                return Ok(ToolOutput::Inline(hit));
            }
        }

        let output = self.gateway.call(server, tool, arguments, timeout).await?;

        if pure {
            if let (ToolOutput::Inline(value), Ok(mut cache)) = (&output, self.cache.lock()) {
                cache.insert(key, value.clone());
            }
        }
        Ok(output)
    }

    /// Returns the data behind an output, reading the artifact when needed.
    pub async fn resolve(&self, output: ToolOutput) -> Result<Value, OrchestratorError> {
        match output {
            ToolOutput::Inline(value) => Ok(value),
            ToolOutput::Artifact(reference) => Ok(self
                .artifacts
                .read_path(&reference.file_path)
                .await?
                .data),
        }
    }

    /// Calls a tool and resolves its output in one step.
    pub async fn call_resolved(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, OrchestratorError> {
        let output = self.call(server, tool, arguments, None).await?;
        self.resolve(output).await
    }

    /// Optimizes the title, geocodes the location and writes a description.
    ///
    /// A geocoding chain that is exhausted is not fatal: the draft is returned
    /// without coordinates and the failure is recorded in `notes`.
    pub async fn prepare_listing(
        &self,
        request: ListingRequest,
    ) -> Result<ListingDraft, OrchestratorError> {
        let mut notes = Vec::new();

        let mut title_args = Map::new();
        title_args.insert("title".into(), json!(request.title));
        title_args.insert("category".into(), json!(request.category));
        if let Some(location) = &request.location {
            title_args.insert("location".into(), json!(location));
        }
        let titles = self
            .call_resolved(ADS_SERVER, "optimize_listing_title", Value::Object(title_args))
            .await?;
        let title_suggestions: Vec<String> = titles
            .get("optimized_suggestions")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| OrchestratorError::unexpected("optimize_listing_title", e.to_string()))?
            .unwrap_or_default();
        let title = title_suggestions
            .first()
            .cloned()
            .unwrap_or_else(|| request.title.clone());

        let location = match &request.location {
            Some(address) => {
                match self
                    .call_resolved(CONTENT_SERVER, "geocode_location", json!({"address": address}))
                    .await
                {
                    Ok(found) => {
                        if let Some(note) = found.get("note").and_then(Value::as_str) {
                            notes.push(note.to_string());
                        }
                        Some(found)
                    }
                    Err(e) if e.kind() == ErrorKind::ProviderExhausted => {
                        notes.push(format!("Location could not be geocoded: {}", e));
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            None => None,
        };

        let prompt = match (&request.prompt, &self.prompts) {
            (Some(name), Some(store)) => {
                let loaded = store.load(name, true).await?;
                if loaded.is_none() {
                    notes.push(format!("Prompt '{}' not found", name));
                }
                loaded
            }
            (Some(name), None) => {
                notes.push(format!("Prompt '{}' requested but no prompt store configured", name));
                None
            }
            _ => None,
        };

        let mut description_args = Map::new();
        description_args.insert("title".into(), json!(title));
        description_args.insert("category".into(), json!(request.category));
        description_args.insert("features".into(), json!(request.features));
        if let Some(location) = &request.location {
            description_args.insert("location".into(), json!(location));
        }
        if let Some(condition) = &request.condition {
            description_args.insert("condition".into(), json!(condition));
        }
        let described = self
            .call_resolved(
                ADS_SERVER,
                "generate_listing_description",
                Value::Object(description_args),
            )
            .await?;
        let description = described
            .get("description")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                OrchestratorError::unexpected("generate_listing_description", "missing description")
            })?
            .to_string();

        Ok(ListingDraft {
            title,
            title_suggestions,
            description,
            location,
            prompt,
            notes,
        })
    }
}
