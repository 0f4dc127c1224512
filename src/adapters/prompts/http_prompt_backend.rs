//! Remote prompt backend - talks to the prompt service over HTTP.
//!
//! Endpoints used:
//!
//! - `POST /prompts` with `{name, content, ...}`
//! - `GET /prompts/<name>` (404 when absent)
//! - `GET /prompts` returning `{prompts: [...]}`
//! - `GET /health`
//! - `GET /tools` returning `{<server_id>: [<tool>, ...]}`

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::prompts::{validate_prompt_name, PromptDocument};
use crate::ports::{PromptBackend, PromptStoreError};

/// Configuration for the remote prompt service.
#[derive(Debug, Clone)]
pub struct HttpPromptConfig {
    pub base_url: String,
    auth_token: Option<Secret<String>>,
    pub timeout: Duration,
}

impl HttpPromptConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_auth_token(mut self, token: Secret<String>) -> Self {
        self.auth_token = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Prompt backend backed by the remote prompt service.
pub struct HttpPromptBackend {
    config: HttpPromptConfig,
    base_url: Url,
    client: Client,
}

impl HttpPromptBackend {
    pub fn new(config: HttpPromptConfig) -> Result<Self, PromptStoreError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            PromptStoreError::unreachable(format!("invalid URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PromptStoreError::unreachable(format!(
                "URL '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PromptStoreError::unreachable(e.to_string()))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn get_json(&self, url: Url) -> Result<Option<Value>, PromptStoreError> {
        let response = self.authorized(self.client.get(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PromptStoreError::status(response.status().as_u16()));
        }
        Ok(Some(response.json::<Value>().await?))
    }
}

#[async_trait]
impl PromptBackend for HttpPromptBackend {
    fn label(&self) -> &'static str {
        "remote"
    }

    async fn save(&self, document: &PromptDocument) -> Result<(), PromptStoreError> {
        validate_prompt_name(&document.name)?;
        let response = self
            .authorized(self.client.post(self.endpoint(&["prompts"])))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PromptStoreError::status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Value>, PromptStoreError> {
        validate_prompt_name(name)?;
        self.get_json(self.endpoint(&["prompts", name])).await
    }

    async fn list(&self) -> Result<Vec<String>, PromptStoreError> {
        let body = self
            .get_json(self.endpoint(&["prompts"]))
            .await?
            .ok_or_else(|| PromptStoreError::status(StatusCode::NOT_FOUND.as_u16()))?;

        let entries = body
            .get("prompts")
            .and_then(Value::as_array)
            .ok_or_else(|| PromptStoreError::malformed("expected {\"prompts\": [...]}"))?;

        // Entries are names, or objects carrying a name.
        Ok(entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.clone()),
                other => other.get("name").and_then(Value::as_str).map(str::to_string),
            })
            .collect())
    }

    async fn health(&self) -> Result<(), PromptStoreError> {
        let response = self
            .authorized(self.client.get(self.endpoint(&["health"])))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(PromptStoreError::status(response.status().as_u16()))
        }
    }

    async fn available_tools(&self) -> Result<BTreeMap<String, Vec<String>>, PromptStoreError> {
        let body = match self.get_json(self.endpoint(&["tools"])).await? {
            Some(Value::Object(map)) => map,
            Some(_) => return Err(PromptStoreError::malformed("expected an object of servers")),
            None => return Ok(BTreeMap::new()),
        };

        Ok(body
            .into_iter()
            .filter_map(|(server, tools)| {
                let names = tools
                    .as_array()?
                    .iter()
                    .filter_map(|t| match t {
                        Value::String(name) => Some(name.clone()),
                        other => other.get("name").and_then(Value::as_str).map(str::to_string),
                    })
                    .collect();
                Some((server, names))
            })
            .collect())
    }
}
