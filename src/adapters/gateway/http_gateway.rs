//! HTTP Dispatch Gateway - Implementation of ToolGateway over reqwest.
//!
//! One POST per call, no retries. The gateway keeps no persistent state; the
//! only thing it remembers is when each server last answered, in memory.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::domain::tools::{
    CallOutcome, CallRequest, CallResponse, RequestId, ToolDescriptor, ToolOutput,
};
use crate::ports::{GatewayError, ToolGateway, TransportKind};

/// Where a tool server lives and how to authenticate to it.
#[derive(Debug, Clone)]
pub struct ServerRecord {
    pub id: String,
    pub base_url: String,
    auth_token: Option<Secret<String>>,
    pub capabilities: Vec<String>,
}

impl ServerRecord {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            auth_token: None,
            capabilities: Vec::new(),
        }
    }

    pub fn with_auth_token(mut self, token: Secret<String>) -> Self {
        self.auth_token = Some(token);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Deserialize)]
struct ToolListing {
    tools: Vec<ToolDescriptor>,
}

pub struct HttpToolGateway {
    servers: HashMap<String, ServerRecord>,
    client: Client,
    default_timeout: Duration,
    last_healthy: RwLock<HashMap<String, Timestamp>>,
}

impl HttpToolGateway {
    pub fn new(
        servers: impl IntoIterator<Item = ServerRecord>,
        default_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            servers: servers
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
            client,
            default_timeout,
            last_healthy: RwLock::new(HashMap::new()),
        })
    }

    pub fn server(&self, id: &str) -> Result<&ServerRecord, GatewayError> {
        self.servers
            .get(id)
            .ok_or_else(|| GatewayError::configuration(format!("Unknown server '{}'", id)))
    }

    /// Configured server ids, sorted.
    pub fn server_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.servers.keys().map(String::as_str).collect();
        ids.sort();
        ids
    }

    /// When the server last completed an exchange, if known.
    pub fn last_healthy(&self, id: &str) -> Option<Timestamp> {
        self.last_healthy
            .read()
            .ok()
            .and_then(|map| map.get(id).copied())
    }

    /// Last-known-healthy time, probing `/health` when nothing is cached.
    pub async fn server_status(&self, id: &str) -> Result<Timestamp, GatewayError> {
        if let Some(at) = self.last_healthy(id) {
            return Ok(at);
        }
        self.health(id).await?;
        self.last_healthy(id).ok_or_else(|| {
            GatewayError::transport(TransportKind::Status, format!("{} did not report healthy", id))
        })
    }

    fn mark_healthy(&self, id: &str) {
        if let Ok(mut map) = self.last_healthy.write() {
            map.insert(id.to_string(), Timestamp::now());
        }
    }

    fn mark_unhealthy(&self, id: &str) {
        if let Ok(mut map) = self.last_healthy.write() {
            map.remove(id);
        }
    }

    fn authorized(record: &ServerRecord, request: RequestBuilder) -> RequestBuilder {
        match &record.auth_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send_json(
        record: &ServerRecord,
        request: RequestBuilder,
    ) -> Result<Value, GatewayError> {
        let response = Self::authorized(record, request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::transport(
                TransportKind::Status,
                format!("{} returned HTTP {}", record.id, status),
            ));
        }
        // Body reads share the request deadline, so this can still time out.
        Ok(response.json::<Value>().await?)
    }

    /// Sends a request and decodes a 2xx JSON body. Transport failures clear
    /// the server's health entry.
    async fn exchange(
        &self,
        record: &ServerRecord,
        request: RequestBuilder,
    ) -> Result<Value, GatewayError> {
        let result = Self::send_json(record, request).await;

        match &result {
            Ok(_) => self.mark_healthy(&record.id),
            Err(e) => {
                tracing::warn!(server = %record.id, error = %e, "Tool server exchange failed");
                self.mark_unhealthy(&record.id);
            }
        }
        result
    }
}

#[async_trait]
impl ToolGateway for HttpToolGateway {
    async fn call(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
        timeout: Option<Duration>,
    ) -> Result<ToolOutput, GatewayError> {
        let record = self.server(server)?;
        let id = RequestId::generate();
        let body = CallRequest::tools_call(id.clone(), tool, arguments);
        let timeout = timeout.unwrap_or(self.default_timeout);

        tracing::debug!(server, tool, id = %id, "Dispatching tool call");

        let request = self
            .client
            .post(record.endpoint("call"))
            .timeout(timeout)
            .json(&body);
        let raw = self.exchange(record, request).await?;

        let response = CallResponse::from_value(raw)
            .map_err(|e| GatewayError::transport(TransportKind::Malformed, e))?;

        match (response.id, response.outcome) {
            (_, CallOutcome::Error(error)) => {
                Err(GatewayError::remote(error.code, error.message, error.data))
            }
            (Some(echoed), CallOutcome::Result(result)) if echoed == id => {
                Ok(ToolOutput::from_result_value(result))
            }
            (echoed, CallOutcome::Result(_)) => Err(GatewayError::transport(
                TransportKind::Malformed,
                format!(
                    "response id {:?} does not match request id {}",
                    echoed.map(|e| e.to_string()),
                    id
                ),
            )),
        }
    }

    async fn list_tools(&self, server: &str) -> Result<Vec<ToolDescriptor>, GatewayError> {
        let record = self.server(server)?;
        let request = self
            .client
            .get(record.endpoint("tools"))
            .timeout(self.default_timeout);
        let raw = self.exchange(record, request).await?;

        serde_json::from_value::<ToolListing>(raw)
            .map(|listing| listing.tools)
            .map_err(|e| GatewayError::transport(TransportKind::Malformed, e.to_string()))
    }

    async fn health(&self, server: &str) -> Result<Value, GatewayError> {
        let record = self.server(server)?;
        let request = self
            .client
            .get(record.endpoint("health"))
            .timeout(self.default_timeout);
        self.exchange(record, request).await
    }
}
