//! Tool Server - turns `tools/call` envelopes into tool invocations.
//!
//! Per request: parse, check the method, look the tool up, validate the
//! arguments, run the handler under the watchdog, serialize. Every failure
//! along the way becomes an error envelope; nothing escapes as a bare HTTP
//! error.

use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use super::{ToolContext, ToolError, ToolRegistry};
use crate::domain::tools::{
    CallRequest, CallResponse, RequestId, ToolArguments, ToolDescriptor, TOOLS_CALL_METHOD,
};

/// Default watchdog ceiling for a single tool call.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ToolServer {
    service: String,
    registry: ToolRegistry,
    context: ToolContext,
    timeout: Duration,
}

impl ToolServer {
    pub fn new(service: impl Into<String>, registry: ToolRegistry, context: ToolContext) -> Self {
        Self {
            service: service.into(),
            registry,
            context,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Service name reported by `/health`.
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors().cloned().collect()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handles a raw request body.
    pub async fn dispatch_bytes(&self, body: &[u8]) -> CallResponse {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                let err = ToolError::parse(e.to_string());
                tracing::debug!(error = %err, "Rejected unparseable request");
                return CallResponse::failure(None, err.to_rpc_error());
            }
        };

        // Recover the id, if any, so even malformed requests get it echoed.
        let id = value
            .get("id")
            .cloned()
            .and_then(|raw| serde_json::from_value::<RequestId>(raw).ok());

        match serde_json::from_value::<CallRequest>(value) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                let err = ToolError::invalid_request(e.to_string());
                tracing::debug!(error = %err, "Rejected malformed envelope");
                CallResponse::failure(id, err.to_rpc_error())
            }
        }
    }

    /// Handles a decoded request.
    pub async fn dispatch(&self, request: CallRequest) -> CallResponse {
        let id = request.id.clone();
        let started = Instant::now();

        match self.execute(request).await {
            Ok((tool, result)) => {
                tracing::info!(
                    service = %self.service,
                    tool = %tool,
                    id = %id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Tool call completed"
                );
                CallResponse::success(id, result)
            }
            Err(err) => {
                tracing::warn!(
                    service = %self.service,
                    id = %id,
                    code = err.code(),
                    error = %err,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Tool call failed"
                );
                CallResponse::failure(Some(id), err.to_rpc_error())
            }
        }
    }

    async fn execute(&self, request: CallRequest) -> Result<(String, Value), ToolError> {
        if request.method != TOOLS_CALL_METHOD {
            return Err(ToolError::invalid_request(format!(
                "Unsupported method '{}', expected '{}'",
                request.method, TOOLS_CALL_METHOD
            )));
        }
        let params = request
            .params
            .ok_or_else(|| ToolError::invalid_request("Missing 'params'"))?;

        let registered = self
            .registry
            .get(&params.name)
            .ok_or_else(|| ToolError::unknown_tool(&params.name))?;

        let args = ToolArguments::validate(&registered.descriptor, params.arguments)
            .map_err(|e| ToolError::validation(&params.name, e))?;

        let call = AssertUnwindSafe(registered.tool.call(args, &self.context)).catch_unwind();
        let output = match tokio::time::timeout(self.timeout, call).await {
            Err(_) => {
                return Err(ToolError::Timeout {
                    tool: params.name,
                    seconds: self.timeout.as_secs(),
                })
            }
            Ok(Err(_panic)) => {
                return Err(ToolError::internal(format!(
                    "Tool '{}' failed unexpectedly",
                    params.name
                )))
            }
            Ok(Ok(result)) => result?,
        };

        let result = output
            .into_result_value()
            .map_err(|e| ToolError::internal(format!("Failed to serialize result: {}", e)))?;
        Ok((params.name, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::LocalArtifactStore;
    use crate::application::{FallbackPolicyEngine, ResponseHandler, Tool};
    use crate::domain::tools::{codes, CallOutcome, ParamSpec, ParamType, ToolOutput};
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    // ───────────────────────────────────────────────────────────────
    // Test tools
    // ───────────────────────────────────────────────────────────────

    struct Echo;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
        #[serde(default)]
        repeat: usize,
    }

    #[async_trait]
    impl Tool for Echo {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("echo", "Echo text")
                .param(ParamSpec::required("text", ParamType::String, "text"))
                .param(ParamSpec::optional("repeat", ParamType::Integer, "").with_default(json!(1)))
        }

        async fn call(&self, args: ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
            let args: EchoArgs = args
                .parse()
                .map_err(|e| ToolError::validation("echo", e))?;
            Ok(ToolOutput::Inline(json!({"text": args.text.repeat(args.repeat)})))
        }
    }

    struct Sleepy;

    #[async_trait]
    impl Tool for Sleepy {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("sleepy", "Never finishes in time")
        }

        async fn call(&self, _: ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ToolOutput::Inline(Value::Null))
        }
    }

    struct Broken;

    #[async_trait]
    impl Tool for Broken {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("broken", "Panics")
        }

        async fn call(&self, _: ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
            panic!("handler bug")
        }
    }

    fn create_server() -> (ToolServer, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(LocalArtifactStore::new(temp_dir.path()));
        let context = ToolContext::new(
            Arc::new(ResponseHandler::new(store)),
            Arc::new(FallbackPolicyEngine::new()),
        );
        let mut registry = ToolRegistry::new();
        registry.register(Echo).unwrap();
        registry.register(Sleepy).unwrap();
        registry.register(Broken).unwrap();

        let server =
            ToolServer::new("test", registry, context).with_timeout(Duration::from_millis(50));
        (server, temp_dir)
    }

    fn error_code(response: &CallResponse) -> i64 {
        match &response.outcome {
            CallOutcome::Error(e) => e.code,
            CallOutcome::Result(r) => panic!("expected error, got {r}"),
        }
    }

    fn error_message(response: &CallResponse) -> String {
        match &response.outcome {
            CallOutcome::Error(e) => e.message.clone(),
            CallOutcome::Result(r) => panic!("expected error, got {r}"),
        }
    }

    async fn dispatch_json(server: &ToolServer, body: Value) -> CallResponse {
        server.dispatch_bytes(body.to_string().as_bytes()).await
    }

    // ───────────────────────────────────────────────────────────────
    // Tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn successful_call_echoes_id_and_result() {
        let (server, _temp) = create_server();
        let response = dispatch_json(
            &server,
            json!({"id": "r1", "method": "tools/call",
                   "params": {"name": "echo", "arguments": {"text": "ab", "repeat": 2}}}),
        )
        .await;

        assert_eq!(response.id, Some(RequestId::from("r1")));
        assert_eq!(response.outcome, CallOutcome::Result(json!({"text": "abab"})));
    }

    #[tokio::test]
    async fn defaults_are_filled_before_handler_runs() {
        let (server, _temp) = create_server();
        let response = dispatch_json(
            &server,
            json!({"id": 1, "method": "tools/call",
                   "params": {"name": "echo", "arguments": {"text": "x"}}}),
        )
        .await;

        assert_eq!(response.outcome, CallOutcome::Result(json!({"text": "x"})));
    }

    #[tokio::test]
    async fn unknown_tool_is_named_in_error() {
        let (server, _temp) = create_server();
        let response = dispatch_json(
            &server,
            json!({"id": "r2", "method": "tools/call", "params": {"name": "no_such_tool"}}),
        )
        .await;

        assert_eq!(error_code(&response), codes::METHOD_NOT_FOUND);
        assert!(error_message(&response).contains("no_such_tool"));
        assert_eq!(response.id, Some(RequestId::from("r2")));
    }

    #[tokio::test]
    async fn wrong_method_is_invalid_request() {
        let (server, _temp) = create_server();
        let response = dispatch_json(
            &server,
            json!({"id": 5, "method": "tools/list", "params": {"name": "echo"}}),
        )
        .await;

        assert_eq!(error_code(&response), codes::INVALID_REQUEST);
        assert!(error_message(&response).contains("tools/list"));
    }

    #[tokio::test]
    async fn unknown_argument_is_rejected() {
        let (server, _temp) = create_server();
        let response = dispatch_json(
            &server,
            json!({"id": 5, "method": "tools/call",
                   "params": {"name": "echo", "arguments": {"text": "a", "volume": 11}}}),
        )
        .await;

        assert_eq!(error_code(&response), codes::INVALID_PARAMS);
        assert!(error_message(&response).contains("volume"));
    }

    #[tokio::test]
    async fn unparseable_body_is_parse_error_with_null_id() {
        let (server, _temp) = create_server();
        let response = server.dispatch_bytes(b"{not json").await;

        assert_eq!(error_code(&response), codes::PARSE_ERROR);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn envelope_without_method_keeps_id() {
        let (server, _temp) = create_server();
        let response = dispatch_json(&server, json!({"id": "r9", "params": {}})).await;

        assert_eq!(error_code(&response), codes::INVALID_REQUEST);
        assert_eq!(response.id, Some(RequestId::from("r9")));
    }

    #[tokio::test]
    async fn watchdog_turns_slow_handler_into_error() {
        let (server, _temp) = create_server();
        let response = dispatch_json(
            &server,
            json!({"id": "slow", "method": "tools/call", "params": {"name": "sleepy"}}),
        )
        .await;

        assert_eq!(error_code(&response), codes::TOOL_TIMEOUT);
        assert!(error_message(&response).contains("sleepy"));
    }

    #[tokio::test]
    async fn panicking_handler_becomes_internal_error() {
        let (server, _temp) = create_server();
        let response = dispatch_json(
            &server,
            json!({"id": "p", "method": "tools/call", "params": {"name": "broken"}}),
        )
        .await;

        assert_eq!(error_code(&response), codes::INTERNAL);
        assert!(error_message(&response).contains("broken"));
    }

    #[test]
    fn descriptors_follow_registration_order() {
        let (server, _temp) = create_server();
        let names: Vec<_> = server
            .descriptors()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["echo", "sleepy", "broken"]);
    }
}
