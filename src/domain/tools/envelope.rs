//! JSON-RPC shaped call envelopes exchanged on `POST /call`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version carried by every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// The only method a tool server accepts.
pub const TOOLS_CALL_METHOD: &str = "tools/call";

/// Error codes carried in `error.code`.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const TOOL_TIMEOUT: i64 = -32000;
    pub const PROVIDER_EXHAUSTED: i64 = -32010;
    pub const ARTIFACT_IO: i64 = -32020;
    pub const INTERNAL: i64 = -1;
}

/// Opaque correlation id, echoed verbatim in the response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(serde_json::Number),
    String(String),
}

impl RequestId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        RequestId::String(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        RequestId::String(value.to_string())
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        RequestId::Number(value.into())
    }
}

/// `params` of a `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// A `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<CallParams>,
}

impl CallRequest {
    /// Builds a well-formed `tools/call` request.
    pub fn tools_call(id: RequestId, tool: impl Into<String>, arguments: Value) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            id,
            method: TOOLS_CALL_METHOD.to_string(),
            params: Some(CallParams {
                name: tool.into(),
                arguments: Some(arguments),
            }),
        }
    }
}

/// The `error` member of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Response envelope: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResponse {
    pub jsonrpc: String,
    /// `null` only when the request could not be parsed far enough to read an id.
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

/// Payload half of a [`CallResponse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CallOutcome {
    #[serde(rename = "result")]
    Result(Value),
    #[serde(rename = "error")]
    Error(RpcError),
}

impl CallResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            outcome: CallOutcome::Result(result),
        }
    }

    pub fn failure(id: Option<RequestId>, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            outcome: CallOutcome::Error(error),
        }
    }

    /// Decodes a response body.
    ///
    /// `result: null` is a legal success value, so this works on the raw
    /// object rather than relying on `Option` deserialization.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let mut object = match value {
            Value::Object(map) => map,
            _ => return Err("response body is not a JSON object".to_string()),
        };

        let id = match object.remove("id") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<RequestId>(raw)
                    .map_err(|e| format!("invalid id: {}", e))?,
            ),
        };

        let error = object.remove("error").filter(|v| !v.is_null());
        let outcome = match (error, object.remove("result")) {
            (Some(error), None) => CallOutcome::Error(
                serde_json::from_value(error).map_err(|e| format!("invalid error member: {}", e))?,
            ),
            (None, Some(result)) => CallOutcome::Result(result),
            (Some(_), Some(_)) => {
                return Err("response carries both result and error".to_string())
            }
            (None, None) => return Err("response carries neither result nor error".to_string()),
        };

        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            outcome,
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, CallOutcome::Error(_))
    }
}
