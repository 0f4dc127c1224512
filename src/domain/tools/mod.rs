//! Tools - descriptors, validated arguments, call envelopes and outputs.

mod arguments;
mod descriptor;
mod envelope;
mod output;

pub use arguments::ToolArguments;
pub use descriptor::{ParamSpec, ParamType, ToolDescriptor};
pub use envelope::{
    codes, CallOutcome, CallParams, CallRequest, CallResponse, RequestId, RpcError,
    JSONRPC_VERSION, TOOLS_CALL_METHOD,
};
pub use output::{ToolOutput, ARTIFACT_REFERENCE_TYPE};
