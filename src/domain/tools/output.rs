//! Tool output - the sum type every tool call resolves to.

use serde_json::{Map, Value};

use crate::domain::artifacts::ArtifactReference;

/// Marker value of the `type` key that identifies a serialized reference.
pub const ARTIFACT_REFERENCE_TYPE: &str = "artifact_reference";

/// Result of a tool: the data itself, or a pointer to an artifact file.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Inline(Value),
    Artifact(ArtifactReference),
}

impl ToolOutput {
    /// Converts to the JSON placed in a response's `result` member.
    pub fn into_result_value(self) -> Result<Value, serde_json::Error> {
        match self {
            ToolOutput::Inline(value) => Ok(value),
            ToolOutput::Artifact(reference) => {
                let mut object = match serde_json::to_value(reference)? {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                object.insert(
                    "type".to_string(),
                    Value::String(ARTIFACT_REFERENCE_TYPE.to_string()),
                );
                Ok(Value::Object(object))
            }
        }
    }

    /// Interprets a `result` member received from a tool server.
    ///
    /// Objects tagged `"type": "artifact_reference"` that deserialize as a
    /// reference become [`ToolOutput::Artifact`]; anything else is inline.
    pub fn from_result_value(value: Value) -> Self {
        let tagged = value
            .get("type")
            .and_then(Value::as_str)
            .map(|t| t == ARTIFACT_REFERENCE_TYPE)
            .unwrap_or(false);

        if tagged {
            if let Ok(reference) = serde_json::from_value::<ArtifactReference>(value.clone()) {
                return ToolOutput::Artifact(reference);
            }
        }
        ToolOutput::Inline(value)
    }

    pub fn is_artifact(&self) -> bool {
        matches!(self, ToolOutput::Artifact(_))
    }

    pub fn as_inline(&self) -> Option<&Value> {
        match self {
            ToolOutput::Inline(value) => Some(value),
            ToolOutput::Artifact(_) => None,
        }
    }

    pub fn as_artifact(&self) -> Option<&ArtifactReference> {
        match self {
            ToolOutput::Artifact(reference) => Some(reference),
            ToolOutput::Inline(_) => None,
        }
    }
}
