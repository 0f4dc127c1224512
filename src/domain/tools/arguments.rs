//! Validated tool arguments.
//!
//! A `ToolArguments` value can only be built by checking a raw JSON object
//! against a [`ToolDescriptor`]. Handlers receive it already validated and
//! deserialize it into their own typed record with [`ToolArguments::parse`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::ToolDescriptor;
use crate::domain::foundation::ValidationError;

/// Argument mapping that satisfies a tool's declared parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Validates raw arguments against the descriptor.
    ///
    /// Rejects keys the descriptor does not declare, required parameters that
    /// are absent (or null), and values of the wrong JSON type. Omitted
    /// optional parameters with a declared default are filled in.
    pub fn validate(
        descriptor: &ToolDescriptor,
        raw: Option<Value>,
    ) -> Result<Self, ValidationError> {
        let mut provided = match raw {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ValidationError::invalid_type(
                    "arguments",
                    "object",
                    super::ParamType::describe(&other),
                ))
            }
        };

        if let Some(unknown) = provided
            .keys()
            .find(|key| descriptor.find_param(key).is_none())
        {
            return Err(ValidationError::unknown_argument(unknown.as_str()));
        }

        let mut validated = Map::new();
        for spec in descriptor.params() {
            match provided.remove(&spec.name) {
                Some(value) if !value.is_null() => {
                    if !spec.param_type.matches(&value) {
                        return Err(ValidationError::invalid_type(
                            spec.name.as_str(),
                            spec.param_type.as_str(),
                            super::ParamType::describe(&value),
                        ));
                    }
                    validated.insert(spec.name.clone(), value);
                }
                _ if spec.required => {
                    return Err(ValidationError::missing_argument(spec.name.as_str()));
                }
                _ => {
                    if let Some(default) = &spec.default {
                        validated.insert(spec.name.clone(), default.clone());
                    }
                }
            }
        }

        Ok(Self(validated))
    }

    /// Deserializes the validated arguments into a typed record.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ValidationError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ValidationError::invalid_value("arguments", e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
