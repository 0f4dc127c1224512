//! Tool descriptor - schema and metadata for a hosted tool.
//!
//! Descriptors are what a tool server enumerates at `/tools` and what it
//! validates incoming arguments against before a handler ever runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON type accepted for a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// Any JSON value (used for opaque payloads such as extraction data).
    Any,
}

impl ParamType {
    /// Returns true if the value is acceptable for this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
            ParamType::Any => true,
        }
    }

    /// Name used in validation messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
            ParamType::Any => "any",
        }
    }

    /// Describes the JSON type of an actual value.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_f64() => "number",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// A single declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: String,
}

impl ParamSpec {
    /// Declares a required parameter.
    pub fn required(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    /// Declares an optional parameter without a default.
    pub fn optional(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            default: None,
            description: description.into(),
        }
    }

    /// Sets the value filled in when the caller omits the parameter.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Definition of a tool hosted by a tool server.
///
/// # Examples
///
/// ```
/// use piata_mcp::domain::tools::{ParamSpec, ParamType, ToolDescriptor};
///
/// let descriptor = ToolDescriptor::new("generate_seo_slug", "Build a URL slug")
///     .param(ParamSpec::required("text", ParamType::String, "Text to slugify"))
///     .param(
///         ParamSpec::optional("max_length", ParamType::Integer, "Maximum slug length")
///             .with_default(serde_json::json!(80)),
///     )
///     .returns(serde_json::json!({"type": "object"}))
///     .pure();
///
/// assert_eq!(descriptor.params().len(), 2);
/// assert!(descriptor.is_pure());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Stable name, unique within a server.
    name: String,

    /// Human-readable description.
    description: String,

    /// Ordered list of declared parameters.
    #[serde(default)]
    parameters: Vec<ParamSpec>,

    /// Shape of the success value.
    #[serde(default)]
    result_schema: Value,

    /// Whether results depend only on arguments (safe for orchestrators to cache).
    #[serde(default)]
    pure: bool,
}

impl ToolDescriptor {
    /// Creates a descriptor with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            result_schema: serde_json::json!({"type": "object"}),
            pure: false,
        }
    }

    /// Appends a declared parameter.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Sets the result schema.
    pub fn returns(mut self, schema: Value) -> Self {
        self.result_schema = schema;
        self
    }

    /// Marks the tool as pure.
    pub fn pure(mut self) -> Self {
        self.pure = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.parameters
    }

    /// Looks up a declared parameter by name.
    pub fn find_param(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn result_schema(&self) -> &Value {
        &self.result_schema
    }

    pub fn is_pure(&self) -> bool {
        self.pure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ToolDescriptor {
        ToolDescriptor::new("optimize_listing_title", "Suggest better listing titles")
            .param(ParamSpec::required("title", ParamType::String, "Current title"))
            .param(ParamSpec::optional("location", ParamType::String, "City"))
            .pure()
    }

    #[test]
    fn new_creates_descriptor_without_params() {
        let d = ToolDescriptor::new("health_probe", "Probe");
        assert_eq!(d.name(), "health_probe");
        assert!(d.params().is_empty());
        assert!(!d.is_pure());
    }

    #[test]
    fn find_param_returns_declared_param() {
        let d = sample();
        assert!(d.find_param("title").unwrap().required);
        assert!(!d.find_param("location").unwrap().required);
        assert!(d.find_param("price").is_none());
    }

    #[test]
    fn param_type_matches_json_values() {
        assert!(ParamType::Integer.matches(&json!(3)));
        assert!(!ParamType::Integer.matches(&json!(3.5)));
        assert!(ParamType::Number.matches(&json!(3.5)));
        assert!(ParamType::Any.matches(&json!(null)));
        assert!(!ParamType::String.matches(&json!(1)));
    }

    #[test]
    fn describe_distinguishes_integers_from_floats() {
        assert_eq!(ParamType::describe(&json!(1)), "integer");
        assert_eq!(ParamType::describe(&json!(1.5)), "number");
        assert_eq!(ParamType::describe(&json!([])), "array");
    }

    #[test]
    fn serializes_param_type_under_type_key() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["parameters"][0]["type"], "string");
        assert_eq!(json["pure"], true);
    }

    #[test]
    fn deserializes_minimal_listing_entry() {
        let d: ToolDescriptor =
            serde_json::from_value(json!({"name": "x", "description": "y"})).unwrap();
        assert_eq!(d.name(), "x");
        assert!(d.params().is_empty());
        assert!(!d.is_pure());
    }
}
