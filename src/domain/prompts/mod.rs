//! Prompt documents - named, reusable JSON prompt bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{Timestamp, ValidationError};

const MAX_NAME_LEN: usize = 128;

/// A named prompt with its content body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDocument {
    pub name: String,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Timestamp,
}

impl PromptDocument {
    /// Creates a document after validating its name.
    pub fn new(name: impl Into<String>, content: Value) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_prompt_name(&name)?;
        Ok(Self {
            name,
            content,
            author: None,
            created_at: Timestamp::now(),
        })
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Extracts the content body from a stored prompt.
    ///
    /// Stores may hold either a full document (`{name, content, ...}`) or a
    /// bare body written by hand; the bare body is returned as is.
    pub fn content_of(stored: Value) -> Value {
        match stored {
            Value::Object(mut map)
                if map.get("name").map(Value::is_string).unwrap_or(false)
                    && map.contains_key("content") =>
            {
                map.remove("content").unwrap_or(Value::Null)
            }
            other => other,
        }
    }
}

/// Checks that a prompt name can safely become `<name>.json`.
///
/// Names must be non-empty, at most 128 characters, and free of path
/// separators, leading dots and control characters.
pub fn validate_prompt_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::invalid_value(
            "name",
            format!("longer than {} characters", MAX_NAME_LEN),
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ValidationError::invalid_value(
            "name",
            "contains a path separator",
        ));
    }
    if name.starts_with('.') {
        return Err(ValidationError::invalid_value("name", "starts with a dot"));
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::invalid_value(
            "name",
            "contains control characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_ordinary_names() {
        assert!(validate_prompt_name("listing-title_v2").is_ok());
        assert!(validate_prompt_name("descriere anunț").is_ok());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(validate_prompt_name("../secrets").is_err());
        assert!(validate_prompt_name("a/b").is_err());
        assert!(validate_prompt_name("a\\b").is_err());
        assert!(validate_prompt_name(".hidden").is_err());
    }

    #[test]
    fn rejects_empty_and_overlong_names() {
        assert_eq!(
            validate_prompt_name("  ").unwrap_err(),
            ValidationError::empty_field("name")
        );
        assert!(validate_prompt_name(&"x".repeat(129)).is_err());
    }

    #[test]
    fn document_keeps_content_and_author() {
        let doc = PromptDocument::new("p1", json!({"v": 1}))
            .unwrap()
            .with_author("ana");
        assert_eq!(doc.content, json!({"v": 1}));
        assert_eq!(doc.author.as_deref(), Some("ana"));
    }

    #[test]
    fn content_of_unwraps_full_documents_only() {
        let doc = serde_json::to_value(PromptDocument::new("p1", json!({"v": 1})).unwrap()).unwrap();
        assert_eq!(PromptDocument::content_of(doc), json!({"v": 1}));
        assert_eq!(
            PromptDocument::content_of(json!({"content": "raw"})),
            json!({"content": "raw"})
        );
    }
}
