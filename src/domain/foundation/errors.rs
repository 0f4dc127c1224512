//! Error types for the domain layer.

use thiserror::Error;

/// Errors raised while validating tool arguments and other value objects.
///
/// Every variant names the offending field so the message can be returned
/// to a caller unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown argument '{field}'")]
    UnknownArgument { field: String },

    #[error("Missing required argument '{field}'")]
    MissingArgument { field: String },

    #[error("Argument '{field}' must be of type {expected}, got {actual}")]
    InvalidType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid value: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    /// Creates an unknown argument error.
    pub fn unknown_argument(field: impl Into<String>) -> Self {
        ValidationError::UnknownArgument { field: field.into() }
    }

    /// Creates a missing argument error.
    pub fn missing_argument(field: impl Into<String>) -> Self {
        ValidationError::MissingArgument { field: field.into() }
    }

    /// Creates a type mismatch error.
    pub fn invalid_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidType {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an empty field error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::UnknownArgument { field }
            | ValidationError::MissingArgument { field }
            | ValidationError::InvalidType { field, .. }
            | ValidationError::EmptyField { field }
            | ValidationError::InvalidValue { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_argument_displays_field() {
        let err = ValidationError::unknown_argument("colour");
        assert_eq!(format!("{}", err), "Unknown argument 'colour'");
    }

    #[test]
    fn missing_argument_displays_field() {
        let err = ValidationError::missing_argument("title");
        assert_eq!(format!("{}", err), "Missing required argument 'title'");
    }

    #[test]
    fn invalid_type_displays_expected_and_actual() {
        let err = ValidationError::invalid_type("price", "number", "string");
        assert_eq!(
            format!("{}", err),
            "Argument 'price' must be of type number, got string"
        );
    }

    #[test]
    fn invalid_value_displays_reason() {
        let err = ValidationError::invalid_value("name", "contains a path separator");
        assert_eq!(
            format!("{}", err),
            "Field 'name' has invalid value: contains a path separator"
        );
    }

    #[test]
    fn field_accessor_returns_field_for_every_variant() {
        assert_eq!(ValidationError::unknown_argument("a").field(), "a");
        assert_eq!(ValidationError::missing_argument("b").field(), "b");
        assert_eq!(ValidationError::invalid_type("c", "x", "y").field(), "c");
        assert_eq!(ValidationError::empty_field("d").field(), "d");
        assert_eq!(ValidationError::invalid_value("e", "r").field(), "e");
    }
}
