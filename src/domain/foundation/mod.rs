//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects and error types that form the vocabulary
//! of the tool orchestration layer.

mod errors;
mod timestamp;

pub use errors::ValidationError;
pub use timestamp::Timestamp;
