//! Domain layer containing the value types of the orchestration layer.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, validation errors)
//! - `tools` - Tool descriptors, argument validation, call envelopes, outputs
//! - `artifacts` - Artifact documents, references and file naming
//! - `prompts` - Prompt documents and name rules
//! - `fallback` - Capabilities, failure classes and provider attempts

pub mod artifacts;
pub mod fallback;
pub mod foundation;
pub mod prompts;
pub mod tools;
