//! Prompt adapters - remote (HTTP) and local (filesystem) prompt backends.

mod http_prompt_backend;
mod local_prompt_backend;

pub use http_prompt_backend::{HttpPromptBackend, HttpPromptConfig};
pub use local_prompt_backend::LocalPromptBackend;
