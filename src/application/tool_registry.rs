//! Tool Registry - the tools a server hosts, populated once at startup.
//!
//! Registration order is preserved so `/tools` enumerates tools in the order
//! the server declared them.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::Tool;
use crate::domain::tools::ToolDescriptor;

/// A registered tool together with its descriptor.
#[derive(Clone)]
pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub tool: Arc<dyn Tool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool '{name}' is already registered")]
    DuplicateTool { name: String },
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its descriptor's name.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), RegistryError> {
        let descriptor = tool.descriptor();
        let name = descriptor.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateTool { name });
        }

        self.by_name.insert(name, self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            tool: Arc::new(tool),
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.descriptor.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
