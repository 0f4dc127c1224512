//! Local prompt backend - `<name>.json` files in a per-process directory.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::prompts::{validate_prompt_name, PromptDocument};
use crate::ports::{PromptBackend, PromptStoreError};

const PROMPT_EXTENSION: &str = ".json";

/// Prompt documents stored as whole JSON files.
///
/// Writes go through a temp file and a rename, so a concurrent reader sees
/// either the previous or the new document.
#[derive(Debug, Clone)]
pub struct LocalPromptBackend {
    dir: PathBuf,
}

impl LocalPromptBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Path of the file that holds `name`.
    pub fn prompt_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", name, PROMPT_EXTENSION))
    }
}

#[async_trait]
impl PromptBackend for LocalPromptBackend {
    fn label(&self) -> &'static str {
        "local"
    }

    async fn save(&self, document: &PromptDocument) -> Result<(), PromptStoreError> {
        validate_prompt_name(&document.name)?;
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            PromptStoreError::io(format!(
                "Failed to create prompt directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| PromptStoreError::malformed(e.to_string()))?;
        let final_path = self.prompt_path(&document.name);
        let temp_path = self.dir.join(format!(
            ".{}.{}.tmp",
            document.name,
            uuid::Uuid::new_v4().simple()
        ));

        fs::write(&temp_path, &bytes).await?;
        fs::rename(&temp_path, &final_path).await?;
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Value>, PromptStoreError> {
        validate_prompt_name(name)?;
        let path = self.prompt_path(name);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| PromptStoreError::malformed(format!("{}: {}", path.display(), e)))
    }

    async fn list(&self) -> Result<Vec<String>, PromptStoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let filename = entry.file_name().to_string_lossy().to_string();
            if filename.starts_with('.') {
                continue;
            }
            if let Some(name) = filename.strip_suffix(PROMPT_EXTENSION) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn health(&self) -> Result<(), PromptStoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}
