//! Prompt Store - remote-preferred, local-fallback prompt documents.
//!
//! Writes that cannot reach the remote land in the local directory; the
//! local copy is never pushed to the remote later. Reads prefer the remote
//! and fall back to the local copy on any remote failure or miss.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::prompts::{validate_prompt_name, PromptDocument};
use crate::ports::{PromptBackend, PromptStoreError};

/// Which tier accepted a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLocation {
    Remote,
    Local,
}

/// Outcome of [`PromptStore::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub remote_configured: bool,
    pub remote_reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub struct PromptStore {
    remote: Option<Arc<dyn PromptBackend>>,
    local: Arc<dyn PromptBackend>,
}

impl PromptStore {
    pub fn new(local: Arc<dyn PromptBackend>) -> Self {
        Self {
            remote: None,
            local,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn PromptBackend>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// The remote backend, when `prefer_remote` is set and one is configured.
    fn preferred_remote(&self, prefer_remote: bool) -> Option<&Arc<dyn PromptBackend>> {
        self.remote.as_ref().filter(|_| prefer_remote)
    }

    /// Saves `content` under `name` and reports where it was stored.
    pub async fn save(
        &self,
        name: &str,
        content: Value,
        prefer_remote: bool,
    ) -> Result<PromptLocation, PromptStoreError> {
        let document = PromptDocument::new(name, content)?;
        self.save_document(&document, prefer_remote).await
    }

    pub async fn save_document(
        &self,
        document: &PromptDocument,
        prefer_remote: bool,
    ) -> Result<PromptLocation, PromptStoreError> {
        if let Some(remote) = self.preferred_remote(prefer_remote) {
            match remote.save(document).await {
                Ok(()) => return Ok(PromptLocation::Remote),
                Err(e) => tracing::warn!(
                    prompt = %document.name,
                    error = %e,
                    "Remote prompt save failed, writing local copy"
                ),
            }
        }

        self.local.save(document).await?;
        Ok(PromptLocation::Local)
    }

    /// Loads the content saved under `name`, or `None` if neither tier has it.
    pub async fn load(
        &self,
        name: &str,
        prefer_remote: bool,
    ) -> Result<Option<Value>, PromptStoreError> {
        validate_prompt_name(name)?;

        if let Some(remote) = self.preferred_remote(prefer_remote) {
            match remote.load(name).await {
                Ok(Some(stored)) => return Ok(Some(PromptDocument::content_of(stored))),
                Ok(None) => tracing::debug!(prompt = %name, "Prompt not found remotely"),
                Err(e) => tracing::warn!(
                    prompt = %name,
                    error = %e,
                    "Remote prompt load failed, trying local copy"
                ),
            }
        }

        Ok(self
            .local
            .load(name)
            .await?
            .map(PromptDocument::content_of))
    }

    pub async fn list(&self, prefer_remote: bool) -> Result<Vec<String>, PromptStoreError> {
        if let Some(remote) = self.preferred_remote(prefer_remote) {
            match remote.list().await {
                Ok(names) => return Ok(names),
                Err(e) => tracing::warn!(
                    error = %e,
                    "Remote prompt listing failed, listing local copies"
                ),
            }
        }
        self.local.list().await
    }

    /// Probes the remote tier.
    pub async fn test_connection(&self) -> ConnectionStatus {
        let Some(remote) = &self.remote else {
            return ConnectionStatus {
                remote_configured: false,
                remote_reachable: false,
                detail: Some("no remote prompt store configured".to_string()),
            };
        };

        match remote.health().await {
            Ok(()) => ConnectionStatus {
                remote_configured: true,
                remote_reachable: true,
                detail: None,
            },
            Err(e) => ConnectionStatus {
                remote_configured: true,
                remote_reachable: false,
                detail: Some(e.to_string()),
            },
        }
    }

    /// Tool names advertised by the remote, grouped by server id.
    ///
    /// Empty when no remote is configured.
    pub async fn list_available_tools(
        &self,
    ) -> Result<BTreeMap<String, Vec<String>>, PromptStoreError> {
        match &self.remote {
            Some(remote) => remote.available_tools().await,
            None => Ok(BTreeMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::prompts::LocalPromptBackend;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // ───────────────────────────────────────────────────────────────
    // Test doubles
    // ───────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct InMemoryRemote {
        prompts: Mutex<HashMap<String, Value>>,
    }

    #[async_trait]
    impl PromptBackend for InMemoryRemote {
        fn label(&self) -> &'static str {
            "remote"
        }

        async fn save(&self, document: &PromptDocument) -> Result<(), PromptStoreError> {
            self.prompts.lock().unwrap().insert(
                document.name.clone(),
                serde_json::to_value(document).unwrap(),
            );
            Ok(())
        }

        async fn load(&self, name: &str) -> Result<Option<Value>, PromptStoreError> {
            Ok(self.prompts.lock().unwrap().get(name).cloned())
        }

        async fn list(&self) -> Result<Vec<String>, PromptStoreError> {
            let mut names: Vec<_> = self.prompts.lock().unwrap().keys().cloned().collect();
            names.sort();
            Ok(names)
        }

        async fn health(&self) -> Result<(), PromptStoreError> {
            Ok(())
        }

        async fn available_tools(
            &self,
        ) -> Result<BTreeMap<String, Vec<String>>, PromptStoreError> {
            Ok(BTreeMap::from([(
                "ads".to_string(),
                vec!["optimize_listing_title".to_string()],
            )]))
        }
    }

    struct DownRemote;

    #[async_trait]
    impl PromptBackend for DownRemote {
        fn label(&self) -> &'static str {
            "remote"
        }

        async fn save(&self, _: &PromptDocument) -> Result<(), PromptStoreError> {
            Err(PromptStoreError::unreachable("connection refused"))
        }

        async fn load(&self, _: &str) -> Result<Option<Value>, PromptStoreError> {
            Err(PromptStoreError::unreachable("connection refused"))
        }

        async fn list(&self) -> Result<Vec<String>, PromptStoreError> {
            Err(PromptStoreError::status(503))
        }

        async fn health(&self) -> Result<(), PromptStoreError> {
            Err(PromptStoreError::unreachable("connection refused"))
        }
    }

    fn local(temp: &TempDir) -> Arc<LocalPromptBackend> {
        Arc::new(LocalPromptBackend::new(temp.path()))
    }

    // ───────────────────────────────────────────────────────────────
    // Tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn reachable_remote_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = PromptStore::new(local(&temp)).with_remote(Arc::new(InMemoryRemote::default()));

        let location = store.save("p1", json!({"v": 1}), true).await.unwrap();
        assert_eq!(location, PromptLocation::Remote);
        assert_eq!(store.load("p1", true).await.unwrap(), Some(json!({"v": 1})));
        assert!(!temp.path().join("p1.json").exists());
    }

    #[tokio::test]
    async fn unreachable_remote_degrades_to_local_file() {
        let temp = TempDir::new().unwrap();
        let store = PromptStore::new(local(&temp)).with_remote(Arc::new(DownRemote));

        let location = store.save("p1", json!({"v": 1}), true).await.unwrap();

        assert_eq!(location, PromptLocation::Local);
        assert!(temp.path().join("p1.json").exists());
        assert_eq!(store.load("p1", true).await.unwrap(), Some(json!({"v": 1})));
        assert_eq!(store.list(true).await.unwrap(), vec!["p1"]);
    }

    #[tokio::test]
    async fn remote_flag_false_uses_local_only() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(InMemoryRemote::default());
        let store = PromptStore::new(local(&temp)).with_remote(remote.clone());

        let location = store.save("p2", json!("body"), false).await.unwrap();

        assert_eq!(location, PromptLocation::Local);
        assert!(remote.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_miss_falls_back_to_local_copy() {
        let temp = TempDir::new().unwrap();
        let store = PromptStore::new(local(&temp)).with_remote(Arc::new(InMemoryRemote::default()));
        store.save("only-local", json!(7), false).await.unwrap();

        assert_eq!(store.load("only-local", true).await.unwrap(), Some(json!(7)));
    }

    #[tokio::test]
    async fn missing_everywhere_is_none() {
        let temp = TempDir::new().unwrap();
        let store = PromptStore::new(local(&temp)).with_remote(Arc::new(DownRemote));
        assert_eq!(store.load("ghost", true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_names_are_rejected() {
        let temp = TempDir::new().unwrap();
        let store = PromptStore::new(local(&temp));
        assert!(store.save("../x", json!(1), true).await.is_err());
        assert!(store.load("a/b", true).await.is_err());
    }

    #[tokio::test]
    async fn test_connection_reports_each_state() {
        let temp = TempDir::new().unwrap();

        let none = PromptStore::new(local(&temp)).test_connection().await;
        assert!(!none.remote_configured);

        let down = PromptStore::new(local(&temp))
            .with_remote(Arc::new(DownRemote))
            .test_connection()
            .await;
        assert!(down.remote_configured && !down.remote_reachable);

        let up = PromptStore::new(local(&temp))
            .with_remote(Arc::new(InMemoryRemote::default()))
            .test_connection()
            .await;
        assert!(up.remote_reachable);
    }

    #[tokio::test]
    async fn available_tools_come_from_remote() {
        let temp = TempDir::new().unwrap();
        let store = PromptStore::new(local(&temp));
        assert!(store.list_available_tools().await.unwrap().is_empty());

        let store = store.with_remote(Arc::new(InMemoryRemote::default()));
        let tools = store.list_available_tools().await.unwrap();
        assert_eq!(tools["ads"], vec!["optimize_listing_title"]);
    }
}
