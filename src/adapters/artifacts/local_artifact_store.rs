//! Local Artifact Store Adapter - Implementation of ArtifactStore.
//!
//! Materializes artifacts as JSON files in a single directory shared by all
//! tools of a server. Names embed a random suffix, so concurrent writers never
//! need a lock.

use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::artifacts::{
    artifact_filename, estimate_tokens, is_artifact_filename, ArtifactDocument, ArtifactListing,
    ArtifactMetadata, ArtifactReference,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{ArtifactError, ArtifactStore, StoreRequest};

/// Attempts at finding an unused filename before giving up.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Artifact directory on the local filesystem.
///
/// # Atomic Writes
///
/// 1. Write the document to `.{filename}.tmp`
/// 2. Sync to disk
/// 3. Rename to `{filename}`
///
/// Readers therefore see either the whole file or no file.
///
/// # Usage
///
/// ```rust,ignore
/// let store = LocalArtifactStore::new("./element_clones");
/// let reference = store.store(StoreRequest::new("page", data)).await?;
/// let document = store.read(&reference.filename).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    dir: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn ensure_dir(&self) -> Result<PathBuf, ArtifactError> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            ArtifactError::io(format!(
                "Failed to create artifact directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;
        fs::canonicalize(&self.dir).await.map_err(ArtifactError::from)
    }

    fn random_suffix() -> String {
        uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    async fn unused_filename(
        dir: &Path,
        prefix: &str,
        at: &Timestamp,
    ) -> Result<String, ArtifactError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = artifact_filename(prefix, at, &Self::random_suffix());
            if !fs::try_exists(dir.join(&name)).await? {
                return Ok(name);
            }
        }
        Err(ArtifactError::io(format!(
            "Could not find an unused artifact name for prefix '{}'",
            prefix
        )))
    }

    async fn write_atomically(
        dir: &Path,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, ArtifactError> {
        let temp_path = dir.join(format!(".{}.tmp", filename));
        let final_path = dir.join(filename);

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            ArtifactError::io(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.write_all(bytes).await.map_err(|e| {
            ArtifactError::io(format!(
                "Failed to write to temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            ArtifactError::io(format!(
                "Failed to sync temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        drop(file);

        fs::rename(&temp_path, &final_path).await.map_err(|e| {
            ArtifactError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })?;

        Ok(final_path)
    }

    /// Creation time from the embedded metadata, falling back to mtime.
    fn created_at(metadata: Option<&Value>, modified: Option<Timestamp>) -> Timestamp {
        metadata
            .and_then(|m| m.get("created_at"))
            .and_then(Value::as_str)
            .and_then(Timestamp::parse_rfc3339)
            .or(modified)
            .unwrap_or_default()
    }

    async fn listing_for(path: PathBuf, filename: String) -> Option<ArtifactListing> {
        // The file may vanish between read_dir and here (concurrent purge).
        let file_meta = fs::metadata(&path).await.ok()?;
        let modified = file_meta.modified().ok().map(Timestamp::from);

        let metadata = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|doc| doc.get("metadata").cloned()),
            Err(_) => return None,
        };

        Some(ArtifactListing {
            created_at: Self::created_at(metadata.as_ref(), modified),
            file_path: path,
            filename,
            size_bytes: file_meta.len(),
            metadata,
        })
    }
}

/// Reads and parses an artifact file at an arbitrary path.
pub async fn read_artifact_file(path: &Path) -> Result<ArtifactDocument, ArtifactError> {
    let bytes = fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ArtifactError::not_found(path.display().to_string()),
        std::io::ErrorKind::PermissionDenied => {
            ArtifactError::permission_denied(path.display().to_string())
        }
        _ => ArtifactError::io(format!("Failed to read {}: {}", path.display(), e)),
    })?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ArtifactError::malformed(path.display().to_string(), e.to_string()))
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn store(&self, request: StoreRequest) -> Result<ArtifactReference, ArtifactError> {
        let dir = self.ensure_dir().await?;
        let created_at = Timestamp::now();

        let mut metadata = ArtifactMetadata::new(created_at, estimate_tokens(&request.data))
            .with_caller_metadata(request.metadata);
        if request.auto_saved {
            metadata = metadata.auto_saved();
        }

        let document = ArtifactDocument {
            metadata,
            data: request.data,
        };
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| ArtifactError::io(format!("Failed to serialize artifact: {}", e)))?;

        let filename = Self::unused_filename(&dir, &request.prefix, &created_at).await?;
        let path = Self::write_atomically(&dir, &filename, &bytes).await?;

        tracing::debug!(
            path = %path.display(),
            estimated_tokens = document.metadata.estimated_tokens,
            "Artifact written"
        );

        Ok(ArtifactReference::for_written_file(
            path,
            filename,
            bytes.len() as u64,
            &document.metadata,
            request.reason,
        ))
    }

    async fn list(&self) -> Result<Vec<ArtifactListing>, ArtifactError> {
        if !fs::try_exists(&self.dir).await? {
            return Ok(Vec::new());
        }
        let dir = fs::canonicalize(&self.dir).await?;

        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            ArtifactError::io(format!(
                "Failed to read artifact directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut listings = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ArtifactError::io(format!("Failed to read directory entry: {}", e)))?
        {
            let filename = entry.file_name().to_string_lossy().to_string();
            if !is_artifact_filename(&filename) {
                continue;
            }
            if let Some(listing) = Self::listing_for(entry.path(), filename).await {
                listings.push(listing);
            }
        }

        listings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        Ok(listings)
    }

    async fn read(&self, filename: &str) -> Result<ArtifactDocument, ArtifactError> {
        if filename.contains('/') || filename.contains('\\') || !is_artifact_filename(filename) {
            return Err(ArtifactError::invalid_name(filename));
        }
        read_artifact_file(&self.dir.join(filename)).await
    }

    async fn read_path(&self, path: &Path) -> Result<ArtifactDocument, ArtifactError> {
        read_artifact_file(path).await
    }

    async fn purge(&self, max_age: Duration) -> Result<usize, ArtifactError> {
        // An age reaching past the earliest representable date matches nothing.
        let Some(cutoff) = Timestamp::now()
            .as_datetime()
            .checked_sub_signed(max_age)
            .map(Timestamp::from_datetime)
        else {
            tracing::debug!(dir = %self.dir.display(), "Purge age predates every artifact");
            return Ok(0);
        };
        let mut deleted = 0;

        for listing in self.list().await? {
            if !listing.created_at.is_before(&cutoff) {
                continue;
            }
            match fs::remove_file(&listing.file_path).await {
                Ok(()) => deleted += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ArtifactError::io(format!(
                        "Failed to delete {}: {}",
                        listing.file_path.display(),
                        e
                    )))
                }
            }
        }

        tracing::info!(
            dir = %self.dir.display(),
            deleted,
            max_age_hours = max_age.num_hours(),
            "Purged artifacts"
        );
        Ok(deleted)
    }

    fn directory(&self) -> &Path {
        &self.dir
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    // ───────────────────────────────────────────────────────────────
    // Test helpers
    // ───────────────────────────────────────────────────────────────

    fn create_store() -> (LocalArtifactStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalArtifactStore::new(temp_dir.path().join("element_clones"));
        (store, temp_dir)
    }

    async fn write_aged(store: &LocalArtifactStore, name: &str, hours_ago: i64) {
        fs::create_dir_all(store.directory()).await.unwrap();
        let created_at = Timestamp::now().minus_hours(hours_ago);
        let doc = json!({
            "metadata": {"created_at": created_at, "estimated_tokens": 1},
            "data": {"name": name}
        });
        fs::write(
            store.directory().join(format!("{}.json", name)),
            serde_json::to_vec(&doc).unwrap(),
        )
        .await
        .unwrap();
    }

    // ───────────────────────────────────────────────────────────────
    // Store tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn store_writes_document_with_metadata() {
        let (store, _temp) = create_store();
        let data = json!({"html": "<div>anunț</div>"});

        let reference = store
            .store(StoreRequest::new("page_clone", data.clone()))
            .await
            .unwrap();

        assert!(reference.file_path.is_absolute());
        assert!(reference.file_path.exists());
        assert!(reference.filename.starts_with("page_clone_"));
        assert!(reference.filename.ends_with(".json"));

        let doc = read_artifact_file(&reference.file_path).await.unwrap();
        assert_eq!(doc.data, data);
        assert_eq!(doc.metadata.estimated_tokens, reference.estimated_tokens);
        assert!(!doc.metadata.auto_saved_due_to_size);
    }

    #[tokio::test]
    async fn store_reports_materialized_size() {
        let (store, _temp) = create_store();
        let reference = store
            .store(StoreRequest::new("x", json!([1, 2, 3])))
            .await
            .unwrap();

        let on_disk = fs::metadata(&reference.file_path).await.unwrap().len();
        assert_eq!(reference.size_bytes, on_disk);
    }

    #[tokio::test]
    async fn store_never_reuses_a_name() {
        let (store, _temp) = create_store();
        let mut names = std::collections::HashSet::new();
        for _ in 0..20 {
            let r = store
                .store(StoreRequest::new("same", json!({})))
                .await
                .unwrap();
            assert!(names.insert(r.filename));
        }
        assert_eq!(store.list().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn store_leaves_no_temp_files() {
        let (store, _temp) = create_store();
        store.store(StoreRequest::new("t", json!(1))).await.unwrap();

        let mut entries = fs::read_dir(store.directory()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            assert!(!entry.file_name().to_string_lossy().ends_with(".tmp"));
        }
    }

    // ───────────────────────────────────────────────────────────────
    // List / read tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn list_of_missing_directory_is_empty() {
        let (store, _temp) = create_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_tolerates_garbage() {
        let (store, _temp) = create_store();
        write_aged(&store, "old", 10).await;
        write_aged(&store, "new", 1).await;
        fs::write(store.directory().join("broken.json"), b"{not json")
            .await
            .unwrap();

        let listings = store.list().await.unwrap();
        let names: Vec<_> = listings.iter().map(|l| l.filename.as_str()).collect();

        assert_eq!(names.len(), 3);
        assert_eq!(names[1], "new.json");
        assert_eq!(names[2], "old.json");
        assert!(listings[0].metadata.is_none());
    }

    #[tokio::test]
    async fn read_round_trips_data() {
        let (store, _temp) = create_store();
        let data = json!({"rows": (0..50).collect::<Vec<_>>()});
        let reference = store
            .store(StoreRequest::new("rows", data.clone()))
            .await
            .unwrap();

        let doc = store.read(&reference.filename).await.unwrap();
        assert_eq!(doc.data, data);
    }

    #[tokio::test]
    async fn read_rejects_paths() {
        let (store, _temp) = create_store();
        let err = store.read("../secret.json").await.unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidName { .. }));
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let (store, _temp) = create_store();
        let err = store.read("nope.json").await.unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { .. }));
    }

    // ───────────────────────────────────────────────────────────────
    // Purge tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn purge_removes_only_strictly_older_files() {
        let (store, _temp) = create_store();
        write_aged(&store, "a", 0).await;
        write_aged(&store, "b", 12).await;
        write_aged(&store, "c", 23).await;
        write_aged(&store, "d", 30).await;
        write_aged(&store, "e", 48).await;

        let deleted = store.purge(Duration::hours(24)).await.unwrap();

        assert_eq!(deleted, 2);
        let remaining: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.filename)
            .collect();
        assert_eq!(remaining, vec!["a.json", "b.json", "c.json"]);
    }

    #[tokio::test]
    async fn purge_of_empty_store_is_zero() {
        let (store, _temp) = create_store();
        assert_eq!(store.purge(Duration::hours(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn purge_with_unrepresentable_cutoff_keeps_everything() {
        let (store, _temp) = create_store();
        write_aged(&store, "old", 48).await;

        let deleted = store
            .purge(Duration::seconds(100_000_000_000 * 3600))
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
