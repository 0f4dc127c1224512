//! Artifact adapters - filesystem implementation of the artifact store.

mod local_artifact_store;

pub use local_artifact_store::{read_artifact_file, LocalArtifactStore};
