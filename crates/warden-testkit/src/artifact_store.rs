//! In-memory artifact store
//!
//! Mirrors the hosted store's observable behaviour: aliases are unique,
//! creating under a missing parent fails with `NotFound` naming the parent, and
//! deletion removes only the addressed artifact. Fault injection hooks let
//! tests reproduce races and transport failures deterministically.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use warden_core::{
    Artifact, ArtifactStoreEffects, CreateArtifactRequest, EditArtifactRequest, StoreError,
};

/// Number of calls received per store operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactCallCounts {
    /// `read` calls
    pub reads: usize,
    /// `create` calls
    pub creates: usize,
    /// `edit` calls
    pub edits: usize,
    /// `delete` calls
    pub deletes: usize,
    /// `list` calls
    pub lists: usize,
}

#[derive(Debug, Default)]
struct State {
    artifacts: BTreeMap<String, Artifact>,
    failing_reads: HashSet<String>,
    failing_deletes: HashSet<String>,
    racing_creates: HashSet<String>,
    stale_parents: HashSet<String>,
    deletions: Vec<(String, bool)>,
    calls: ArtifactCallCounts,
}

/// Shared in-memory artifact store; clones observe the same state
#[derive(Debug, Clone, Default)]
pub struct MockArtifactStore {
    state: Arc<Mutex<State>>,
}

impl MockArtifactStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an artifact directly, bypassing parent checks
    pub fn insert(&self, artifact: Artifact) {
        self.state().artifacts.insert(artifact.id.clone(), artifact);
    }

    /// Remove an artifact out of band, as an external actor would
    pub fn remove(&self, artifact_id: &str) -> Option<Artifact> {
        self.state().artifacts.remove(artifact_id)
    }

    /// Snapshot of a stored artifact
    pub fn get(&self, artifact_id: &str) -> Option<Artifact> {
        self.state().artifacts.get(artifact_id).cloned()
    }

    /// Whether an artifact is stored
    pub fn contains(&self, artifact_id: &str) -> bool {
        self.state().artifacts.contains_key(artifact_id)
    }

    /// Ids of every stored artifact, sorted
    pub fn ids(&self) -> Vec<String> {
        self.state().artifacts.keys().cloned().collect()
    }

    /// Calls received so far
    pub fn calls(&self) -> ArtifactCallCounts {
        self.state().calls
    }

    /// `(artifact_id, delete_files)` for every successful delete, in order
    pub fn deletions(&self) -> Vec<(String, bool)> {
        self.state().deletions.clone()
    }

    /// Make every read of `artifact_id` fail with a transport error
    pub fn fail_reads_for(&self, artifact_id: impl Into<String>) {
        self.state().failing_reads.insert(artifact_id.into());
    }

    /// Stop failing reads of `artifact_id`
    pub fn heal_reads_for(&self, artifact_id: &str) {
        self.state().failing_reads.remove(artifact_id);
    }

    /// Make every delete of `artifact_id` fail with a transport error
    pub fn fail_deletes_for(&self, artifact_id: impl Into<String>) {
        self.state().failing_deletes.insert(artifact_id.into());
    }

    /// Simulate a concurrent writer winning the next create of `artifact_id`:
    /// the artifact is stored from the request and the call reports
    /// `AlreadyExists`
    pub fn race_next_create(&self, artifact_id: impl Into<String>) {
        self.state().racing_creates.insert(artifact_id.into());
    }

    /// Report the parent `parent_id` as missing on the next create under it,
    /// even if it exists, as a lagging replica would
    pub fn stale_parent_once(&self, parent_id: impl Into<String>) {
        self.state().stale_parents.insert(parent_id.into());
    }
}

#[async_trait]
impl ArtifactStoreEffects for MockArtifactStore {
    async fn read(&self, artifact_id: &str) -> Result<Artifact, StoreError> {
        let mut state = self.state();
        state.calls.reads += 1;
        if state.failing_reads.contains(artifact_id) {
            return Err(StoreError::transport(format!(
                "injected read failure for {artifact_id}"
            )));
        }
        state
            .artifacts
            .get(artifact_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(artifact_id))
    }

    async fn create(&self, request: CreateArtifactRequest) -> Result<Artifact, StoreError> {
        let mut state = self.state();
        state.calls.creates += 1;

        if let Some(parent_id) = &request.parent_id {
            if state.stale_parents.remove(parent_id) || !state.artifacts.contains_key(parent_id) {
                return Err(StoreError::not_found(parent_id.clone()));
            }
        }
        if state.artifacts.contains_key(&request.alias) {
            return Err(StoreError::already_exists(request.alias));
        }

        let artifact = Artifact {
            id: request.alias.clone(),
            parent_id: request.parent_id,
            artifact_type: request.artifact_type,
            manifest: request.manifest,
            config: request.config,
        };
        state
            .artifacts
            .insert(artifact.id.clone(), artifact.clone());

        if state.racing_creates.remove(&artifact.id) {
            return Err(StoreError::already_exists(artifact.id));
        }
        Ok(artifact)
    }

    async fn edit(&self, request: EditArtifactRequest) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.edits += 1;
        let artifact = state
            .artifacts
            .get_mut(&request.artifact_id)
            .ok_or_else(|| StoreError::not_found(request.artifact_id.clone()))?;
        if let Some(manifest) = request.manifest {
            artifact.manifest = manifest;
        }
        if let Some(config) = request.config {
            artifact.config = config;
        }
        Ok(())
    }

    async fn delete(&self, artifact_id: &str, delete_files: bool) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.deletes += 1;
        if state.failing_deletes.contains(artifact_id) {
            return Err(StoreError::transport(format!(
                "injected delete failure for {artifact_id}"
            )));
        }
        if state.artifacts.remove(artifact_id).is_none() {
            return Err(StoreError::not_found(artifact_id));
        }
        state.deletions.push((artifact_id.to_string(), delete_files));
        Ok(())
    }

    async fn list(&self, parent_id: &str) -> Result<Vec<Artifact>, StoreError> {
        let mut state = self.state();
        state.calls.lists += 1;
        if !state.artifacts.contains_key(parent_id) {
            return Err(StoreError::not_found(parent_id));
        }
        Ok(state
            .artifacts
            .values()
            .filter(|artifact| artifact.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::stored_artifact;
    use assert_matches::assert_matches;
    use warden_core::{ArtifactConfig, Manifest};

    fn request(alias: &str, parent: Option<&str>) -> CreateArtifactRequest {
        CreateArtifactRequest {
            alias: alias.to_string(),
            artifact_type: "collection".to_string(),
            parent_id: parent.map(str::to_string),
            manifest: Manifest {
                name: alias.to_string(),
                ..Manifest::default()
            },
            config: ArtifactConfig::default(),
        }
    }

    #[tokio::test]
    async fn create_requires_parent_and_unique_alias() {
        let store = MockArtifactStore::new();
        assert_matches!(
            store.create(request("a:ws", Some("a"))).await,
            Err(StoreError::NotFound { id }) if id == "a"
        );

        store.insert(stored_artifact("a", None, &[("*", "r")]));
        store.create(request("a:ws", Some("a"))).await.unwrap();
        assert_matches!(
            store.create(request("a:ws", Some("a"))).await,
            Err(StoreError::AlreadyExists { .. })
        );
        assert_eq!(store.calls().creates, 3);
    }

    #[tokio::test]
    async fn delete_does_not_cascade() {
        let store = MockArtifactStore::new();
        store.insert(stored_artifact("a", None, &[]));
        store.insert(stored_artifact("a:ws", Some("a"), &[]));

        store.delete("a", true).await.unwrap();
        assert!(store.contains("a:ws"));
        assert_matches!(store.delete("a", true).await, Err(StoreError::NotFound { .. }));
        assert_eq!(store.deletions(), vec![("a".to_string(), true)]);
    }

    #[tokio::test]
    async fn list_returns_direct_children_only() {
        let store = MockArtifactStore::new();
        store.insert(stored_artifact("a", None, &[]));
        store.insert(stored_artifact("a:ws", Some("a"), &[]));
        store.insert(stored_artifact("a:ws:run", Some("a:ws"), &[]));
        store.insert(stored_artifact("b", None, &[]));

        let children = store.list("a").await.unwrap();
        assert_eq!(
            children.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["a:ws"]
        );
        assert!(store.list("a:ws:run").await.unwrap().is_empty());
        assert_matches!(store.list("ghost").await, Err(StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn injected_faults_fire() {
        let store = MockArtifactStore::new();
        store.insert(stored_artifact("a", None, &[]));

        store.fail_reads_for("a");
        assert_matches!(store.read("a").await, Err(StoreError::Transport { .. }));
        store.heal_reads_for("a");
        assert!(store.read("a").await.is_ok());

        store.race_next_create("b");
        assert_matches!(
            store.create(request("b", None)).await,
            Err(StoreError::AlreadyExists { .. })
        );
        assert!(store.contains("b"));

        store.stale_parent_once("a");
        assert_matches!(
            store.create(request("a:ws", Some("a"))).await,
            Err(StoreError::NotFound { .. })
        );
        assert!(store.create(request("a:ws", Some("a"))).await.is_ok());

        store.fail_deletes_for("a");
        assert_matches!(store.delete("a", true).await, Err(StoreError::Transport { .. }));
        assert!(store.contains("a"));
    }
}
