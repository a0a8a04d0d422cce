//! Idempotent artifact CRUD
//!
//! The store's `NotFound` and `AlreadyExists` errors are turned into policy
//! outcomes here; everything else propagates as [`WardenError::Store`].

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use warden_core::{
    Artifact, ArtifactConfig, ArtifactStoreEffects, CreateArtifactRequest, CreateOutcome,
    EditArtifactRequest, Manifest, StoreError, WardenError, WardenResult,
};

/// Thin wrapper over the artifact store
#[derive(Clone)]
pub struct ArtifactRepository {
    store: Arc<dyn ArtifactStoreEffects>,
}

impl fmt::Debug for ArtifactRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactRepository").finish_non_exhaustive()
    }
}

impl ArtifactRepository {
    /// Wrap an artifact store handle
    pub fn new(store: Arc<dyn ArtifactStoreEffects>) -> Self {
        Self { store }
    }

    /// Read an artifact; a missing artifact is `ResourceNotFound`
    pub async fn read(&self, artifact_id: &str) -> WardenResult<Artifact> {
        self.store
            .read(artifact_id)
            .await
            .map_err(|e| not_found_or_store(e, artifact_id))
    }

    /// Whether an artifact exists. Transport failures propagate.
    pub async fn exists(&self, artifact_id: &str) -> WardenResult<bool> {
        match self.store.read(artifact_id).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Create an artifact unless one with the same alias already exists.
    ///
    /// The existence check and the create are not atomic; a concurrent writer
    /// winning the race is reported as [`CreateOutcome::AlreadyExists`]. A
    /// missing parent surfaces as `ResourceNotFound` naming the parent.
    pub async fn create(&self, request: CreateArtifactRequest) -> WardenResult<CreateOutcome> {
        let alias = request.alias.clone();
        if self.exists(&alias).await? {
            debug!(artifact_id = %alias, "Artifact already exists, skipping create");
            return Ok(CreateOutcome::AlreadyExists);
        }

        match self.store.create(request).await {
            Ok(artifact) => {
                info!(
                    artifact_id = %artifact.id,
                    parent_id = ?artifact.parent_id,
                    "Created artifact"
                );
                Ok(CreateOutcome::Created)
            }
            Err(StoreError::AlreadyExists { .. }) => {
                debug!(artifact_id = %alias, "Artifact created concurrently");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(StoreError::NotFound { id }) => Err(WardenError::not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an artifact; deleting an absent artifact is not an error
    pub async fn delete(&self, artifact_id: &str, delete_files: bool) -> WardenResult<()> {
        match self.store.delete(artifact_id, delete_files).await {
            Ok(()) => {
                info!(artifact_id = %artifact_id, "Deleted artifact");
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => {
                warn!(artifact_id = %artifact_id, "Artifact to delete was already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Direct children of `parent_id`; none when the parent is absent
    pub async fn children(&self, parent_id: &str) -> WardenResult<Vec<Artifact>> {
        match self.store.list(parent_id).await {
            Ok(children) => Ok(children),
            Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the manifest and/or config of an existing artifact.
    ///
    /// The config is written as given, so callers pass the fully merged
    /// permission map.
    pub async fn edit(
        &self,
        artifact_id: &str,
        manifest: Option<Manifest>,
        config: Option<ArtifactConfig>,
    ) -> WardenResult<()> {
        if !self.exists(artifact_id).await? {
            return Err(WardenError::not_found(artifact_id));
        }
        self.store
            .edit(EditArtifactRequest {
                artifact_id: artifact_id.to_string(),
                manifest,
                config,
                ..EditArtifactRequest::default()
            })
            .await
            .map_err(|e| not_found_or_store(e, artifact_id))?;
        debug!(artifact_id = %artifact_id, "Edited artifact");
        Ok(())
    }
}

fn not_found_or_store(err: StoreError, artifact_id: &str) -> WardenError {
    match err {
        StoreError::NotFound { .. } => WardenError::not_found(artifact_id),
        other => other.into(),
    }
}
