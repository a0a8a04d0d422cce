//! Resource creation, repair and deletion
//!
//! Creation verifies the parent artifact first. A missing parent is rebuilt
//! for kinds that allow it (applications rebuild their collection from the
//! vector store's settings, runs rebuild their workspace agent) and reported
//! as `ResourceNotFound` otherwise.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use warden_core::identity::validate_workspace;
use warden_core::{
    AdminWorkspaces, CollectionResource, CreateOutcome, CreationParams, DeleteManyOutcome,
    Resource, ResourceDescriptor, StoreError, VectorStoreEffects, WardenConfig, WardenError,
    WardenResult,
};
use warden_store::{ArtifactRepository, TenantProvisioner};

/// Drives resources between absent, parent-missing and ready
#[derive(Clone)]
pub struct HierarchyManager {
    repository: ArtifactRepository,
    tenants: TenantProvisioner,
    vectors: Arc<dyn VectorStoreEffects>,
    admins: AdminWorkspaces,
    artifact_type: String,
    delete_files: bool,
}

impl fmt::Debug for HierarchyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchyManager")
            .field("admins", &self.admins)
            .field("artifact_type", &self.artifact_type)
            .field("delete_files", &self.delete_files)
            .finish_non_exhaustive()
    }
}

impl HierarchyManager {
    /// Create a manager over the given stores
    pub fn new(
        repository: ArtifactRepository,
        vectors: Arc<dyn VectorStoreEffects>,
        config: &WardenConfig,
    ) -> Self {
        Self {
            repository,
            tenants: TenantProvisioner::new(vectors.clone()),
            vectors,
            admins: config.admin_workspaces(),
            artifact_type: config.artifact_type.clone(),
            delete_files: config.delete_files,
        }
    }

    /// Artifact repository in use
    pub fn repository(&self) -> &ArtifactRepository {
        &self.repository
    }

    /// Tenant provisioner in use
    pub fn tenants(&self) -> &TenantProvisioner {
        &self.tenants
    }

    /// Create `descriptor`'s artifact, repairing its parent if allowed
    pub async fn create(
        &self,
        descriptor: &ResourceDescriptor,
        params: &CreationParams,
    ) -> WardenResult<CreateOutcome> {
        self.create_with_parent(descriptor, params, None).await
    }

    /// Like [`HierarchyManager::create`], with explicit parameters for a
    /// repaired parent instead of the recovered ones
    pub async fn create_with_parent(
        &self,
        descriptor: &ResourceDescriptor,
        params: &CreationParams,
        parent_params: Option<&CreationParams>,
    ) -> WardenResult<CreateOutcome> {
        if let Some(owner) = &params.owner {
            validate_workspace(owner)?;
        }
        let repaired = self.ensure_parent(descriptor, parent_params).await?;
        let request = descriptor.creation_request(params, &self.admins, &self.artifact_type);

        let outcome = match self.repository.create(request.clone()).await {
            Err(e) if repaired && e.is_not_found() => {
                warn!(
                    artifact_id = %request.alias,
                    error = %e,
                    "Parent not yet visible after repair, retrying create"
                );
                self.repository.create(request).await?
            }
            result => result?,
        };

        if let Some((collection, workspace)) = descriptor.tenant_scope() {
            self.tenants.ensure_tenant(collection, workspace).await?;
        }
        Ok(outcome)
    }

    /// Returns whether the parent had to be rebuilt
    async fn ensure_parent(
        &self,
        descriptor: &ResourceDescriptor,
        parent_params: Option<&CreationParams>,
    ) -> WardenResult<bool> {
        let Some(parent) = descriptor.parent() else {
            return Ok(false);
        };
        let parent_id = parent.artifact_id();
        if self.repository.exists(&parent_id).await? {
            return Ok(false);
        }
        if !descriptor.self_heals_parent() {
            return Err(WardenError::not_found_with_hint(
                parent_id,
                format!("initialize the {} first", parent.kind()),
            ));
        }

        let params = match parent_params {
            Some(params) => params.clone(),
            None => self.recovered_params(&parent).await?,
        };
        warn!(
            artifact_id = %descriptor.artifact_id(),
            parent_id = %parent_id,
            "Parent artifact missing, recreating it"
        );

        let request = parent.creation_request(&params, &self.admins, &self.artifact_type);
        match self.repository.create(request).await {
            Ok(_) => Ok(true),
            Err(WardenError::ResourceNotFound { artifact_id, .. }) => {
                let kind = parent.parent().map_or("parent", |p| p.kind());
                Err(WardenError::not_found_with_hint(
                    artifact_id,
                    format!("initialize the {kind} first"),
                ))
            }
            Err(e) => Err(e),
        }
    }

    /// Creation parameters for rebuilding `parent` without caller input
    async fn recovered_params(&self, parent: &ResourceDescriptor) -> WardenResult<CreationParams> {
        let ResourceDescriptor::Collection(collection) = parent else {
            return Ok(parent.creation_params());
        };
        let config = self
            .vectors
            .collection_config(collection.full_name())
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => WardenError::not_found_with_hint(
                    collection.full_name(),
                    "create the collection first",
                ),
                other => other.into(),
            })?;
        debug!(collection = %collection.name(), "Recovered collection settings for repair");
        Ok(CollectionResource::params_from_settings(&config.settings))
    }

    /// Delete `descriptor`'s data, its artifact and every descendant artifact.
    ///
    /// Applications first delete their rows from the owner's tenant and
    /// collections drop their backing collection, which takes every
    /// application's rows with it. Descendant artifacts are deleted before
    /// their parents. The reported outcome is the row deletion, when there was
    /// one. Parents and siblings are never touched.
    pub async fn delete(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> WardenResult<Option<DeleteManyOutcome>> {
        let rows = match descriptor {
            ResourceDescriptor::Application(app) => {
                let scope = self
                    .tenants
                    .ensure_tenant(app.collection().name(), app.owner_workspace())
                    .await?;
                let outcome = self
                    .vectors
                    .delete_many(&scope, app.application_id())
                    .await?;
                info!(
                    application_id = %app.application_id(),
                    collection = %scope.collection(),
                    matches = outcome.matches,
                    successful = outcome.successful,
                    failed = outcome.failed,
                    "Deleted application rows"
                );
                Some(outcome)
            }
            ResourceDescriptor::Collection(collection) => {
                self.vectors
                    .delete_collections(&[collection.full_name().to_string()])
                    .await?;
                info!(collection = %collection.name(), "Deleted backing collection");
                None
            }
            _ => None,
        };

        self.delete_tree(&descriptor.artifact_id()).await?;
        Ok(rows)
    }

    /// Delete `root_id` and its descendants, children before parents
    async fn delete_tree(&self, root_id: &str) -> WardenResult<()> {
        let mut order = vec![root_id.to_string()];
        let mut next = 0;
        while next < order.len() {
            let children = self.repository.children(&order[next]).await?;
            order.extend(children.into_iter().map(|child| child.id));
            next += 1;
        }
        if order.len() > 1 {
            debug!(
                artifact_id = %root_id,
                descendants = order.len() - 1,
                "Deleting descendant artifacts"
            );
        }

        for artifact_id in order.iter().rev() {
            self.repository
                .delete(artifact_id, self.delete_files)
                .await?;
        }
        Ok(())
    }
}
