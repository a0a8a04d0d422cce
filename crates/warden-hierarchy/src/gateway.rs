//! Access-controlled entry points
//!
//! [`ResourceGateway`] is what services hold. Every mutating call that acts on
//! behalf of a workspace authorizes first and then delegates to the
//! [`HierarchyManager`] or the [`PermissionEditor`].

use crate::manager::HierarchyManager;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use warden_authorization::{PermissionChecker, PermissionEditor};
use warden_core::identity::short_collection_name;
use warden_core::{
    Artifact, ArtifactStoreEffects, CollectionResource, CollectionSettings, CreateOutcome,
    CreationParams, DeleteManyOutcome, Operation, PermissionGrants, PermissionMap, Resource,
    ResourceDescriptor, TenantScope, VectorStoreEffects, WardenConfig, WardenError,
    WardenResult,
};
use warden_store::ArtifactRepository;

/// Access-controlled facade over the whole resource hierarchy
#[derive(Clone)]
pub struct ResourceGateway {
    checker: PermissionChecker,
    editor: PermissionEditor,
    manager: HierarchyManager,
    vectors: Arc<dyn VectorStoreEffects>,
}

impl fmt::Debug for ResourceGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceGateway")
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

impl ResourceGateway {
    /// Build a gateway from a validated configuration and store handles
    pub fn new(
        config: &WardenConfig,
        artifacts: Arc<dyn ArtifactStoreEffects>,
        vectors: Arc<dyn VectorStoreEffects>,
    ) -> WardenResult<Self> {
        config.validate()?;
        let repository = ArtifactRepository::new(artifacts);
        let checker = PermissionChecker::new(repository.clone(), config.admin_workspaces());
        Ok(Self {
            editor: PermissionEditor::new(checker.clone()),
            manager: HierarchyManager::new(repository, vectors.clone(), config),
            checker,
            vectors,
        })
    }

    /// Permission checker in use
    pub fn checker(&self) -> &PermissionChecker {
        &self.checker
    }

    /// Hierarchy manager in use
    pub fn manager(&self) -> &HierarchyManager {
        &self.manager
    }

    /// See [`PermissionChecker::require_permission`]
    pub async fn require_permission(
        &self,
        accessor: &str,
        descriptor: &ResourceDescriptor,
        operation: Operation,
    ) -> WardenResult<()> {
        self.checker
            .require_permission(accessor, descriptor, operation)
            .await
    }

    /// See [`PermissionChecker::has_permission`]
    pub async fn has_permission(
        &self,
        accessor: &str,
        descriptor: &ResourceDescriptor,
        operation: Operation,
    ) -> bool {
        self.checker
            .has_permission(accessor, descriptor, operation)
            .await
    }

    /// Fail unless `accessor` is an admin
    pub fn require_admin(&self, accessor: &str) -> WardenResult<()> {
        self.checker.require_admin(accessor)
    }

    /// Create a resource owned by `owner_workspace`.
    ///
    /// `default_grant` overrides the grant given to `"*"`.
    pub async fn create_resource(
        &self,
        descriptor: &ResourceDescriptor,
        owner_workspace: &str,
        default_grant: Option<Operation>,
    ) -> WardenResult<CreateOutcome> {
        let params = CreationParams {
            default_grant,
            ..CreationParams::owned_by(owner_workspace)
        };
        self.manager.create(descriptor, &params).await
    }

    /// Create a resource from full creation parameters
    pub async fn create_resource_with(
        &self,
        descriptor: &ResourceDescriptor,
        params: &CreationParams,
    ) -> WardenResult<CreateOutcome> {
        self.manager.create(descriptor, params).await
    }

    /// See [`PermissionEditor::set_permissions`]
    pub async fn set_permissions(
        &self,
        accessor: &str,
        descriptor: &ResourceDescriptor,
        grants: &PermissionGrants,
        merge: bool,
    ) -> WardenResult<PermissionMap> {
        self.editor
            .set_permissions(accessor, descriptor, grants, merge)
            .await
    }

    /// Delete a resource; requires `rw+`
    pub async fn delete_resource(
        &self,
        accessor: &str,
        descriptor: &ResourceDescriptor,
    ) -> WardenResult<Option<DeleteManyOutcome>> {
        self.checker
            .require_permission(accessor, descriptor, Operation::MANAGE)
            .await?;
        self.manager.delete(descriptor).await
    }

    /// The resource's artifact; requires `r`
    pub async fn describe(
        &self,
        accessor: &str,
        descriptor: &ResourceDescriptor,
    ) -> WardenResult<Artifact> {
        self.checker
            .require_permission(accessor, descriptor, Operation::Read)
            .await?;
        self.manager
            .repository()
            .read(&descriptor.artifact_id())
            .await
    }

    /// Whether the resource's artifact exists
    pub async fn resource_exists(&self, descriptor: &ResourceDescriptor) -> WardenResult<bool> {
        self.manager
            .repository()
            .exists(&descriptor.artifact_id())
            .await
    }

    /// Require the resource to be initialized, then require `operation`.
    ///
    /// A missing resource is `ResourceNotFound` even for accessors that would
    /// be denied.
    pub async fn require_initialized(
        &self,
        accessor: &str,
        descriptor: &ResourceDescriptor,
        operation: Operation,
    ) -> WardenResult<()> {
        if !self.resource_exists(descriptor).await? {
            return Err(WardenError::not_found_with_hint(
                descriptor.artifact_id(),
                format!("initialize the {} first", descriptor.kind()),
            ));
        }
        self.require_permission(accessor, descriptor, operation)
            .await
    }

    /// Create a collection; admin only.
    ///
    /// Writes the collection artifact, then the backing collection under its
    /// storage name. Returns the stored settings with the caller-facing name.
    pub async fn create_collection(
        &self,
        accessor: &str,
        settings: &CollectionSettings,
    ) -> WardenResult<CollectionSettings> {
        self.require_admin(accessor)?;
        let collection = CollectionResource::new(short_collection_name(settings.class()))?;
        let params = CreationParams {
            owner: Some(accessor.to_string()),
            ..CollectionResource::params_from_settings(settings)
        };
        self.manager
            .create(&ResourceDescriptor::Collection(collection.clone()), &params)
            .await?;

        let created = self
            .vectors
            .create_collection(settings.with_full_name()?)
            .await?;
        info!(collection = %collection.name(), workspace = %accessor, "Created collection");
        Ok(created.with_short_name())
    }

    /// Delete collections; requires `rw+` on every one of them
    pub async fn delete_collections(&self, accessor: &str, names: &[&str]) -> WardenResult<()> {
        let collections = names
            .iter()
            .map(|name| CollectionResource::new(*name))
            .collect::<WardenResult<Vec<_>>>()?;
        self.checker
            .require_all(accessor, &collections, Operation::MANAGE)
            .await?;
        for collection in collections {
            self.manager
                .delete(&ResourceDescriptor::Collection(collection))
                .await?;
        }
        Ok(())
    }

    /// True only when both the backing collection and its artifact exist
    pub async fn collection_exists(&self, name: &str) -> WardenResult<bool> {
        let collection = CollectionResource::new(name)?;
        if !self.vectors.collection_exists(collection.full_name()).await? {
            return Ok(false);
        }
        self.manager
            .repository()
            .exists(&collection.artifact_id())
            .await
    }

    /// Register an agent owned by `accessor`
    pub async fn init_agent(
        &self,
        accessor: &str,
        agent_id: &str,
        params: CreationParams,
    ) -> WardenResult<CreateOutcome> {
        let agent = ResourceDescriptor::agent(agent_id)?;
        let params = CreationParams {
            owner: Some(accessor.to_string()),
            ..params
        };
        self.manager.create(&agent, &params).await
    }

    /// Register an agent's workspace scope and optionally a run under it.
    ///
    /// `workspace` defaults to the accessor's. The bare agent must already be
    /// registered. Returns the outcome for the deepest resource created.
    pub async fn init_run(
        &self,
        accessor: &str,
        agent_id: &str,
        workspace: Option<&str>,
        run_id: Option<&str>,
        params: CreationParams,
    ) -> WardenResult<CreateOutcome> {
        let workspace = workspace.unwrap_or(accessor);
        let scoped = ResourceDescriptor::workspace_agent(agent_id, workspace)?;
        let params = CreationParams {
            owner: Some(accessor.to_string()),
            ..params
        };

        let outcome = self.manager.create(&scoped, &params).await?;
        match run_id {
            Some(run_id) => {
                let run = ResourceDescriptor::run(agent_id, workspace, run_id)?;
                self.manager.create(&run, &params).await
            }
            None => Ok(outcome),
        }
    }

    /// Where an application's rows live, provisioning the tenant if needed
    pub async fn application_scope(&self, descriptor: &ResourceDescriptor) -> WardenResult<TenantScope> {
        let ResourceDescriptor::Application(app) = descriptor else {
            return Err(WardenError::validation(format!(
                "{descriptor} does not own vector rows"
            )));
        };
        self.manager
            .tenants()
            .ensure_tenant(app.collection().name(), app.owner_workspace())
            .await
    }
}
