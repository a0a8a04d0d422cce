//! Permission map editing

use crate::checker::PermissionChecker;
use tracing::info;
use warden_core::{ArtifactConfig, Operation, PermissionGrants, PermissionMap, Resource, WardenResult};

/// Rewrites the stored permission map of a resource
#[derive(Debug, Clone)]
pub struct PermissionEditor {
    checker: PermissionChecker,
}

impl PermissionEditor {
    /// Create an editor that authorizes through `checker`
    pub fn new(checker: PermissionChecker) -> Self {
        Self { checker }
    }

    /// Set grants on `resource`'s own artifact.
    ///
    /// With `merge`, `grants` overwrite the stored entries key by key and other
    /// entries are kept; without it the stored map becomes exactly `grants`.
    /// Requires `rw+`, checked before anything is read or written. Config keys
    /// other than `permissions` are preserved. Returns the map now stored.
    pub async fn set_permissions<R: Resource + ?Sized>(
        &self,
        accessor: &str,
        resource: &R,
        grants: &PermissionGrants,
        merge: bool,
    ) -> WardenResult<PermissionMap> {
        self.checker
            .require_permission(accessor, resource, Operation::MANAGE)
            .await?;

        let artifact_id = resource.artifact_id();
        let repository = self.checker.repository();
        let current = repository.read(&artifact_id).await?;

        let permissions = if merge {
            current.config.permissions.merged_with(grants)
        } else {
            PermissionMap::from(grants)
        };
        let config = ArtifactConfig {
            permissions: permissions.clone(),
            extra: current.config.extra,
        };
        repository.edit(&artifact_id, None, Some(config)).await?;

        info!(
            artifact_id = %artifact_id,
            workspace = %accessor,
            merge,
            entries = permissions.len(),
            "Updated permissions"
        );
        Ok(permissions)
    }
}
