//! Grant resolution and permission checks

use tracing::{debug, info, warn};
use warden_core::operation::grant_permits;
use warden_core::{AdminWorkspaces, Operation, Resource, WardenError, WardenResult};
use warden_store::ArtifactRepository;

/// Decides whether a workspace may perform an operation on a resource
#[derive(Debug, Clone)]
pub struct PermissionChecker {
    repository: ArtifactRepository,
    admins: AdminWorkspaces,
}

impl PermissionChecker {
    /// Create a checker with an explicit admin allow-list
    pub fn new(repository: ArtifactRepository, admins: AdminWorkspaces) -> Self {
        Self { repository, admins }
    }

    /// Repository the checker reads grants through
    pub fn repository(&self) -> &ArtifactRepository {
        &self.repository
    }

    /// Admin allow-list
    pub fn admins(&self) -> &AdminWorkspaces {
        &self.admins
    }

    /// Whether `workspace` is an admin
    pub fn is_admin(&self, workspace: &str) -> bool {
        self.admins.contains(workspace)
    }

    /// Grant `accessor` holds on the artifact `artifact_id`.
    ///
    /// Uses the accessor's own entry, else the `"*"` entry. Any failure to read
    /// the artifact yields the empty grant.
    pub async fn get_grant(&self, accessor: &str, artifact_id: &str) -> Option<Operation> {
        match self.repository.read(artifact_id).await {
            Ok(artifact) => {
                let grant = artifact.config.permissions.grant_for(accessor);
                debug!(
                    artifact_id = %artifact_id,
                    workspace = %accessor,
                    grant = ?grant.map(Operation::as_str),
                    "Resolved grant"
                );
                grant
            }
            Err(e) => {
                warn!(
                    artifact_id = %artifact_id,
                    workspace = %accessor,
                    error = %e,
                    "Could not read artifact, treating as no grant"
                );
                None
            }
        }
    }

    /// Advisory check; admins are always allowed
    pub async fn has_permission<R: Resource + ?Sized>(
        &self,
        accessor: &str,
        resource: &R,
        operation: Operation,
    ) -> bool {
        if self.is_admin(accessor) {
            debug!(workspace = %accessor, operation = %operation, "Admin bypass");
            return true;
        }
        let grant = self.get_grant(accessor, &resource.artifact_id()).await;
        grant_permits(grant, operation)
    }

    /// Fail with `PermissionDenied` unless `accessor` may perform `operation`
    pub async fn require_permission<R: Resource + ?Sized>(
        &self,
        accessor: &str,
        resource: &R,
        operation: Operation,
    ) -> WardenResult<()> {
        if self.has_permission(accessor, resource, operation).await {
            return Ok(());
        }
        let description = resource.description();
        info!(
            workspace = %accessor,
            operation = %operation,
            resource = %description,
            "Permission denied"
        );
        Err(WardenError::permission_denied(description, operation))
    }

    /// Require `operation` on every resource, in order.
    ///
    /// Stops at the first denial, which names that resource.
    pub async fn require_all<R: Resource>(
        &self,
        accessor: &str,
        resources: &[R],
        operation: Operation,
    ) -> WardenResult<()> {
        for resource in resources {
            self.require_permission(accessor, resource, operation).await?;
        }
        Ok(())
    }

    /// Fail with `NotAdmin` unless `accessor` is an admin
    pub fn require_admin(&self, accessor: &str) -> WardenResult<()> {
        if self.is_admin(accessor) {
            Ok(())
        } else {
            info!(workspace = %accessor, "Admin operation refused");
            Err(WardenError::not_admin(accessor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use warden_core::{CollectionResource, ResourceDescriptor};
    use warden_testkit::{init_test_tracing, stored_artifact, MockArtifactStore, ADMIN_WS};

    fn setup() -> (MockArtifactStore, PermissionChecker) {
        init_test_tracing();
        let store = MockArtifactStore::new();
        let checker = PermissionChecker::new(
            ArtifactRepository::new(Arc::new(store.clone())),
            AdminWorkspaces::new([ADMIN_WS]),
        );
        (store, checker)
    }

    fn movie() -> ResourceDescriptor {
        ResourceDescriptor::collection("Movie").unwrap()
    }

    #[tokio::test]
    async fn grant_prefers_workspace_entry_over_everyone() {
        let (store, checker) = setup();
        store.insert(stored_artifact(
            "Shared__DELIM__Movie",
            None,
            &[("*", "r"), ("ws-writer", "rw"), ("ws-blocked", "n")],
        ));

        assert_eq!(
            checker.get_grant("ws-writer", "Shared__DELIM__Movie").await,
            Some(Operation::ReadWrite)
        );
        assert_eq!(
            checker.get_grant("ws-other", "Shared__DELIM__Movie").await,
            Some(Operation::Read)
        );
        assert!(checker.has_permission("ws-other", &movie(), Operation::List).await);
        assert!(!checker.has_permission("ws-blocked", &movie(), Operation::List).await);
        assert!(!checker.has_permission("ws-other", &movie(), Operation::ReadWrite).await);
    }

    #[tokio::test]
    async fn admins_bypass_denying_and_missing_grants() {
        let (store, checker) = setup();
        store.insert(stored_artifact("Shared__DELIM__Movie", None, &[("*", "n")]));

        for op in Operation::ALL {
            assert!(checker.has_permission(ADMIN_WS, &movie(), op).await);
        }
        let missing = ResourceDescriptor::agent("ghost").unwrap();
        checker
            .require_permission(ADMIN_WS, &missing, Operation::All)
            .await
            .unwrap();
        assert_eq!(store.calls().reads, 0);
    }

    #[tokio::test]
    async fn read_failures_fail_closed() {
        let (store, checker) = setup();
        store.insert(stored_artifact("Shared__DELIM__Movie", None, &[("*", "*")]));
        store.fail_reads_for("Shared__DELIM__Movie");

        assert_eq!(checker.get_grant("ws", "Shared__DELIM__Movie").await, None);
        assert_matches!(
            checker.require_permission("ws", &movie(), Operation::List).await,
            Err(WardenError::PermissionDenied { operation: Operation::List, .. })
        );
        assert!(!checker.has_permission("ws", &ResourceDescriptor::agent("ghost").unwrap(), Operation::List).await);
    }

    #[tokio::test]
    async fn denial_names_resource_and_operation() {
        let (store, checker) = setup();
        store.insert(stored_artifact("Shared__DELIM__Movie", None, &[("ws", "r")]));

        let err = checker
            .require_permission("ws", &movie(), Operation::ReadWrite)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Permission denied for rw operation on collection 'Movie'"
        );
    }

    #[tokio::test]
    async fn conjunctive_check_reports_first_denied_collection() {
        let (store, checker) = setup();
        store.insert(stored_artifact("Shared__DELIM__Movie", None, &[("ws", "rw+")]));
        store.insert(stored_artifact("Shared__DELIM__Books", None, &[("ws", "r")]));
        store.insert(stored_artifact("Shared__DELIM__Music", None, &[("ws", "n")]));

        let collections = ["Movie", "Books", "Music"]
            .into_iter()
            .map(|name| CollectionResource::new(name).unwrap())
            .collect::<Vec<_>>();

        assert_matches!(
            checker.require_all("ws", &collections, Operation::ReadWriteManage).await,
            Err(WardenError::PermissionDenied { resource, .. }) if resource == "collection 'Books'"
        );
        checker
            .require_all("ws", &collections[..1], Operation::ReadWriteManage)
            .await
            .unwrap();
    }

    #[test]
    fn require_admin_rejects_other_workspaces() {
        let (_store, checker) = setup();
        checker.require_admin(ADMIN_WS).unwrap();
        assert_matches!(
            checker.require_admin("ws"),
            Err(WardenError::NotAdmin { workspace }) if workspace == "ws"
        );
    }
}
