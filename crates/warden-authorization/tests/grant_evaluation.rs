//! Stored grants evaluated end to end through the checker

use proptest::prelude::*;
use std::sync::Arc;
use warden_authorization::PermissionChecker;
use warden_core::{AdminWorkspaces, Operation, ResourceDescriptor};
use warden_store::ArtifactRepository;
use warden_testkit::{stored_artifact, MockArtifactStore, ADMIN_WS};

const RUN_ID: &str = "agent-7:ws-owner:run-1";

fn checker_with_grant(token: &str) -> PermissionChecker {
    let store = MockArtifactStore::new();
    store.insert(stored_artifact(
        RUN_ID,
        Some("agent-7:ws-owner"),
        &[("ws-guest", token), ("*", "n")],
    ));
    PermissionChecker::new(
        ArtifactRepository::new(Arc::new(store)),
        AdminWorkspaces::new([ADMIN_WS]),
    )
}

fn run() -> ResourceDescriptor {
    ResourceDescriptor::run("agent-7", "ws-owner", "run-1").unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn operation() -> impl Strategy<Value = Operation> {
    prop::sample::select(Operation::ALL.to_vec())
}

#[tokio::test]
async fn read_write_manage_covers_everything_but_all_and_no_access() {
    let checker = checker_with_grant("rw+");
    for op in Operation::ALL {
        let allowed = checker.has_permission("ws-guest", &run(), op).await;
        let expected = op != Operation::All && op != Operation::NoAccess;
        assert_eq!(allowed, expected, "rw+ vs {op}");
        assert_eq!(allowed, Operation::ReadWriteManage.covers().contains(&op));
    }
}

#[tokio::test]
async fn list_variants_do_not_imply_each_other() {
    let checker = checker_with_grant("lv+");
    assert!(checker.has_permission("ws-guest", &run(), Operation::ListCreate).await);
    assert!(!checker.has_permission("ws-guest", &run(), Operation::ListFiles).await);
    assert!(!checker.has_permission("ws-guest", &run(), Operation::Read).await);
}

#[tokio::test]
async fn unknown_stored_token_grants_nothing() {
    let checker = checker_with_grant("superuser");
    assert!(!checker.has_permission("ws-guest", &run(), Operation::List).await);
    assert!(checker.has_permission(ADMIN_WS, &run(), Operation::All).await);
}

proptest! {
    #[test]
    fn stored_grant_decides_exactly_per_containment(granted in operation(), requested in operation()) {
        let checker = checker_with_grant(granted.as_str());
        let allowed = runtime().block_on(checker.has_permission("ws-guest", &run(), requested));
        prop_assert_eq!(allowed, granted.covers().contains(&requested));
    }

    #[test]
    fn every_stored_grant_permits_itself(granted in operation()) {
        let checker = checker_with_grant(granted.as_str());
        prop_assert!(runtime().block_on(checker.has_permission("ws-guest", &run(), granted)));
    }
}
