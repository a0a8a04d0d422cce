//! Access-controlled operations through the gateway

use assert_matches::assert_matches;
use std::sync::Arc;
use warden_core::{
    CreateOutcome, CreationParams, Operation, PermissionGrants, ResourceDescriptor, TenantScope,
    WardenConfig, WardenError,
};
use warden_hierarchy::ResourceGateway;
use warden_testkit::{
    init_test_tracing, movie_settings, test_config, MockArtifactStore, MockVectorStore, ADMIN_WS,
};

const MOVIE: &str = "Shared__DELIM__Movie";

struct Env {
    artifacts: MockArtifactStore,
    vectors: MockVectorStore,
    gateway: ResourceGateway,
}

async fn env_with_movie(multi_tenant: bool) -> Env {
    init_test_tracing();
    let artifacts = MockArtifactStore::new();
    let vectors = MockVectorStore::new();
    let gateway = ResourceGateway::new(
        &test_config(),
        Arc::new(artifacts.clone()),
        Arc::new(vectors.clone()),
    )
    .unwrap();
    gateway
        .create_collection(ADMIN_WS, &movie_settings(multi_tenant))
        .await
        .unwrap();
    Env {
        artifacts,
        vectors,
        gateway,
    }
}

fn movie() -> ResourceDescriptor {
    ResourceDescriptor::collection("Movie").unwrap()
}

#[test]
fn gateway_requires_valid_config() {
    let result = ResourceGateway::new(
        &WardenConfig::default(),
        Arc::new(MockArtifactStore::new()),
        Arc::new(MockVectorStore::new()),
    );
    assert_matches!(result, Err(WardenError::Config { .. }));
}

#[tokio::test]
async fn collection_lifecycle() {
    let env = env_with_movie(true).await;

    assert!(env.gateway.collection_exists("Movie").await.unwrap());
    assert_eq!(
        env.vectors.settings(MOVIE).unwrap().class(),
        MOVIE,
        "backing collection uses the storage name"
    );

    env.artifacts.remove(MOVIE);
    assert!(!env.gateway.collection_exists("Movie").await.unwrap());
    assert!(!env.gateway.collection_exists("Books").await.unwrap());
}

#[tokio::test]
async fn only_admins_create_collections() {
    let env = env_with_movie(true).await;
    let mut books = movie_settings(true).to_value();
    books["class"] = "Books".into();
    let books = warden_core::CollectionSettings::from_value(books).unwrap();

    assert_matches!(
        env.gateway.create_collection("ws-alice", &books).await,
        Err(WardenError::NotAdmin { .. })
    );
    assert!(!env.vectors.has_collection("Shared__DELIM__Books"));

    let created = env.gateway.create_collection(ADMIN_WS, &books).await.unwrap();
    assert_eq!(created.class(), "Books");
}

#[tokio::test]
async fn collection_deletion_is_conjunctive() {
    let env = env_with_movie(true).await;
    let mut books = movie_settings(true).to_value();
    books["class"] = "Books".into();
    env.gateway
        .create_collection(
            ADMIN_WS,
            &warden_core::CollectionSettings::from_value(books).unwrap(),
        )
        .await
        .unwrap();
    env.gateway
        .set_permissions(
            ADMIN_WS,
            &movie(),
            &PermissionGrants::from_pairs([("ws-alice", "rw+")]).unwrap(),
            true,
        )
        .await
        .unwrap();

    assert_matches!(
        env.gateway.delete_collections("ws-alice", &["Movie", "Books"]).await,
        Err(WardenError::PermissionDenied { resource, operation: Operation::ReadWriteManage })
            if resource == "collection 'Books'"
    );
    assert!(env.vectors.has_collection(MOVIE));

    env.gateway
        .delete_collections("ws-alice", &["Movie"])
        .await
        .unwrap();
    assert!(!env.vectors.has_collection(MOVIE));
    assert!(!env.artifacts.contains(MOVIE));
    assert!(env.vectors.has_collection("Shared__DELIM__Books"));
}

#[tokio::test]
async fn recreated_collection_does_not_inherit_old_applications() {
    let env = env_with_movie(true).await;
    let app = ResourceDescriptor::application("Movie", "search", "ws-alice").unwrap();
    env.gateway.create_resource(&app, "ws-alice", None).await.unwrap();
    env.gateway
        .set_permissions(
            "ws-alice",
            &app,
            &PermissionGrants::from_pairs([("ws-eve", "rw")]).unwrap(),
            true,
        )
        .await
        .unwrap();

    env.gateway
        .delete_collections(ADMIN_WS, &["Movie"])
        .await
        .unwrap();
    assert!(env.artifacts.ids().is_empty());

    env.gateway
        .create_collection(ADMIN_WS, &movie_settings(true))
        .await
        .unwrap();
    assert!(!env.gateway.resource_exists(&app).await.unwrap());
    assert!(
        !env.gateway
            .has_permission("ws-eve", &app, Operation::ReadWrite)
            .await
    );
    assert_eq!(env.artifacts.ids(), vec![MOVIE.to_string()]);
}

#[tokio::test]
async fn application_delete_removes_only_its_rows() {
    let env = env_with_movie(true).await;
    let app = ResourceDescriptor::application("Movie", "search", "ws-alice").unwrap();
    let sibling = ResourceDescriptor::application("Movie", "browse", "ws-alice").unwrap();
    env.gateway.create_resource(&app, "ws-alice", None).await.unwrap();
    env.gateway
        .create_resource(&sibling, "ws-alice", None)
        .await
        .unwrap();

    let scope = env.gateway.application_scope(&app).await.unwrap();
    assert_eq!(scope.tenant(), Some("ws-alice"));
    env.vectors.insert_rows(MOVIE, Some("ws-alice"), "search", 4);
    env.vectors.insert_rows(MOVIE, Some("ws-alice"), "browse", 2);
    env.vectors.insert_rows(MOVIE, Some("ws-bob"), "search", 1);

    let outcome = env
        .gateway
        .delete_resource("ws-alice", &app)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.successful, 4);
    assert_eq!(env.vectors.row_count(MOVIE, Some("ws-alice"), "search"), 0);
    assert_eq!(env.vectors.row_count(MOVIE, Some("ws-alice"), "browse"), 2);
    assert_eq!(env.vectors.row_count(MOVIE, Some("ws-bob"), "search"), 1);
    assert!(!env.gateway.resource_exists(&app).await.unwrap());
    assert!(env.gateway.resource_exists(&sibling).await.unwrap());
    assert!(env.artifacts.contains(MOVIE));
}

#[tokio::test]
async fn application_scope_without_multi_tenancy_is_shared() {
    let env = env_with_movie(false).await;
    let app = ResourceDescriptor::application("Movie", "search", "ws-alice").unwrap();
    env.gateway.create_resource(&app, "ws-alice", None).await.unwrap();

    assert_eq!(
        env.gateway.application_scope(&app).await.unwrap(),
        TenantScope::Shared {
            collection: MOVIE.to_string()
        }
    );
    assert_matches!(
        env.gateway.application_scope(&movie()).await,
        Err(WardenError::Validation { .. })
    );
}

#[tokio::test]
async fn delete_requires_manage() {
    let env = env_with_movie(true).await;
    let app = ResourceDescriptor::application("Movie", "search", "ws-alice").unwrap();
    env.gateway.create_resource(&app, "ws-alice", None).await.unwrap();

    assert_matches!(
        env.gateway.delete_resource("ws-mallory", &app).await,
        Err(WardenError::PermissionDenied { .. })
    );
    assert!(env.gateway.resource_exists(&app).await.unwrap());
}

#[tokio::test]
async fn describe_requires_read() {
    let env = env_with_movie(true).await;
    let agent = ResourceDescriptor::agent("agent-7").unwrap();
    env.gateway
        .init_agent("ws-owner", "agent-7", CreationParams::default().with_description("helper"))
        .await
        .unwrap();

    let artifact = env.gateway.describe("ws-anyone", &agent).await.unwrap();
    assert_eq!(artifact.manifest.description, "helper");

    assert_matches!(
        env.gateway.describe("ws-anyone", &movie()).await,
        Err(WardenError::PermissionDenied { operation: Operation::Read, .. })
    );
}

#[tokio::test]
async fn init_run_requires_registered_agent() {
    let env = env_with_movie(true).await;

    assert_matches!(
        env.gateway
            .init_run("ws-bob", "agent-7", None, Some("run-1"), CreationParams::default())
            .await,
        Err(WardenError::ResourceNotFound { artifact_id, .. }) if artifact_id == "agent-7"
    );

    env.gateway
        .init_agent("ws-owner", "agent-7", CreationParams::default())
        .await
        .unwrap();
    let outcome = env
        .gateway
        .init_run("ws-bob", "agent-7", None, Some("run-1"), CreationParams::default())
        .await
        .unwrap();
    assert_eq!(outcome, CreateOutcome::Created);
    assert!(env.artifacts.contains("agent-7:ws-bob"));
    assert!(env.artifacts.contains("agent-7:ws-bob:run-1"));

    let again = env
        .gateway
        .init_run("ws-bob", "agent-7", None, None, CreationParams::default())
        .await
        .unwrap();
    assert_eq!(again, CreateOutcome::AlreadyExists);
}

#[tokio::test]
async fn require_initialized_checks_existence_before_permission() {
    let env = env_with_movie(true).await;
    let scoped = ResourceDescriptor::workspace_agent("agent-7", "ws-bob").unwrap();

    assert_matches!(
        env.gateway
            .require_initialized("ws-mallory", &scoped, Operation::ReadWrite)
            .await,
        Err(WardenError::ResourceNotFound { .. })
    );

    env.gateway
        .init_agent("ws-owner", "agent-7", CreationParams::default())
        .await
        .unwrap();
    env.gateway
        .init_run("ws-bob", "agent-7", None, None, CreationParams::default())
        .await
        .unwrap();

    env.gateway
        .require_initialized("ws-bob", &scoped, Operation::ReadWrite)
        .await
        .unwrap();
    assert_matches!(
        env.gateway
            .require_initialized("ws-mallory", &scoped, Operation::ReadWrite)
            .await,
        Err(WardenError::PermissionDenied { .. })
    );
}

#[tokio::test]
async fn owner_can_share_and_revoke() {
    let env = env_with_movie(true).await;
    let app = ResourceDescriptor::application("Movie", "search", "ws-alice").unwrap();
    env.gateway
        .create_resource(&app, "ws-alice", Some(Operation::List))
        .await
        .unwrap();

    assert!(env.gateway.has_permission("ws-bob", &app, Operation::List).await);
    assert!(!env.gateway.has_permission("ws-bob", &app, Operation::Read).await);

    env.gateway
        .set_permissions(
            "ws-alice",
            &app,
            &PermissionGrants::new().with("ws-bob", Operation::ReadWrite).unwrap(),
            true,
        )
        .await
        .unwrap();
    env.gateway
        .require_permission("ws-bob", &app, Operation::ReadWrite)
        .await
        .unwrap();

    assert_matches!(
        env.gateway
            .set_permissions(
                "ws-bob",
                &app,
                &PermissionGrants::new().with("ws-bob", Operation::All).unwrap(),
                true,
            )
            .await,
        Err(WardenError::PermissionDenied { .. })
    );
}
