//! Shared fixtures

use serde_json::json;
use std::collections::BTreeMap;
use warden_core::{Artifact, ArtifactConfig, CollectionSettings, Manifest, PermissionMap, WardenConfig};

/// Admin workspace used by [`test_config`]
pub const ADMIN_WS: &str = "admin-ws";

/// Configuration with [`ADMIN_WS`] as the only admin
pub fn test_config() -> WardenConfig {
    WardenConfig::with_admins([ADMIN_WS])
}

/// Settings for the `Movie` collection, short name in `class`
#[allow(clippy::expect_used)]
pub fn movie_settings(multi_tenant: bool) -> CollectionSettings {
    CollectionSettings::from_value(json!({
        "class": "Movie",
        "description": "A movie collection",
        "multiTenancyConfig": {"enabled": multi_tenant},
        "properties": [
            {"name": "title", "dataType": ["text"]},
            {"name": "application_id", "dataType": ["text"]},
        ],
    }))
    .expect("fixture settings are valid")
}

/// Permission map from `(key, token)` pairs, tokens stored verbatim
pub fn permission_map(pairs: &[(&str, &str)]) -> PermissionMap {
    PermissionMap::from(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    )
}

/// A stored artifact with the given parent and permissions
pub fn stored_artifact(id: &str, parent_id: Option<&str>, permissions: &[(&str, &str)]) -> Artifact {
    Artifact {
        id: id.to_string(),
        parent_id: parent_id.map(str::to_string),
        artifact_type: "collection".to_string(),
        manifest: Manifest {
            name: id.to_string(),
            description: format!("fixture artifact {id}"),
            ..Manifest::default()
        },
        config: ArtifactConfig::with_permissions(permission_map(permissions)),
    }
}
