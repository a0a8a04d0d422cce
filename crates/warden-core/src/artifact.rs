//! Artifact records and store request shapes
//!
//! The artifact store owns these records. Warden reads `id`, `parent_id` and
//! `config.permissions`; the manifest is written at creation and otherwise
//! passed through untouched.

use crate::grants::PermissionMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Descriptive manifest stored on every artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Artifact name (always the artifact id)
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Child listing slot expected by the artifact store
    #[serde(default)]
    pub collection: Vec<Value>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Artifact configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Stored permission map
    #[serde(default)]
    pub permissions: PermissionMap,
    /// Provider-specific keys Warden does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArtifactConfig {
    /// Config holding only a permission map
    pub fn with_permissions(permissions: PermissionMap) -> Self {
        Self {
            permissions,
            extra: Map::new(),
        }
    }
}

/// A stored artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact id (the alias it was created under)
    pub id: String,
    /// Id of the enclosing artifact
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Artifact type, usually `collection`
    #[serde(rename = "type", default)]
    pub artifact_type: String,
    /// Descriptive manifest
    pub manifest: Manifest,
    /// Configuration, including permissions
    #[serde(default)]
    pub config: ArtifactConfig,
}

/// Parameters for `create` on the artifact store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateArtifactRequest {
    /// Alias the artifact is addressable by
    pub alias: String,
    /// Artifact type
    #[serde(rename = "type")]
    pub artifact_type: String,
    /// Enclosing artifact, if any
    pub parent_id: Option<String>,
    /// Manifest to store
    pub manifest: Manifest,
    /// Config to store
    pub config: ArtifactConfig,
}

/// Parameters for `edit` on the artifact store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditArtifactRequest {
    /// Artifact to edit
    pub artifact_id: String,
    /// Replacement manifest
    pub manifest: Option<Manifest>,
    /// Replacement config
    pub config: Option<ArtifactConfig>,
    /// Version to stage the edit under
    pub version: Option<String>,
    /// Commit comment
    pub comment: Option<String>,
}

/// Result of an idempotent create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateOutcome {
    /// The artifact was created by this call
    Created,
    /// The artifact already existed; nothing was written
    AlreadyExists,
}

impl CreateOutcome {
    /// True when this call created the artifact
    pub fn is_created(self) -> bool {
        matches!(self, Self::Created)
    }
}
