//! External store effect interfaces
//!
//! Warden never talks to a concrete backend. The artifact store and the vector
//! store are reached through these traits; production handlers live in the
//! embedding service and in-memory handlers live in `warden-testkit`.

use crate::artifact::{Artifact, CreateArtifactRequest, EditArtifactRequest};
use crate::settings::CollectionSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Failure reported by an external store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The addressed artifact, collection or parent does not exist
    #[error("Store entry not found: {id}")]
    NotFound {
        /// Id of the missing entry
        id: String,
    },

    /// An entry with the same alias or name already exists
    #[error("Store entry already exists: {id}")]
    AlreadyExists {
        /// Id of the conflicting entry
        id: String,
    },

    /// Any other backend or transport failure
    #[error("Store transport error: {message}")]
    Transport {
        /// Backend-supplied message
        message: String,
    },
}

impl StoreError {
    /// Create a not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an already-exists error
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// True for [`StoreError::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for [`StoreError::AlreadyExists`]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Artifact store operations
#[async_trait]
pub trait ArtifactStoreEffects: Send + Sync {
    /// Read an artifact by id or alias
    async fn read(&self, artifact_id: &str) -> Result<Artifact, StoreError>;

    /// Create an artifact under an optional parent.
    ///
    /// Fails with `AlreadyExists` when the alias is taken and with `NotFound`
    /// naming the parent when the parent is missing.
    async fn create(&self, request: CreateArtifactRequest) -> Result<Artifact, StoreError>;

    /// Replace an artifact's manifest and/or config
    async fn edit(&self, request: EditArtifactRequest) -> Result<(), StoreError>;

    /// Delete an artifact, optionally removing its stored files.
    ///
    /// Children are not deleted with it.
    async fn delete(&self, artifact_id: &str, delete_files: bool) -> Result<(), StoreError>;

    /// Direct children of `parent_id`; `NotFound` when the parent is missing
    async fn list(&self, parent_id: &str) -> Result<Vec<Artifact>, StoreError>;
}

/// A named tenant inside a multi-tenant collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant name as the vector store stores it
    pub name: String,
}

impl Tenant {
    /// Create a tenant handle
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Stored configuration of a vector collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorCollectionConfig {
    /// Whether rows are partitioned by tenant
    pub multi_tenancy_enabled: bool,
    /// Full settings document, `class` holding the storage name
    pub settings: CollectionSettings,
}

/// Where a workspace's rows live inside a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum TenantScope {
    /// A dedicated tenant of a multi-tenant collection
    Tenant {
        /// Storage name of the collection
        collection: String,
        /// Tenant name
        tenant: String,
    },
    /// The collection's shared rows (multi-tenancy disabled)
    Shared {
        /// Storage name of the collection
        collection: String,
    },
}

impl TenantScope {
    /// Storage name of the collection
    pub fn collection(&self) -> &str {
        match self {
            Self::Tenant { collection, .. } | Self::Shared { collection } => collection,
        }
    }

    /// Tenant name, when rows are tenant-partitioned
    pub fn tenant(&self) -> Option<&str> {
        match self {
            Self::Tenant { tenant, .. } => Some(tenant),
            Self::Shared { .. } => None,
        }
    }
}

/// Counts reported by a bulk row deletion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteManyOutcome {
    /// Rows matching the filter
    pub matches: u64,
    /// Rows deleted
    pub successful: u64,
    /// Rows that failed to delete
    pub failed: u64,
}

/// Vector store operations used for tenant provisioning and collection lifecycle
#[async_trait]
pub trait VectorStoreEffects: Send + Sync {
    /// Configuration of a collection by storage name
    async fn collection_config(&self, collection: &str) -> Result<VectorCollectionConfig, StoreError>;

    /// Look up a tenant by name
    async fn tenant_by_name(&self, collection: &str, name: &str) -> Result<Option<Tenant>, StoreError>;

    /// Create tenants; `AlreadyExists` when one of them is already present
    async fn create_tenants(&self, collection: &str, tenants: Vec<Tenant>) -> Result<(), StoreError>;

    /// Whether a collection exists
    async fn collection_exists(&self, collection: &str) -> Result<bool, StoreError>;

    /// Create a collection from settings whose `class` is the storage name
    async fn create_collection(
        &self,
        settings: CollectionSettings,
    ) -> Result<CollectionSettings, StoreError>;

    /// Delete collections by storage name
    async fn delete_collections(&self, collections: &[String]) -> Result<(), StoreError>;

    /// Delete every row in `scope` tagged with `application_id`
    async fn delete_many(
        &self,
        scope: &TenantScope,
        application_id: &str,
    ) -> Result<DeleteManyOutcome, StoreError>;
}
