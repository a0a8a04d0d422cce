//! # Warden Core - Foundation
//!
//! **Purpose**: Define the permission lattice, resource identity scheme and the
//! effect interfaces that every other Warden crate builds on.
//!
//! # Architecture Constraints
//!
//! - YES Operation tokens and their containment table
//! - YES Deterministic naming for collections, applications, agents and runs
//! - YES Artifact and vector-store data shapes
//! - YES Effect traits for the external artifact store and vector store
//! - NO I/O (handlers live in `warden-testkit` or in the embedding service)
//! - NO orchestration (that's `warden-store` and `warden-hierarchy`)
//!
//! ## Core Concepts
//!
//! - **Operation lattice**: `n, l, l+, lv, lv+, lf, lf+, r, r+, rw, rw+, *` with a
//!   fixed containment table
//! - **Resource descriptors**: closed union of every resource kind, each deriving its
//!   artifact id and the id of its enclosing resource
//! - **Artifacts**: the external store's permissioned, hierarchical metadata records

#![forbid(unsafe_code)]

/// Unified error types
pub mod errors;

/// Operation tokens and the containment lattice
pub mod operation;

/// Stored and caller-supplied permission maps
pub mod grants;

/// Naming constants and pure identifier transforms
pub mod identity;

/// Resource descriptors and their creation parameters
pub mod resource;

/// Artifact records and store request shapes
pub mod artifact;

/// Vector collection settings
pub mod settings;

/// External store effect interfaces
pub mod effects;

/// Configuration loading and validation
pub mod config;

pub use artifact::{
    Artifact, ArtifactConfig, CreateArtifactRequest, CreateOutcome, EditArtifactRequest, Manifest,
};
pub use config::{AdminWorkspaces, WardenConfig};
pub use effects::{
    ArtifactStoreEffects, DeleteManyOutcome, StoreError, Tenant, TenantScope,
    VectorCollectionConfig, VectorStoreEffects,
};
pub use errors::{WardenError, WardenResult};
pub use grants::{PermissionGrants, PermissionMap};
pub use operation::Operation;
pub use resource::{
    AgentResource, ApplicationResource, CollectionResource, CreationParams, Resource,
    ResourceDescriptor, RunResource, WorkspaceAgentResource,
};
pub use settings::CollectionSettings;
