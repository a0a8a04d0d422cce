//! # Warden Store - Store Orchestration
//!
//! **Purpose**: Wrap the external artifact store and vector store with the
//! idempotency and not-found handling every higher layer relies on.
//!
//! # Architecture Constraints
//!
//! **Depends only on warden-core.**
//! - YES Idempotent create, best-effort delete, existence-checked edit
//! - YES Tenant provisioning for multi-tenant collections
//! - NO permission decisions (that's `warden-authorization`)
//! - NO parent repair (that's `warden-hierarchy`)

#![forbid(unsafe_code)]

/// Idempotent artifact CRUD
pub mod repository;

/// Tenant provisioning
pub mod tenants;

pub use repository::ArtifactRepository;
pub use tenants::TenantProvisioner;
