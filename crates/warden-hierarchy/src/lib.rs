//! # Warden Hierarchy - Resource Lifecycle
//!
//! **Purpose**: Create and delete resources while keeping the artifact
//! hierarchy consistent, and expose the access-controlled surface services
//! call into.
//!
//! # Architecture Constraints
//!
//! - YES Parent verification and repair during creation
//! - YES Tenant provisioning for resources that introduce a tenant scope
//! - YES Row teardown before deleting resources that own vector data
//! - YES Descendant artifacts deleted before their parents
//! - YES One gateway combining checks, creation, edits and deletion
//! - NO grant evaluation logic (that's `warden-authorization`)
//!
//! ## Resource states
//!
//! ```text
//! absent ──create──▶ ready
//!   ▲                  │
//!   └──────delete──────┘
//! parent-missing ──create (self-healing kinds)──▶ ready
//! parent-missing ──create (other kinds)──▶ ResourceNotFound
//! ```

#![forbid(unsafe_code)]

/// Resource creation, repair and deletion
pub mod manager;

/// Access-controlled entry points
pub mod gateway;

pub use gateway::ResourceGateway;
pub use manager::HierarchyManager;
