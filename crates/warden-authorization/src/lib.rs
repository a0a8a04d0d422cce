//! # Warden Authorization - Permission Decisions
//!
//! **Purpose**: Resolve a workspace's grant on a resource, decide whether it
//! covers a requested operation, and edit stored grants.
//!
//! # Architecture Constraints
//!
//! - YES Admin bypass from an injected allow-list
//! - YES Fail-closed grant resolution (read failures deny)
//! - YES Conjunctive checks over several resources
//! - YES Merge or replace edits of stored permission maps, gated on `rw+`
//! - NO resource creation or repair (that's `warden-hierarchy`)
//!
//! Production code should call [`PermissionChecker::require_permission`];
//! [`PermissionChecker::has_permission`] is for advisory checks such as
//! deciding what to display.

#![forbid(unsafe_code)]

/// Grant resolution and permission checks
pub mod checker;

/// Permission map editing
pub mod editor;

pub use checker::PermissionChecker;
pub use editor::PermissionEditor;
