//! Unified error system for Warden
//!
//! A single error type covers every caller-visible failure. External store
//! failures are reported through [`StoreError`] and wrapped here so callers can
//! still tell transport faults apart from policy outcomes.

use crate::effects::StoreError;
use crate::operation::Operation;

/// Unified error type for all Warden operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WardenError {
    /// Malformed identifier, operation token or settings document
    #[error("Validation error: {message}")]
    Validation {
        /// What was rejected and why
        message: String,
    },

    /// The accessor lacks the requested capability
    #[error("Permission denied for {operation} operation on {resource}")]
    PermissionDenied {
        /// Human-readable description of the resource
        resource: String,
        /// The requested operation
        operation: Operation,
    },

    /// Workspace is not in the admin allow-list
    #[error("Workspace '{workspace}' is not an admin workspace")]
    NotAdmin {
        /// The rejected workspace
        workspace: String,
    },

    /// A required artifact or backing collection is missing
    #[error("Resource not found: {artifact_id}{}", render_hint(.hint))]
    ResourceNotFound {
        /// Id of the missing artifact or collection
        artifact_id: String,
        /// Optional remediation hint
        hint: Option<String>,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Unexpected failure from an external store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WardenError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(resource: impl Into<String>, operation: Operation) -> Self {
        Self::PermissionDenied {
            resource: resource.into(),
            operation,
        }
    }

    /// Create a not-admin error
    pub fn not_admin(workspace: impl Into<String>) -> Self {
        Self::NotAdmin {
            workspace: workspace.into(),
        }
    }

    /// Create a resource not found error
    pub fn not_found(artifact_id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            artifact_id: artifact_id.into(),
            hint: None,
        }
    }

    /// Create a resource not found error with a remediation hint
    pub fn not_found_with_hint(artifact_id: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            artifact_id: artifact_id.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for denial outcomes (`PermissionDenied` and `NotAdmin`)
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. } | Self::NotAdmin { .. })
    }

    /// True when the error reports a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}

fn render_hint(hint: &Option<String>) -> String {
    hint.as_deref()
        .map(|h| format!(" ({h})"))
        .unwrap_or_default()
}

/// Result alias using the unified error type
pub type WardenResult<T> = Result<T, WardenError>;
