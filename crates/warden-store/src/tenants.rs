//! Tenant provisioning
//!
//! Whether a collection is multi-tenant is read from the vector store on every
//! call; it is fixed when the collection is created and never cached here.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use warden_core::identity::{full_collection_name, tenant_name};
use warden_core::{StoreError, Tenant, TenantScope, VectorStoreEffects, WardenError, WardenResult};

/// Creates per-workspace tenants on demand
#[derive(Clone)]
pub struct TenantProvisioner {
    vectors: Arc<dyn VectorStoreEffects>,
}

impl fmt::Debug for TenantProvisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantProvisioner").finish_non_exhaustive()
    }
}

impl TenantProvisioner {
    /// Wrap a vector store handle
    pub fn new(vectors: Arc<dyn VectorStoreEffects>) -> Self {
        Self { vectors }
    }

    /// Make sure `workspace` has a tenant in `collection` (caller-facing name)
    /// and return the scope its rows live in.
    ///
    /// Collections without multi-tenancy are left untouched and yield
    /// [`TenantScope::Shared`]. A tenant created concurrently by another caller
    /// counts as success.
    pub async fn ensure_tenant(&self, collection: &str, workspace: &str) -> WardenResult<TenantScope> {
        let scope = self.scope_for(collection, workspace).await?;
        let TenantScope::Tenant { collection, tenant } = &scope else {
            debug!(collection = %scope.collection(), "Multi-tenancy disabled, using shared scope");
            return Ok(scope);
        };

        if self.vectors.tenant_by_name(collection, tenant).await?.is_some() {
            return Ok(scope);
        }
        match self
            .vectors
            .create_tenants(collection, vec![Tenant::new(tenant.clone())])
            .await
        {
            Ok(()) => {
                info!(collection = %collection, tenant = %tenant, "Created tenant");
            }
            Err(StoreError::AlreadyExists { .. }) => {
                debug!(collection = %collection, tenant = %tenant, "Tenant created concurrently");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(scope)
    }

    /// Scope `workspace`'s rows live in, without creating anything
    pub async fn scope_for(&self, collection: &str, workspace: &str) -> WardenResult<TenantScope> {
        let full_name = full_collection_name(collection)?;
        let config = self
            .vectors
            .collection_config(&full_name)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => WardenError::not_found(full_name.clone()),
                other => other.into(),
            })?;
        Ok(if config.multi_tenancy_enabled {
            TenantScope::Tenant {
                collection: full_name,
                tenant: tenant_name(workspace),
            }
        } else {
            TenantScope::Shared {
                collection: full_name,
            }
        })
    }
}
