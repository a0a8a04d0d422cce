//! In-memory vector store
//!
//! Tracks collections by storage name, their tenants and a flat list of rows
//! tagged with tenant and application id. Only the metadata needed by
//! provisioning and teardown is modelled; there are no vectors.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use warden_core::{
    CollectionSettings, DeleteManyOutcome, StoreError, Tenant, TenantScope,
    VectorCollectionConfig, VectorStoreEffects,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    tenant: Option<String>,
    application_id: String,
}

#[derive(Debug)]
struct Collection {
    settings: CollectionSettings,
    tenants: BTreeSet<String>,
    rows: Vec<Row>,
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, Collection>,
    racing_tenants: HashSet<String>,
    config_reads: usize,
    tenant_creates: usize,
}

/// Shared in-memory vector store; clones observe the same state
#[derive(Debug, Clone, Default)]
pub struct MockVectorStore {
    state: Arc<Mutex<State>>,
}

impl MockVectorStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a collection. `class` may be a short or storage name.
    pub fn with_collection(self, settings: CollectionSettings) -> Self {
        self.insert_collection(settings);
        self
    }

    /// Seed a collection on an existing handle
    pub fn insert_collection(&self, settings: CollectionSettings) {
        let settings = settings
            .with_full_name()
            .unwrap_or_else(|_| settings.clone());
        self.state().collections.insert(
            settings.class().to_string(),
            Collection {
                settings,
                tenants: BTreeSet::new(),
                rows: Vec::new(),
            },
        );
    }

    /// Add `count` rows tagged with `application_id` to a collection
    pub fn insert_rows(
        &self,
        collection: &str,
        tenant: Option<&str>,
        application_id: &str,
        count: usize,
    ) {
        if let Some(c) = self.state().collections.get_mut(collection) {
            c.rows.extend((0..count).map(|_| Row {
                tenant: tenant.map(str::to_string),
                application_id: application_id.to_string(),
            }));
        }
    }

    /// Rows tagged with `application_id` in a tenant (or the shared rows)
    pub fn row_count(&self, collection: &str, tenant: Option<&str>, application_id: &str) -> usize {
        self.state()
            .collections
            .get(collection)
            .map(|c| {
                c.rows
                    .iter()
                    .filter(|r| r.tenant.as_deref() == tenant && r.application_id == application_id)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Tenant names of a collection, sorted
    pub fn tenants(&self, collection: &str) -> Vec<String> {
        self.state()
            .collections
            .get(collection)
            .map(|c| c.tenants.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a collection is stored (synchronous helper for assertions)
    pub fn has_collection(&self, collection: &str) -> bool {
        self.state().collections.contains_key(collection)
    }

    /// Stored settings of a collection
    pub fn settings(&self, collection: &str) -> Option<CollectionSettings> {
        self.state()
            .collections
            .get(collection)
            .map(|c| c.settings.clone())
    }

    /// Have a concurrent writer create the requested tenants just before the
    /// next `create_tenants` call on `collection`
    pub fn race_next_tenant_create(&self, collection: impl Into<String>) {
        self.state().racing_tenants.insert(collection.into());
    }

    /// `collection_config` calls received
    pub fn config_reads(&self) -> usize {
        self.state().config_reads
    }

    /// `create_tenants` calls received
    pub fn tenant_creates(&self) -> usize {
        self.state().tenant_creates
    }
}

#[async_trait]
impl VectorStoreEffects for MockVectorStore {
    async fn collection_config(&self, collection: &str) -> Result<VectorCollectionConfig, StoreError> {
        let mut state = self.state();
        state.config_reads += 1;
        let c = state
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::not_found(collection))?;
        Ok(VectorCollectionConfig {
            multi_tenancy_enabled: c.settings.multi_tenancy_enabled(),
            settings: c.settings.clone(),
        })
    }

    async fn tenant_by_name(&self, collection: &str, name: &str) -> Result<Option<Tenant>, StoreError> {
        let state = self.state();
        let c = state
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::not_found(collection))?;
        Ok(c.tenants.get(name).map(|t| Tenant::new(t.clone())))
    }

    async fn create_tenants(&self, collection: &str, tenants: Vec<Tenant>) -> Result<(), StoreError> {
        let mut state = self.state();
        state.tenant_creates += 1;
        let racing = state.racing_tenants.remove(collection);
        let c = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection))?;
        if !c.settings.multi_tenancy_enabled() {
            return Err(StoreError::transport(format!(
                "multi-tenancy is disabled for {collection}"
            )));
        }
        if racing {
            c.tenants.extend(tenants.iter().map(|t| t.name.clone()));
        }
        if let Some(existing) = tenants.iter().find(|t| c.tenants.contains(&t.name)) {
            return Err(StoreError::already_exists(existing.name.clone()));
        }
        c.tenants.extend(tenants.into_iter().map(|t| t.name));
        Ok(())
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool, StoreError> {
        Ok(self.state().collections.contains_key(collection))
    }

    async fn create_collection(
        &self,
        settings: CollectionSettings,
    ) -> Result<CollectionSettings, StoreError> {
        let mut state = self.state();
        let name = settings.class().to_string();
        if state.collections.contains_key(&name) {
            return Err(StoreError::already_exists(name));
        }
        state.collections.insert(
            name,
            Collection {
                settings: settings.clone(),
                tenants: BTreeSet::new(),
                rows: Vec::new(),
            },
        );
        Ok(settings)
    }

    async fn delete_collections(&self, collections: &[String]) -> Result<(), StoreError> {
        let mut state = self.state();
        for name in collections {
            state.collections.remove(name);
        }
        Ok(())
    }

    async fn delete_many(
        &self,
        scope: &TenantScope,
        application_id: &str,
    ) -> Result<DeleteManyOutcome, StoreError> {
        let mut state = self.state();
        let c = state
            .collections
            .get_mut(scope.collection())
            .ok_or_else(|| StoreError::not_found(scope.collection()))?;
        let before = c.rows.len();
        c.rows.retain(|r| {
            !(r.tenant.as_deref() == scope.tenant() && r.application_id == application_id)
        });
        let removed = (before - c.rows.len()) as u64;
        Ok(DeleteManyOutcome {
            matches: removed,
            successful: removed,
            failed: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::movie_settings;
    use assert_matches::assert_matches;

    const MOVIE: &str = "Shared__DELIM__Movie";

    #[tokio::test]
    async fn seeded_collections_use_storage_names() {
        let store = MockVectorStore::new().with_collection(movie_settings(true));
        assert!(store.collection_exists(MOVIE).await.unwrap());
        assert!(store.collection_config(MOVIE).await.unwrap().multi_tenancy_enabled);
        assert_eq!(store.config_reads(), 1);
    }

    #[tokio::test]
    async fn tenants_are_unique_and_need_multi_tenancy() {
        let store = MockVectorStore::new().with_collection(movie_settings(true));
        store.create_tenants(MOVIE, vec![Tenant::new("ws")]).await.unwrap();
        assert_matches!(
            store.create_tenants(MOVIE, vec![Tenant::new("ws")]).await,
            Err(StoreError::AlreadyExists { .. })
        );

        let flat = MockVectorStore::new().with_collection(movie_settings(false));
        assert_matches!(
            flat.create_tenants(MOVIE, vec![Tenant::new("ws")]).await,
            Err(StoreError::Transport { .. })
        );
    }

    #[tokio::test]
    async fn delete_many_filters_by_scope_and_application() {
        let store = MockVectorStore::new().with_collection(movie_settings(true));
        store.insert_rows(MOVIE, Some("ws"), "app", 3);
        store.insert_rows(MOVIE, Some("ws"), "other", 2);
        store.insert_rows(MOVIE, Some("ws-2"), "app", 1);

        let scope = TenantScope::Tenant {
            collection: MOVIE.to_string(),
            tenant: "ws".to_string(),
        };
        let outcome = store.delete_many(&scope, "app").await.unwrap();
        assert_eq!(outcome.successful, 3);
        assert_eq!(store.row_count(MOVIE, Some("ws"), "other"), 2);
        assert_eq!(store.row_count(MOVIE, Some("ws-2"), "app"), 1);
    }
}
