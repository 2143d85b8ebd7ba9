// Repository - CRUD over the store document
//
// Every call loads the whole document from the backend; mutations save the
// whole document before returning. A single lock spans each load/modify/save
// cycle, so two requests in this process can never overwrite each other's
// changes. Nothing is cached between calls.

use crate::backend::{JsonFileBackend, StorageBackend};
use crate::error::StoreResult;
use crate::ids::{assign_id, IdPolicy, RandomIds};
use crate::lookup::LookupStrategy;
use crate::stats::DashboardStats;
use crate::store::{Entity, EntityKind, Store};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub struct Repository {
    backend: Arc<dyn StorageBackend>,
    ids: Arc<dyn IdPolicy>,
    lock: Mutex<()>,
}

impl Repository {
    pub fn new(backend: Arc<dyn StorageBackend>, ids: Arc<dyn IdPolicy>) -> Self {
        Repository {
            backend,
            ids,
            lock: Mutex::new(()),
        }
    }

    /// File-backed repository with random ids
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonFileBackend::new(path)), Arc::new(RandomIds))
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Full document, degrading to the empty store if unreadable
    pub fn load(&self) -> StoreResult<Store> {
        let _guard = self.lock.lock();
        self.backend.load()
    }

    /// Runs `f` against a freshly loaded document and saves it afterwards when
    /// `f` reports a change
    fn mutate<T>(&self, f: impl FnOnce(&mut Store) -> (T, bool)) -> StoreResult<T> {
        let _guard = self.lock.lock();
        let mut store = self.backend.load()?;
        let (result, changed) = f(&mut store);
        if changed {
            self.backend.save(&store)?;
        }
        Ok(result)
    }

    // ========================================================================
    // GENERIC OPERATIONS
    // ========================================================================

    pub fn list(&self, kind: EntityKind) -> StoreResult<Vec<Entity>> {
        Ok(self.load()?.collection(kind).clone())
    }

    pub fn find(&self, kind: EntityKind, identifier: &str) -> StoreResult<Option<Entity>> {
        let store = self.load()?;
        Ok(LookupStrategy::for_kind(kind)
            .find(store.collection(kind), identifier)
            .cloned())
    }

    /// Append as given and return it unchanged
    pub fn add(&self, kind: EntityKind, entity: Entity) -> StoreResult<Entity> {
        let stored = self.mutate(|store| {
            store.collection_mut(kind).push(entity.clone());
            (entity, true)
        })?;
        debug!(collection = kind.collection_name(), id = ?stored.id(), "entity added");
        Ok(stored)
    }

    /// Give `payload` an id when it lacks one, then append it
    pub fn create(&self, kind: EntityKind, payload: Entity) -> StoreResult<Entity> {
        let entity = assign_id(kind, payload, self.ids.as_ref());
        self.add(kind, entity)
    }

    /// Shallow-merge `patch` into the first entity the identifier selects
    pub fn update(
        &self,
        kind: EntityKind,
        identifier: &str,
        patch: &Entity,
    ) -> StoreResult<Option<Entity>> {
        let strategy = LookupStrategy::for_kind(kind);
        let updated = self.mutate(|store| {
            let collection = store.collection_mut(kind);
            match strategy.position(collection, identifier) {
                Some(index) => {
                    collection[index].merge(patch);
                    (Some(collection[index].clone()), true)
                }
                None => (None, false),
            }
        })?;
        debug!(
            collection = kind.collection_name(),
            identifier,
            found = updated.is_some(),
            "entity update"
        );
        Ok(updated)
    }

    /// Remove every entity the identifier selects; true if any was removed
    pub fn delete(&self, kind: EntityKind, identifier: &str) -> StoreResult<bool> {
        let strategy = LookupStrategy::for_kind(kind);
        let removed = self.mutate(|store| {
            let collection = store.collection_mut(kind);
            let before = collection.len();
            collection.retain(|e| !strategy.matches(e, identifier));
            let removed = before - collection.len();
            (removed, removed > 0)
        })?;
        debug!(collection = kind.collection_name(), identifier, removed, "entity delete");
        Ok(removed > 0)
    }

    pub fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        Ok(DashboardStats::compute(&self.load()?))
    }

    // ========================================================================
    // MEMBERS
    // ========================================================================

    pub fn list_members(&self) -> StoreResult<Vec<Entity>> {
        self.list(EntityKind::Member)
    }

    pub fn find_member(&self, identifier: &str) -> StoreResult<Option<Entity>> {
        self.find(EntityKind::Member, identifier)
    }

    pub fn add_member(&self, member: Entity) -> StoreResult<Entity> {
        self.add(EntityKind::Member, member)
    }

    pub fn update_member(&self, identifier: &str, patch: &Entity) -> StoreResult<Option<Entity>> {
        self.update(EntityKind::Member, identifier, patch)
    }

    pub fn delete_member(&self, identifier: &str) -> StoreResult<bool> {
        self.delete(EntityKind::Member, identifier)
    }

    // ========================================================================
    // CLASSES / STAFF / INVOICES
    // ========================================================================

    pub fn list_classes(&self) -> StoreResult<Vec<Entity>> {
        self.list(EntityKind::Class)
    }

    pub fn add_class(&self, class: Entity) -> StoreResult<Entity> {
        self.add(EntityKind::Class, class)
    }

    pub fn list_staff(&self) -> StoreResult<Vec<Entity>> {
        self.list(EntityKind::Staff)
    }

    pub fn add_staff(&self, staff: Entity) -> StoreResult<Entity> {
        self.add(EntityKind::Staff, staff)
    }

    pub fn list_invoices(&self) -> StoreResult<Vec<Entity>> {
        self.list(EntityKind::Invoice)
    }

    pub fn add_invoice(&self, invoice: Entity) -> StoreResult<Entity> {
        self.add(EntityKind::Invoice, invoice)
    }

    pub fn update_invoice(&self, identifier: &str, patch: &Entity) -> StoreResult<Option<Entity>> {
        self.update(EntityKind::Invoice, identifier, patch)
    }
}

// ============================================================================
// TESTS
// ============================================================================
