//! The entity-component store.
//!
//! [`Store`] owns entity identity and every component in the world. Systems
//! find their working set through [`Store::entities_with_components`], whose
//! results are memoised in a query cache.
//!
//! ## Cache invalidation
//!
//! The cache is invalidate-all-on-any-write. Every structural mutation (adding
//! a component, removing a component that was present, removing an entity that
//! had something to strip) bumps a version counter; a cache entry is served
//! only while its recorded version equals the current one. Editing component
//! fields in place through [`Store::get_component_mut`] does not change which
//! entities match a query and therefore does not bump the version.
//!
//! ## Absence is not an error
//!
//! Systems routinely touch entities that an earlier system removed in the
//! same tick. Every lookup therefore degrades to `None`, `false`, or an empty
//! result instead of failing.
//!
//! ## Threading
//!
//! The cache is read through interior mutability, so a `Store` is `Send` but
//! not `Sync`: one tick phase at a time holds it.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::trace;

use crate::component::{Component, ComponentTypeId};
use crate::entity::{Entity, EntityAllocator};
use crate::query::QueryKey;
use crate::table::ComponentTable;

/// A memoised query result together with the store version it was computed at.
#[derive(Debug)]
struct CachedQuery {
    version: u64,
    entities: Arc<[Entity]>,
}

/// Query cache counters, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCacheStats {
    /// Queries answered from a valid cache entry.
    pub hits: u64,
    /// Queries that had to be recomputed.
    pub misses: u64,
    /// Cache entries that are valid at the current version.
    pub cached_queries: usize,
    /// The store's current mutation version.
    pub version: u64,
}

/// Entity identity, per-kind component tables, and the query cache.
#[derive(Debug)]
pub struct Store {
    /// Entity ID allocator.
    allocator: EntityAllocator,
    /// Live entities. IDs are strictly increasing, so ascending order is
    /// creation order.
    entities: BTreeSet<Entity>,
    /// One table per component tag.
    tables: HashMap<ComponentTypeId, ComponentTable>,
    /// Bumped on every structural mutation.
    version: u64,
    cache: RefCell<HashMap<QueryKey, CachedQuery>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
    /// Shared empty result, handed out without allocating.
    empty: Arc<[Entity]>,
}

impl Store {
    /// Create an empty store with its own ID space starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(EntityAllocator::new())
    }

    /// Create an empty store that draws IDs from `allocator`.
    #[must_use]
    pub fn with_allocator(allocator: EntityAllocator) -> Self {
        Self {
            allocator,
            entities: BTreeSet::new(),
            tables: HashMap::new(),
            version: 0,
            cache: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
            empty: Arc::from(Vec::new()),
        }
    }

    /// The allocator this store draws IDs from.
    #[must_use]
    pub fn allocator(&self) -> &EntityAllocator {
        &self.allocator
    }

    // -- Entity lifecycle --

    /// Allocate a new, never-before-used entity.
    ///
    /// # Panics
    ///
    /// Panics if the id space is exhausted (see [`EntityAllocator::allocate`]).
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.entities.insert(entity);
        entity
    }

    /// Remove an entity and every component filed under it.
    ///
    /// Unknown IDs are a no-op. Returns `true` if anything was removed.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        let was_live = self.entities.remove(&entity);
        let mut stripped = 0usize;
        for table in self.tables.values_mut() {
            if table.remove(entity).is_some() {
                stripped += 1;
            }
        }

        let changed = was_live || stripped > 0;
        if changed {
            self.invalidate();
            trace!(%entity, stripped, "removed entity");
        }
        changed
    }

    /// Returns `true` if `entity` was created and not yet removed.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Snapshot of every live entity, in creation order.
    #[must_use]
    pub fn all_entities(&self) -> Vec<Entity> {
        self.entities.iter().copied().collect()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -- Component operations --

    /// File `component` under `entity`, replacing any component of the same
    /// kind. Returns the replaced component.
    ///
    /// The entity is not required to be live.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        let previous = self
            .tables
            .entry(T::component_type_id())
            .or_insert_with(ComponentTable::for_type::<T>)
            .insert(entity, component);
        self.invalidate();
        previous
    }

    /// Typed read access to one component.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.tables.get(&T::component_type_id())?.get(entity)
    }

    /// Typed write access to one component. Field edits are not structural
    /// and leave cached query results valid.
    #[must_use]
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.tables.get_mut(&T::component_type_id())?.get_mut(entity)
    }

    /// Returns `true` if `entity` holds a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.has_component_id(entity, T::component_type_id())
    }

    /// Returns `true` if `entity` holds a component of kind `type_id`.
    #[must_use]
    pub fn has_component_id(&self, entity: Entity, type_id: ComponentTypeId) -> bool {
        self.tables
            .get(&type_id)
            .is_some_and(|table| table.contains(entity))
    }

    /// Remove `entity`'s `T`, returning it if present.
    ///
    /// A `T` that merely shares its tag with the stored kind is a caller bug
    /// and leaves the stored component in place.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let removed = self.tables.get_mut(&T::component_type_id())?.take::<T>(entity)?;
        self.invalidate();
        Some(removed)
    }

    /// Remove `entity`'s component of kind `type_id`. Returns `true` if one
    /// was present.
    pub fn remove_component_id(&mut self, entity: Entity, type_id: ComponentTypeId) -> bool {
        let removed = self
            .tables
            .get_mut(&type_id)
            .and_then(|table| table.remove(entity))
            .is_some();
        if removed {
            self.invalidate();
        }
        removed
    }

    /// The kinds currently attached to `entity`, in ascending id order.
    #[must_use]
    pub fn component_types_of(&self, entity: Entity) -> Vec<ComponentTypeId> {
        let mut types: Vec<_> = self
            .tables
            .iter()
            .filter(|(_, table)| table.contains(entity))
            .map(|(&type_id, _)| type_id)
            .collect();
        types.sort_unstable();
        types
    }

    /// Number of entities holding kind `type_id`.
    #[must_use]
    pub fn holder_count(&self, type_id: ComponentTypeId) -> usize {
        self.tables.get(&type_id).map_or(0, ComponentTable::len)
    }

    // -- Queries --

    /// Every entity holding a `T`.
    #[must_use]
    pub fn entities_with<T: Component>(&self) -> Arc<[Entity]> {
        self.entities_with_component(T::component_type_id())
    }

    /// Every entity holding a component of kind `type_id`.
    ///
    /// Served from the cache while it is valid for this kind.
    #[must_use]
    pub fn entities_with_component(&self, type_id: ComponentTypeId) -> Arc<[Entity]> {
        self.cached(QueryKey::single(type_id), || match self.tables.get(&type_id) {
            Some(table) if !table.is_empty() => table.entities().collect(),
            _ => self.empty.clone(),
        })
    }

    /// Every entity holding all of the listed kinds.
    ///
    /// - no kinds: empty;
    /// - one distinct kind: same as [`entities_with_component`](Self::entities_with_component),
    ///   sharing its cache entry;
    /// - any kind with no holders: empty, without allocating;
    /// - otherwise the smallest table is scanned and each of its entities is
    ///   checked against the others.
    ///
    /// Result order follows the scanned table and is not sorted by ID.
    #[must_use]
    pub fn entities_with_components(&self, types: &[ComponentTypeId]) -> Arc<[Entity]> {
        if types.is_empty() {
            return self.empty.clone();
        }
        if types.iter().any(|&type_id| self.holder_count(type_id) == 0) {
            return self.empty.clone();
        }

        let key = QueryKey::new(types);
        if let [single] = key.types() {
            return self.entities_with_component(*single);
        }

        let types = key.types().to_vec();
        self.cached(key, || {
            let mut tables: Vec<&ComponentTable> = types
                .iter()
                .filter_map(|type_id| self.tables.get(type_id))
                .collect();
            tables.sort_by_key(|table| table.len());

            match tables.split_first() {
                Some((smallest, rest)) => smallest
                    .entities()
                    .filter(|&entity| rest.iter().all(|table| table.contains(entity)))
                    .collect(),
                None => self.empty.clone(),
            }
        })
    }

    // -- Cache --

    /// The current mutation version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Cache hit/miss counters and the number of valid entries.
    #[must_use]
    pub fn cache_stats(&self) -> QueryCacheStats {
        let cached_queries = self
            .cache
            .borrow()
            .values()
            .filter(|entry| entry.version == self.version)
            .count();
        QueryCacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            cached_queries,
            version: self.version,
        }
    }

    /// Drop every cache entry. Observationally a no-op: the next query of
    /// each kind is simply recomputed.
    pub fn clear_query_cache(&mut self) {
        self.cache.get_mut().clear();
    }

    fn invalidate(&mut self) {
        self.version += 1;
    }

    fn cached(&self, key: QueryKey, compute: impl FnOnce() -> Arc<[Entity]>) -> Arc<[Entity]> {
        if let Some(entry) = self.cache.borrow().get(&key)
            && entry.version == self.version
        {
            self.hits.set(self.hits.get() + 1);
            return Arc::clone(&entry.entities);
        }

        self.misses.set(self.misses.get() + 1);
        let entities = compute();
        trace!(query = %key, version = self.version, len = entities.len(), "query cache miss");
        self.cache.borrow_mut().insert(
            key,
            CachedQuery {
                version: self.version,
                entities: Arc::clone(&entities),
            },
        );
        entities
    }

    // -- Crate-internal access for snapshots --

    pub(crate) fn tables(&self) -> impl Iterator<Item = &ComponentTable> {
        self.tables.values()
    }

    /// Mark `entity` live with its existing ID, keeping the allocator ahead
    /// of it.
    pub(crate) fn adopt_entity(&mut self, entity: Entity) -> bool {
        self.allocator.reserve(entity);
        self.entities.insert(entity)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
