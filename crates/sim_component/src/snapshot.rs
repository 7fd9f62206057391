//! World snapshots for an external save/load layer.
//!
//! [`Store::snapshot`] walks every live entity and every component attached
//! to it, serialising each component to MessagePack with the serializer its
//! table captured. [`Store::restore`] rebuilds a store with the same entity
//! IDs and hands each record back to the caller, who decides which Rust type
//! a tag decodes into.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::{Component, ComponentTypeId};
use crate::entity::{Entity, EntityAllocator};
use crate::error::SnapshotError;
use crate::store::Store;

/// One serialised component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Tag-derived kind identifier.
    pub type_id: ComponentTypeId,
    /// The component's tag.
    pub name: String,
    /// MessagePack-encoded component bytes.
    pub data: Vec<u8>,
}

impl ComponentRecord {
    /// Decode this record as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::TagMismatch`] if the record was written for a
    /// different tag, or [`SnapshotError::Decode`] if the bytes do not decode.
    pub fn decode<T: Component>(&self) -> Result<T, SnapshotError> {
        if self.type_id != T::component_type_id() {
            return Err(SnapshotError::TagMismatch {
                expected: T::type_name(),
                found: self.name.clone(),
            });
        }
        Ok(rmp_serde::from_slice(&self.data)?)
    }
}

/// All components of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// The entity's ID.
    pub entity: Entity,
    /// Its components, in ascending kind-id order.
    pub components: Vec<ComponentRecord>,
}

/// The full contents of a [`Store`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// The ID the store would have allocated next.
    pub next_entity: u64,
    /// Live entities in creation order.
    pub entities: Vec<EntitySnapshot>,
}

/// Encode a snapshot to MessagePack bytes.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if serialisation fails.
pub fn encode(snapshot: &WorldSnapshot) -> Result<Vec<u8>, SnapshotError> {
    Ok(rmp_serde::to_vec_named(snapshot)?)
}

/// Decode a snapshot from MessagePack bytes.
///
/// # Errors
///
/// Returns [`SnapshotError::Decode`] if deserialisation fails.
pub fn decode(bytes: &[u8]) -> Result<WorldSnapshot, SnapshotError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

impl Store {
    /// Capture every live entity and its components.
    ///
    /// Components filed under IDs that were never created (or were removed)
    /// are not live and are left out.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Encode`] if a component fails to serialise.
    pub fn snapshot(&self) -> Result<WorldSnapshot, SnapshotError> {
        let mut tables: Vec<_> = self.tables().collect();
        tables.sort_by_key(|table| table.meta().type_id);

        let mut entities = Vec::with_capacity(self.entity_count());
        for entity in self.all_entities() {
            let mut components = Vec::new();
            for table in &tables {
                if let Some(bytes) = table.serialize_row(entity) {
                    components.push(ComponentRecord {
                        type_id: table.meta().type_id,
                        name: table.meta().name.to_string(),
                        data: bytes?,
                    });
                }
            }
            entities.push(EntitySnapshot { entity, components });
        }

        debug!(entities = entities.len(), "captured world snapshot");
        Ok(WorldSnapshot {
            next_entity: self.allocator().peek_next().id(),
            entities,
        })
    }

    /// Rebuild a store from a snapshot.
    ///
    /// Every entity keeps its ID and the allocator resumes where the
    /// snapshotted store left off. `apply` is called once per component
    /// record and is expected to decode it and file it with
    /// [`Store::add_component`]; records it does not recognise can simply be
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidEntity`] if an entity id or the
    /// resume cursor is outside the allocatable range, and propagates the
    /// first error returned by `apply`.
    pub fn restore<F>(snapshot: &WorldSnapshot, mut apply: F) -> Result<Self, SnapshotError>
    where
        F: FnMut(&mut Store, Entity, &ComponentRecord) -> Result<(), SnapshotError>,
    {
        if snapshot.next_entity == Entity::END.id() {
            return Err(SnapshotError::InvalidEntity(snapshot.next_entity));
        }
        let mut store = Store::with_allocator(EntityAllocator::starting_at(snapshot.next_entity));
        for entry in &snapshot.entities {
            if !entry.entity.is_valid() {
                return Err(SnapshotError::InvalidEntity(entry.entity.id()));
            }
            store.adopt_entity(entry.entity);
            for record in &entry.components {
                apply(&mut store, entry.entity, record)?;
            }
        }

        debug!(
            entities = store.entity_count(),
            next_entity = store.allocator().peek_next().id(),
            "restored world snapshot"
        );
        Ok(store)
    }
}
