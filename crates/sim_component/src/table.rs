//! Per-kind component tables.
//!
//! The store keeps one [`ComponentTable`] per component tag. A table maps
//! entities to type-erased component values and remembers the
//! [`ComponentMeta`] of the kind it was created for.
//!
//! Rows are kept in an [`IndexMap`] so that iteration order is deterministic
//! for a given sequence of mutations. Removal uses `swap_remove`, which keeps
//! removal O(1) at the cost of moving the last row into the hole.

use std::any::Any;

use indexmap::IndexMap;
use tracing::error;

use crate::component::{Component, ComponentMeta, ErasedComponent};
use crate::entity::Entity;

/// All components of a single kind, keyed by entity.
#[derive(Debug)]
pub struct ComponentTable {
    meta: ComponentMeta,
    rows: IndexMap<Entity, ErasedComponent>,
}

impl ComponentTable {
    /// Create an empty table for the kind described by `meta`.
    #[must_use]
    pub fn new(meta: ComponentMeta) -> Self {
        Self {
            meta,
            rows: IndexMap::new(),
        }
    }

    /// Create an empty table for component type `T`.
    #[must_use]
    pub fn for_type<T: Component>() -> Self {
        Self::new(T::meta())
    }

    /// Metadata of the kind stored here.
    #[must_use]
    pub fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    /// Number of entities holding this kind.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no entity holds this kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` if `entity` has a row in this table.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.rows.contains_key(&entity)
    }

    /// Typed read access. `None` if absent or if `T` is not this table's kind.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.rows.get(&entity)?.downcast_ref::<T>()
    }

    /// Typed write access. `None` if absent or if `T` is not this table's kind.
    #[must_use]
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.rows.get_mut(&entity)?.downcast_mut::<T>()
    }

    /// Erased read access, used by the snapshot walker.
    #[must_use]
    pub fn get_erased(&self, entity: Entity) -> Option<&(dyn Any + Send + Sync)> {
        self.rows.get(&entity).map(|value| &**value)
    }

    /// File `value` for `entity`, returning the component it replaced.
    ///
    /// `T` must be the kind this table was created for. A different Rust type
    /// claiming the same tag is a caller bug: debug builds panic, release
    /// builds log and drop the insert so the table stays homogeneous.
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Option<T> {
        if !self.holds_kind::<T>(entity, "insert") {
            return None;
        }

        self.rows
            .insert(entity, Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// Remove and return `entity`'s row as a `T`.
    ///
    /// Same collision rule as [`insert`](Self::insert): asking for a `T`
    /// that only shares this table's tag never touches the row.
    pub fn take<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.holds_kind::<T>(entity, "remove") {
            return None;
        }
        self.rows
            .swap_remove(&entity)
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Remove the row for `entity`, returning the erased value if present.
    pub fn remove(&mut self, entity: Entity) -> Option<ErasedComponent> {
        self.rows.swap_remove(&entity)
    }

    /// `true` if `T` is this table's kind. Otherwise fails fast in debug
    /// builds and logs in release.
    fn holds_kind<T: Component>(&self, entity: Entity, op: &'static str) -> bool {
        if self.meta.is::<T>() {
            return true;
        }
        debug_assert!(
            false,
            "component tag '{}' is claimed by both {} and {}",
            self.meta.name,
            self.meta.rust_type_name,
            std::any::type_name::<T>()
        );
        error!(
            tag = self.meta.name,
            table_type = self.meta.rust_type_name,
            requested_type = std::any::type_name::<T>(),
            %entity,
            op,
            "component tag collision, operation dropped"
        );
        false
    }

    /// Iterate the entities in this table in row order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.rows.keys().copied()
    }

    /// Serialise the row for `entity` with this kind's erased serializer.
    ///
    /// `None` if the entity has no row here.
    #[must_use]
    pub fn serialize_row(&self, entity: Entity) -> Option<Result<Vec<u8>, rmp_serde::encode::Error>> {
        self.get_erased(entity)
            .map(|value| (self.meta.serialize_fn)(value))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    struct Heat(f32);

    impl Component for Heat {
        fn type_name() -> &'static str {
            "heat"
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    struct Impostor(u8);

    impl Component for Impostor {
        fn type_name() -> &'static str {
            "heat"
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = ComponentTable::for_type::<Heat>();
        assert!(table.is_empty());
        assert_eq!(table.insert(Entity(1), Heat(3.0)), None);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get::<Heat>(Entity(1)), Some(&Heat(3.0)));
        assert_eq!(table.get::<Heat>(Entity(2)), None);
    }

    #[test]
    fn test_insert_returns_replaced_value() {
        let mut table = ComponentTable::for_type::<Heat>();
        table.insert(Entity(1), Heat(1.0));
        assert_eq!(table.insert(Entity(1), Heat(5.0)), Some(Heat(1.0)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get::<Heat>(Entity(1)), Some(&Heat(5.0)));
    }

    #[test]
    fn test_get_mut_edits_in_place() {
        let mut table = ComponentTable::for_type::<Heat>();
        table.insert(Entity(7), Heat(1.0));
        if let Some(heat) = table.get_mut::<Heat>(Entity(7)) {
            heat.0 += 1.5;
        }
        assert_eq!(table.get::<Heat>(Entity(7)), Some(&Heat(2.5)));
    }

    #[test]
    fn test_remove_keeps_other_rows() {
        let mut table = ComponentTable::for_type::<Heat>();
        for id in 1..=4 {
            table.insert(Entity(id), Heat(id as f32));
        }
        assert!(table.remove(Entity(2)).is_some());
        assert!(table.remove(Entity(2)).is_none());

        let mut remaining: Vec<_> = table.entities().collect();
        remaining.sort();
        assert_eq!(remaining, vec![Entity(1), Entity(3), Entity(4)]);
    }

    #[test]
    fn test_serialize_row() {
        let mut table = ComponentTable::for_type::<Heat>();
        table.insert(Entity(1), Heat(9.0));
        let bytes = table.serialize_row(Entity(1)).unwrap().unwrap();
        let restored: Heat = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(restored, Heat(9.0));
        assert!(table.serialize_row(Entity(2)).is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "claimed by both")]
    fn test_tag_collision_fails_fast_in_debug() {
        let mut table = ComponentTable::for_type::<Heat>();
        table.insert(Entity(1), Impostor(1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "claimed by both")]
    fn test_take_with_colliding_type_fails_fast_in_debug() {
        let mut table = ComponentTable::for_type::<Heat>();
        table.insert(Entity(1), Heat(3.0));
        let _ = table.take::<Impostor>(Entity(1));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_take_with_colliding_type_keeps_row() {
        let mut table = ComponentTable::for_type::<Heat>();
        table.insert(Entity(1), Heat(3.0));
        assert_eq!(table.take::<Impostor>(Entity(1)), None);
        assert_eq!(table.get::<Heat>(Entity(1)), Some(&Heat(3.0)));
    }

    #[test]
    fn test_take_returns_typed_value() {
        let mut table = ComponentTable::for_type::<Heat>();
        table.insert(Entity(1), Heat(3.0));
        assert_eq!(table.take::<Heat>(Entity(1)), Some(Heat(3.0)));
        assert_eq!(table.take::<Heat>(Entity(1)), None);
        assert!(table.is_empty());
    }
}
