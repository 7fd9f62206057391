//! Entity identity.
//!
//! IDs come from an [`EntityAllocator`] owned by the [`Store`](crate::Store)
//! that hands them out, so separate simulations never share id space and
//! nothing global has to be reset between runs.

use serde::{Deserialize, Serialize};

/// Opaque handle naming one simulated thing.
///
/// Ordering follows allocation order: a smaller id was created earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(pub u64);

impl Entity {
    /// Never returned by an allocator.
    pub const INVALID: Entity = Entity(0);
    /// Past the end of the id space; also never returned.
    pub const END: Entity = Entity(u64::MAX);

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0 && self.0 != Self::END.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source. An id is handed out at most once; removing the
/// entity does not return it to the pool.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    cursor: u64,
}

impl EntityAllocator {
    /// First id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Resume a sequence whose ids below `first` are already spoken for.
    /// `first` is raised to 1 if needed.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            cursor: first.max(1),
        }
    }

    /// # Panics
    ///
    /// Panics once every id below [`Entity::END`] has been handed out.
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.cursor);
        match self.cursor.checked_add(1) {
            Some(next) if entity.is_valid() => self.cursor = next,
            _ => panic!("entity id space exhausted"),
        }
        entity
    }

    /// Push the cursor past `entity`. Never moves it backwards.
    ///
    /// Returns `false`, leaving the cursor alone, for ids no allocator
    /// could have issued.
    pub fn reserve(&mut self, entity: Entity) -> bool {
        if entity.is_valid()
            && let Some(next) = entity.0.checked_add(1)
        {
            self.cursor = self.cursor.max(next);
            return true;
        }
        false
    }

    /// What [`allocate`](Self::allocate) would return next.
    #[must_use]
    pub fn peek_next(&self) -> Entity {
        Entity(self.cursor)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
