//! Query keys for the store's result cache.
//!
//! A [`QueryKey`] is the canonical form of a multi-component query: the set
//! of requested [`ComponentTypeId`]s, sorted and deduplicated. Two calls that
//! name the same kinds in a different order, or repeat a kind, share a key and
//! therefore a cache entry.

use std::fmt;

use crate::component::ComponentTypeId;

/// Canonical, order-independent identity of a component query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Box<[ComponentTypeId]>);

impl QueryKey {
    /// Build the canonical key for the given component kinds.
    #[must_use]
    pub fn new(types: &[ComponentTypeId]) -> Self {
        let mut sorted = types.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Self(sorted.into_boxed_slice())
    }

    /// Key of a single-kind query.
    #[must_use]
    pub fn single(type_id: ComponentTypeId) -> Self {
        Self(Box::new([type_id]))
    }

    /// The distinct kinds in this key, in ascending id order.
    #[must_use]
    pub fn types(&self) -> &[ComponentTypeId] {
        &self.0
    }

    /// Number of distinct kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty query.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, type_id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{type_id}")?;
        }
        Ok(())
    }
}

/// Expands to an array of [`ComponentTypeId`]s for the listed component types.
///
/// ```rust
/// # use serde::{Serialize, Deserialize};
/// # use sim_component::{component_types, Component, Store};
/// # #[derive(Serialize, Deserialize)] struct A;
/// # impl Component for A { fn type_name() -> &'static str { "a" } }
/// # #[derive(Serialize, Deserialize)] struct B;
/// # impl Component for B { fn type_name() -> &'static str { "b" } }
/// let store = Store::new();
/// let both = store.entities_with_components(&component_types![A, B]);
/// assert!(both.is_empty());
/// ```
#[macro_export]
macro_rules! component_types {
    ($($ty:ty),* $(,)?) => {
        [$(<$ty as $crate::Component>::component_type_id()),*]
    };
}
