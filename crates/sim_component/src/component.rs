//! Core [`Component`] trait and associated metadata.
//!
//! Every piece of data filed in the [`Store`](crate::Store) implements
//! [`Component`]. A component kind is identified by a string tag
//! ([`Component::type_name`]); the tag is hashed into a [`ComponentTypeId`]
//! that keys the per-kind tables and the query cache.
//!
//! ## Tag identity
//!
//! [`ComponentTypeId`] is the FNV-1a 64-bit hash of the tag's UTF-8 bytes.
//! It is deterministic across runs and builds, so it can be written into
//! snapshots and compared later.

use std::any::{Any, TypeId};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Type-erased component value as held by a component table.
pub type ErasedComponent = Box<dyn Any + Send + Sync>;

/// A unique identifier for a component kind, derived from its string tag
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] of a tag.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Metadata about a component kind, captured when its table is created.
///
/// The table keeps this around so it can check incoming values against the
/// kind it was created for and serialise its rows without knowing `T`.
#[derive(Debug, Clone, Copy)]
pub struct ComponentMeta {
    /// The tag-derived identifier.
    pub type_id: ComponentTypeId,
    /// The component's tag (e.g. `"position"`).
    pub name: &'static str,
    /// The Rust type that claimed this tag.
    pub rust_type: TypeId,
    /// The Rust type's name, for diagnostics.
    pub rust_type_name: &'static str,
    /// Serialise one erased instance to MessagePack bytes.
    pub serialize_fn: fn(&(dyn Any + Send + Sync)) -> Result<Vec<u8>, rmp_serde::encode::Error>,
}

impl ComponentMeta {
    /// Returns `true` if this metadata describes the Rust type `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.rust_type == TypeId::of::<T>()
    }
}

/// The core component trait.
///
/// Components are plain data: all behaviour lives in the systems that read
/// and write them. They must be serialisable so a save layer can walk the
/// whole world.
///
/// # Examples
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use sim_component::Component;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Hunger {
///     level: f32,
/// }
///
/// impl Component for Hunger {
///     fn type_name() -> &'static str { "hunger" }
/// }
/// ```
pub trait Component: Send + Sync + 'static + Serialize + DeserializeOwned {
    /// The component's tag. One component per tag per entity.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Returns the [`ComponentMeta`] descriptor for this component kind.
    fn meta() -> ComponentMeta {
        ComponentMeta {
            type_id: Self::component_type_id(),
            name: Self::type_name(),
            rust_type: TypeId::of::<Self>(),
            rust_type_name: std::any::type_name::<Self>(),
            serialize_fn: |value: &(dyn Any + Send + Sync)| match value.downcast_ref::<Self>() {
                Some(component) => rmp_serde::to_vec_named(component),
                None => Err(rmp_serde::encode::Error::Syntax(format!(
                    "value filed under '{}' is not a {}",
                    Self::type_name(),
                    std::any::type_name::<Self>()
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {
        fn type_name() -> &'static str {
            "health"
        }
    }

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct Velocity {
        x: f32,
        y: f32,
    }

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "velocity"
        }
    }

    #[test]
    fn test_component_type_id_matches_from_name() {
        assert_eq!(Health::component_type_id(), ComponentTypeId::from_name("health"));
        assert_eq!(ComponentTypeId::of::<Health>(), Health::component_type_id());
    }

    #[test]
    fn test_component_type_id_differs_between_types() {
        assert_ne!(Health::component_type_id(), Velocity::component_type_id());
    }

    #[test]
    fn test_fnv1a_known_vectors() {
        // FNV-1a 64-bit of the empty string is the offset basis itself.
        assert_eq!(
            ComponentTypeId::from_name(""),
            ComponentTypeId(0xcbf2_9ce4_8422_2325)
        );
        assert_eq!(
            ComponentTypeId::from_name("a"),
            ComponentTypeId(0xaf63_dc4c_8601_ec8c)
        );
    }

    #[test]
    fn test_meta_identifies_rust_type() {
        let meta = Health::meta();
        assert_eq!(meta.name, "health");
        assert!(meta.is::<Health>());
        assert!(!meta.is::<Velocity>());
    }

    #[test]
    fn test_meta_serializes_erased_value() {
        let meta = Health::meta();
        let value: ErasedComponent = Box::new(Health {
            current: 80.0,
            max: 100.0,
        });
        let bytes = (meta.serialize_fn)(&*value).unwrap();
        let restored: Health = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(restored.current, 80.0);
    }

    #[test]
    fn test_meta_rejects_foreign_value() {
        let meta = Health::meta();
        let value: ErasedComponent = Box::new(Velocity { x: 1.0, y: 2.0 });
        assert!((meta.serialize_fn)(&*value).is_err());
    }
}
