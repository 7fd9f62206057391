//! # sim_component
//!
//! The "E" and "C" of the world simulation: entity identity, component
//! storage, and the cached multi-component queries every system starts from.
//!
//! This crate provides:
//!
//! - [`Component`] trait — the contract all simulation data must satisfy.
//! - [`Entity`] — lightweight `u64` entity identifiers.
//! - [`EntityAllocator`] — strictly increasing, never-recycled ID allocator.
//! - [`ComponentTable`] — all components of one kind, keyed by entity.
//! - [`Store`] — entity lifecycle, component attachment, and the versioned
//!   query cache.
//! - [`snapshot`] — world export/restore for an external save layer.

pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod table;

pub use component::{Component, ComponentMeta, ComponentTypeId, ErasedComponent};
pub use entity::{Entity, EntityAllocator};
pub use error::SnapshotError;
pub use query::QueryKey;
pub use snapshot::{ComponentRecord, EntitySnapshot, WorldSnapshot};
pub use store::{QueryCacheStats, Store};
pub use table::ComponentTable;
