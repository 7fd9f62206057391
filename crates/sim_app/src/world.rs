//! World state owned by the driver.
//!
//! The [`World`] pairs the component [`Store`] with the [`SpatialHash`]
//! rebuilt from it at the start of every tick.

#![allow(dead_code)]

use std::f32::consts::TAU;

use anyhow::Result;
use sim_component::{ComponentRecord, Entity, SnapshotError, Store, WorldSnapshot};
use sim_math::{Position, Vec2, Velocity};
use sim_spatial::SpatialHash;
use tracing::{debug, info};

use crate::components::{Faction, Health, Name};
use crate::config::SimConfig;

/// Angle between consecutive spawns; spreads points evenly on a disc.
const GOLDEN_ANGLE: f32 = 2.399_963_2;
/// Creature starting hit points.
const STARTING_HEALTH: f32 = 100.0;

/// The driver's world: component store, spatial index, and bounds.
#[derive(Debug)]
pub struct World {
    store: Store,
    spatial: SpatialHash,
    bounds: Vec2,
}

impl World {
    /// Create an empty world sized and gridded per `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.cell_size` is not a valid cell size.
    pub fn new(config: &SimConfig) -> Result<Self> {
        Ok(Self {
            store: Store::new(),
            spatial: SpatialHash::new(config.cell_size)?,
            bounds: Vec2::new(config.world_width, config.world_height),
        })
    }

    /// Create a world around a previously snapshotted store.
    ///
    /// Records with tags this driver does not know are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid config is invalid or a record fails to
    /// decode.
    pub fn from_snapshot(config: &SimConfig, snapshot: &WorldSnapshot) -> Result<Self> {
        let store = Store::restore(snapshot, apply_record)?;
        info!(entities = store.entity_count(), "restored world from snapshot");
        Ok(Self {
            store,
            spatial: SpatialHash::new(config.cell_size)?,
            bounds: Vec2::new(config.world_width, config.world_height),
        })
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    #[must_use]
    pub fn spatial(&self) -> &SpatialHash {
        &self.spatial
    }

    /// World width and height; positions are kept within `[0, bounds]`.
    #[must_use]
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Re-index every positioned entity.
    pub fn rebuild_spatial(&mut self) {
        self.spatial.rebuild(&self.store);
    }

    /// Split borrow for running systems: the store is writable, the grid is
    /// read-only.
    pub fn parts_mut(&mut self) -> (&mut Store, &SpatialHash) {
        (&mut self.store, &self.spatial)
    }

    /// Spawn one creature with the full gameplay component set.
    pub fn spawn_creature(
        &mut self,
        name: impl Into<String>,
        position: Position,
        velocity: Velocity,
        faction: Faction,
    ) -> Entity {
        let entity = self.store.create_entity();
        self.store.add_component(entity, Name::new(name));
        self.store.add_component(entity, position);
        self.store.add_component(entity, velocity);
        self.store.add_component(entity, faction);
        self.store.add_component(entity, Health::full(STARTING_HEALTH));
        entity
    }

    /// Spawn `count` creatures on a golden-angle spiral around the world
    /// centre, alternating factions and orbiting slowly.
    ///
    /// Placement is deterministic so runs are reproducible.
    pub fn populate(&mut self, count: usize) {
        let center = self.bounds * 0.5;
        let max_radius = 0.45 * self.bounds.x.min(self.bounds.y);

        for i in 0..count {
            let t = (i as f32 + 0.5) / count as f32;
            let angle = (i as f32 * GOLDEN_ANGLE) % TAU;
            let direction = Vec2::from_angle(angle);
            let position = center + direction * (max_radius * t.sqrt());
            let velocity = direction.perp() * 2.0;
            self.spawn_creature(
                format!("creature-{i}"),
                Position(position),
                Velocity(velocity),
                Faction((i % 2) as u8),
            );
        }

        debug!(count, "populated world");
    }

    /// Capture the store for saving.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Encode`] if a component fails to serialise.
    pub fn snapshot(&self) -> Result<WorldSnapshot, SnapshotError> {
        self.store.snapshot()
    }
}

/// Decode one snapshot record into the component type its tag names.
fn apply_record(
    store: &mut Store,
    entity: Entity,
    record: &ComponentRecord,
) -> Result<(), SnapshotError> {
    use sim_component::Component;

    let id = record.type_id;
    if id == Position::component_type_id() {
        store.add_component(entity, record.decode::<Position>()?);
    } else if id == Velocity::component_type_id() {
        store.add_component(entity, record.decode::<Velocity>()?);
    } else if id == Health::component_type_id() {
        store.add_component(entity, record.decode::<Health>()?);
    } else if id == Faction::component_type_id() {
        store.add_component(entity, record.decode::<Faction>()?);
    } else if id == Name::component_type_id() {
        store.add_component(entity, record.decode::<Name>()?);
    } else {
        debug!(%entity, tag = %record.name, "skipping unknown component record");
    }
    Ok(())
}
