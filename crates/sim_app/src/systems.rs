//! Per-tick systems.
//!
//! Every system sees the same [`TickContext`]: a writable [`Store`] and the
//! [`SpatialHash`] rebuilt at the start of the tick. Positions written by an
//! earlier system are not re-indexed until the next tick, so spatial
//! candidates may be up to one tick stale; distances are always measured
//! against positions read live from the store.

use std::collections::HashMap;

use sim_component::{Entity, Store, component_types};
use sim_math::{Position, Vec2, Velocity};
use sim_spatial::SpatialHash;
use tracing::{debug, info, trace};

use crate::components::{Faction, Health, Name};
use crate::config::SimConfig;

/// Everything a system may touch during one tick.
pub struct TickContext<'a> {
    /// The tick being executed (starts at 1).
    pub tick_id: u64,
    /// Seconds since the previous tick.
    pub dt: f32,
    /// World width and height.
    pub bounds: Vec2,
    pub store: &'a mut Store,
    pub spatial: &'a SpatialHash,
}

/// A unit of per-tick behaviour.
pub trait System {
    /// Unique name, used for registration and logs.
    fn name(&self) -> &str;

    /// Advance this system by one tick.
    fn run(&mut self, ctx: &mut TickContext<'_>);
}

/// Integrates velocity into position and bounces off the world edges.
#[derive(Debug, Default)]
pub struct Movement;

impl System for Movement {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(&mut self, ctx: &mut TickContext<'_>) {
        let movers = ctx
            .store
            .entities_with_components(&component_types![Position, Velocity]);

        for &entity in movers.iter() {
            let Some(mut v) = ctx.store.get_component::<Velocity>(entity).map(|v| v.0) else {
                continue;
            };
            let Some(position) = ctx.store.get_component_mut::<Position>(entity) else {
                continue;
            };

            let mut p = position.0 + v * ctx.dt;
            bounce(&mut p.x, &mut v.x, ctx.bounds.x);
            bounce(&mut p.y, &mut v.y, ctx.bounds.y);
            position.0 = p;

            if let Some(velocity) = ctx.store.get_component_mut::<Velocity>(entity) {
                velocity.0 = v;
            }
        }
    }
}

/// Reflect a coordinate that left `[0, extent]` and flip its velocity.
fn bounce(coord: &mut f32, velocity: &mut f32, extent: f32) {
    if *coord < 0.0 {
        *coord = (-*coord).min(extent);
        *velocity = velocity.abs();
    } else if *coord > extent {
        *coord = (2.0 * extent - *coord).max(0.0);
        *velocity = -velocity.abs();
    }
}

/// Steers each creature toward the centroid of nearby same-faction creatures.
#[derive(Debug)]
pub struct Flocking {
    pub radius: f32,
    /// Acceleration per unit of distance to the centroid.
    pub cohesion: f32,
    pub max_speed: f32,
}

impl Flocking {
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            radius: config.neighbor_radius,
            cohesion: 0.5,
            max_speed: config.max_speed,
        }
    }
}

impl System for Flocking {
    fn name(&self) -> &str {
        "flocking"
    }

    fn run(&mut self, ctx: &mut TickContext<'_>) {
        let flock = ctx
            .store
            .entities_with_components(&component_types![Position, Velocity, Faction]);

        let mut steering = Vec::new();
        for &entity in flock.iter() {
            let store = &*ctx.store;
            let (Some(position), Some(faction)) = (
                store.get_component::<Position>(entity),
                store.get_component::<Faction>(entity),
            ) else {
                continue;
            };

            let mut sum = Vec2::ZERO;
            let mut count = 0u32;
            for other in ctx.spatial.neighbors(entity, self.radius, store) {
                if store.get_component::<Faction>(other) != Some(faction) {
                    continue;
                }
                if let Some(p) = store.get_component::<Position>(other) {
                    sum += p.0;
                    count += 1;
                }
            }

            if count > 0 {
                let centroid = sum / count as f32;
                steering.push((entity, (centroid - position.0) * self.cohesion * ctx.dt));
            }
        }

        for (entity, delta) in steering {
            if let Some(velocity) = ctx.store.get_component_mut::<Velocity>(entity) {
                *velocity = Velocity(velocity.0 + delta).clamped(self.max_speed);
            }
        }
    }
}

/// Creatures lose health for every enemy within striking range.
#[derive(Debug)]
pub struct Combat {
    pub radius: f32,
    /// Damage per second per enemy in range.
    pub damage: f32,
}

impl Combat {
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            radius: config.attack_radius,
            damage: config.attack_damage,
        }
    }
}

impl System for Combat {
    fn name(&self) -> &str {
        "combat"
    }

    fn run(&mut self, ctx: &mut TickContext<'_>) {
        let fighters = ctx
            .store
            .entities_with_components(&component_types![Position, Faction, Health]);

        let mut pending: HashMap<Entity, f32> = HashMap::new();
        let mut nearby = Vec::new();
        let radius_sq = self.radius * self.radius;

        for &entity in fighters.iter() {
            let store = &*ctx.store;
            let (Some(&position), Some(&faction)) = (
                store.get_component::<Position>(entity),
                store.get_component::<Faction>(entity),
            ) else {
                continue;
            };

            ctx.spatial
                .query_into(position.x(), position.y(), self.radius, &mut nearby);
            let enemies = nearby
                .iter()
                .filter(|&&other| other != entity)
                .filter(|&&other| {
                    store
                        .get_component::<Faction>(other)
                        .is_some_and(|f| *f != faction)
                })
                .filter(|&&other| {
                    store
                        .get_component::<Position>(other)
                        .is_some_and(|p| p.distance_squared(position) <= radius_sq)
                })
                .count();

            if enemies > 0 {
                *pending.entry(entity).or_default() += enemies as f32 * self.damage * ctx.dt;
            }
        }

        for (entity, amount) in pending {
            if let Some(health) = ctx.store.get_component_mut::<Health>(entity)
                && health.take(amount)
            {
                trace!(tick_id = ctx.tick_id, %entity, "lethal damage");
            }
        }
    }
}

/// Removes creatures whose health reached zero.
#[derive(Debug, Default)]
pub struct Cleanup {
    removed_total: u64,
}

impl Cleanup {
    /// Creatures removed since this system was created.
    #[must_use]
    pub fn removed_total(&self) -> u64 {
        self.removed_total
    }
}

impl System for Cleanup {
    fn name(&self) -> &str {
        "cleanup"
    }

    fn run(&mut self, ctx: &mut TickContext<'_>) {
        let mortal = ctx.store.entities_with::<Health>();
        let dead: Vec<Entity> = mortal
            .iter()
            .copied()
            .filter(|&e| {
                ctx.store
                    .get_component::<Health>(e)
                    .is_some_and(|h| !h.is_alive())
            })
            .collect();

        for entity in dead {
            if let Some(Name(name)) = ctx.store.get_component::<Name>(entity) {
                debug!(tick_id = ctx.tick_id, %entity, name = %name, "creature died");
            }
            if ctx.store.remove_entity(entity) {
                self.removed_total += 1;
            }
        }

        if self.removed_total > 0 && ctx.tick_id % 60 == 0 {
            info!(
                tick_id = ctx.tick_id,
                removed_total = self.removed_total,
                alive = ctx.store.entity_count(),
                "population update"
            );
        }
    }
}
