//! Fixed-timestep tick loop.
//!
//! Each tick:
//!
//! 1. Rebuild the spatial hash from current positions.
//! 2. Run every registered system in order against the store.
//! 3. Advance the tick counter.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, trace, warn};

use crate::config::SimConfig;
use crate::registry::SystemRegistry;
use crate::systems::{Cleanup, Combat, Flocking, Movement, TickContext};
use crate::world::World;

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

impl From<&SimConfig> for TickConfig {
    fn from(config: &SimConfig) -> Self {
        Self {
            tick_rate: config.tick_rate,
            max_ticks: config.max_ticks,
        }
    }
}

/// The driver's tick loop state.
#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    config: TickConfig,
    world: World,
    registry: SystemRegistry,
}

impl TickLoop {
    /// Create a tick loop over `world` with no systems registered.
    #[must_use]
    pub fn new(config: TickConfig, world: World) -> Self {
        Self {
            tick_id: 0,
            config,
            world,
            registry: SystemRegistry::new(),
        }
    }

    /// Create a tick loop running the standard system set, in order:
    /// movement, flocking, combat, cleanup.
    #[must_use]
    pub fn with_default_systems(config: &SimConfig, world: World) -> Self {
        let mut tick_loop = Self::new(TickConfig::from(config), world);
        let registry = tick_loop.registry_mut();
        registry.register(Box::new(Movement));
        registry.register(Box::new(Flocking::from_config(config)));
        registry.register(Box::new(Combat::from_config(config)));
        registry.register(Box::new(Cleanup::default()));
        tick_loop
    }

    /// Returns the number of completed ticks.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn registry(&self) -> &SystemRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SystemRegistry {
        &mut self.registry
    }

    /// Run one tick of the simulation.
    pub fn tick(&mut self, dt: f64) {
        let tick_id = self.tick_id + 1;
        let bounds = self.world.bounds();

        self.world.rebuild_spatial();
        debug!(
            tick_id,
            dt,
            entities = self.world.store().entity_count(),
            cells = self.world.spatial().cell_count(),
            "tick start"
        );

        let (store, spatial) = self.world.parts_mut();
        let mut ctx = TickContext {
            tick_id,
            dt: dt as f32,
            bounds,
            store,
            spatial,
        };
        for system in self.registry.iter_mut() {
            let version = ctx.store.version();
            system.run(&mut ctx);
            trace!(
                tick_id,
                system = system.name(),
                structural_changes = ctx.store.version() - version,
                "system ran"
            );
        }

        self.tick_id = tick_id;
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if `tick_rate` does not give a representable tick
    /// duration.
    pub fn run(&mut self) -> Result<()> {
        let tick_duration = Duration::try_from_secs_f64(1.0 / self.config.tick_rate)
            .with_context(|| format!("invalid tick_rate {}", self.config.tick_rate))?;
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            systems = self.registry.system_count(),
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(tick_duration.as_secs_f64());

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                let stats = self.world.store().cache_stats();
                info!(
                    ticks = tick_count,
                    entities = self.world.store().entity_count(),
                    cache_hits = stats.hits,
                    cache_misses = stats.misses,
                    "tick loop complete"
                );
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sim_math::Position;

    use super::*;
    use crate::components::Health;

    fn test_world(count: usize) -> (SimConfig, World) {
        let config = SimConfig {
            world_width: 100.0,
            world_height: 100.0,
            ..SimConfig::default()
        };
        let mut world = World::new(&config).unwrap();
        world.populate(count);
        (config, world)
    }

    #[test]
    fn test_tick_advances_counter() {
        let (_, world) = test_world(0);
        let mut tick_loop = TickLoop::new(TickConfig::default(), world);
        assert_eq!(tick_loop.tick_id(), 0);
        tick_loop.tick(1.0 / 60.0);
        assert_eq!(tick_loop.tick_id(), 1);
        tick_loop.tick(1.0 / 60.0);
        assert_eq!(tick_loop.tick_id(), 2);
    }

    #[test]
    fn test_tick_rebuilds_spatial_hash() {
        let (_, world) = test_world(10);
        let mut tick_loop = TickLoop::new(TickConfig::default(), world);
        assert!(tick_loop.world().spatial().is_empty());
        tick_loop.tick(1.0 / 60.0);
        assert_eq!(tick_loop.world().spatial().len(), 10);
    }

    #[test]
    fn test_default_systems_registered_in_order() {
        let (config, world) = test_world(0);
        let tick_loop = TickLoop::with_default_systems(&config, world);
        assert_eq!(
            tick_loop.registry().names().collect::<Vec<_>>(),
            ["movement", "flocking", "combat", "cleanup"]
        );
    }

    #[test]
    fn test_default_systems_move_and_keep_bounds() {
        let (config, world) = test_world(40);
        let mut tick_loop = TickLoop::with_default_systems(&config, world);
        for _ in 0..30 {
            tick_loop.tick(1.0 / 30.0);
        }

        let store = tick_loop.world().store();
        for &e in store.entities_with::<Position>().iter() {
            let p = store.get_component::<Position>(e).unwrap();
            assert!((0.0..=100.0).contains(&p.x()) && (0.0..=100.0).contains(&p.y()));
        }
    }

    #[test]
    fn test_dead_creatures_removed_on_tick() {
        let (config, world) = test_world(6);
        let mut tick_loop = TickLoop::with_default_systems(&config, world);
        let victim = tick_loop.world().store().all_entities()[0];
        tick_loop
            .world_mut()
            .store_mut()
            .get_component_mut::<Health>(victim)
            .unwrap()
            .take(1_000.0);

        tick_loop.tick(1.0 / 60.0);
        assert!(!tick_loop.world().store().contains(victim));
    }

    #[test]
    fn test_run_limited_ticks() {
        let (_, world) = test_world(5);
        let config = TickConfig {
            tick_rate: 1000.0, // fast for testing
            max_ticks: 5,
        };
        let mut tick_loop = TickLoop::new(config, world);
        tick_loop.run().unwrap();
        assert_eq!(tick_loop.tick_id(), 5);
    }

    #[test]
    fn test_run_rejects_unrepresentable_tick_rate() {
        let (_, world) = test_world(0);
        let config = TickConfig {
            tick_rate: 1e-300,
            max_ticks: 1,
        };
        let mut tick_loop = TickLoop::new(config, world);
        assert!(tick_loop.run().is_err());
        assert_eq!(tick_loop.tick_id(), 0);
    }
}
