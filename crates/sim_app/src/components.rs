//! Gameplay components used by the demo systems.
//!
//! Spatial components ([`Position`](sim_math::Position),
//! [`Velocity`](sim_math::Velocity)) live in `sim_math`; these are the
//! driver's own.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use sim_component::Component;

/// Hit points, clamped to `0..=max_hp`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Health {
    pub hp: f32,
    pub max_hp: f32,
}

impl Health {
    #[must_use]
    pub fn full(max_hp: f32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Subtract `amount`; returns `true` if this blow was the lethal one.
    pub fn take(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        was_alive && !self.is_alive()
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "health"
    }
}

/// Which side a creature fights for. Creatures flock with their own faction
/// and attack the others.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Faction(pub u8);

impl Component for Faction {
    fn type_name() -> &'static str {
        "faction"
    }
}

/// Display name, for logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Name(pub String);

impl Name {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Component for Name {
    fn type_name() -> &'static str {
        "name"
    }
}
