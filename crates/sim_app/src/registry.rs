//! System registry.
//!
//! Systems run in registration order, once per tick. Names are unique; a
//! second system registered under an existing name is rejected.

#![allow(dead_code)]

use tracing::warn;

use crate::systems::System;

/// Ordered collection of the systems the tick loop runs.
#[derive(Default)]
pub struct SystemRegistry {
    systems: Vec<Box<dyn System>>,
}

impl SystemRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Append a system to the run order.
    ///
    /// Returns `false` (and drops `system`) if its name is already taken.
    pub fn register(&mut self, system: Box<dyn System>) -> bool {
        if self.contains(system.name()) {
            warn!(system = system.name(), "system already registered; ignoring");
            return false;
        }
        self.systems.push(system);
        true
    }

    /// Remove a system by name, keeping the order of the rest.
    ///
    /// Returns `true` if the system was found and removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        if let Some(pos) = self.systems.iter().position(|s| s.name() == name) {
            self.systems.remove(pos);
            return true;
        }
        false
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.systems.iter().any(|s| s.name() == name)
    }

    /// System names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|s| s.name())
    }

    /// Systems in run order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn System>> {
        self.systems.iter_mut()
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}

impl std::fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
