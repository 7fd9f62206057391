//! # sim_math
//!
//! 2D math types for the world simulation. Re-exports [`glam`] for linear
//! algebra and defines the spatial components that implement
//! [`Component`](sim_component::Component).

pub mod kinematics;

// Re-export glam types for convenience.
pub use glam::{Vec2, vec2};

pub use kinematics::{Position, Velocity};
