//! Position and velocity components.
//!
//! [`Position`] is what the spatial hash indexes; [`Velocity`] is what the
//! movement system integrates into it each tick. Both are plain 2D vectors in
//! world units (tiles).

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sim_component::Component;

/// World-space location of an entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position(pub Vec2);

impl Position {
    /// The world origin.
    pub const ORIGIN: Self = Self(Vec2::ZERO);

    /// Create a position from coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(self) -> f32 {
        self.0.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(self) -> f32 {
        self.0.y
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> f32 {
        self.0.distance_squared(other.0)
    }

    /// Move by `offset`.
    #[must_use]
    pub fn translated(self, offset: Vec2) -> Self {
        Self(self.0 + offset)
    }
}

impl From<Vec2> for Position {
    fn from(value: Vec2) -> Self {
        Self(value)
    }
}

impl Component for Position {
    fn type_name() -> &'static str {
        "position"
    }
}

/// Linear velocity in world units per second.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Velocity(pub Vec2);

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self(Vec2::ZERO);

    /// Create a velocity from components.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self(Vec2::new(dx, dy))
    }

    /// Speed (vector length).
    #[must_use]
    pub fn speed(self) -> f32 {
        self.0.length()
    }

    /// This velocity with its speed capped at `max`.
    #[must_use]
    pub fn clamped(self, max: f32) -> Self {
        Self(self.0.clamp_length_max(max))
    }
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "velocity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_accessors() {
        let p = Position::new(3.0, -4.0);
        assert_eq!(p.x(), 3.0);
        assert_eq!(p.y(), -4.0);
        assert_eq!(p.distance_squared(Position::ORIGIN), 25.0);
    }

    #[test]
    fn test_translated() {
        let p = Position::ORIGIN.translated(Vec2::new(5.0, 1.0));
        assert_eq!(p, Position::new(5.0, 1.0));
    }

    #[test]
    fn test_non_finite_position() {
        assert!(!Position::new(f32::NAN, 0.0).is_finite());
        assert!(Position::new(1.0, 2.0).is_finite());
    }

    #[test]
    fn test_velocity_clamped() {
        let v = Velocity::new(30.0, 40.0).clamped(5.0);
        assert!((v.speed() - 5.0).abs() < 1e-5);
        assert_eq!(Velocity::new(1.0, 0.0).clamped(5.0), Velocity::new(1.0, 0.0));
    }

    #[test]
    fn test_component_tags() {
        assert_eq!(Position::type_name(), "position");
        assert_eq!(Velocity::type_name(), "velocity");
        assert_ne!(Position::component_type_id(), Velocity::component_type_id());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let p = Position::new(1.0, 2.0);
        let bytes = rmp_serde::to_vec(&p).unwrap();
        let restored: Position = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(p, restored);
    }
}
