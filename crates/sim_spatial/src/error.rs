//! Spatial index error types.

/// Errors raised when configuring a [`SpatialHash`](crate::SpatialHash).
///
/// Queries never fail; only construction can.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SpatialError {
    /// The cell size must be finite and strictly positive.
    #[error("cell size must be finite and > 0, got {0}")]
    InvalidCellSize(f32),
}
