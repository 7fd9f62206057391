//! # sim_spatial
//!
//! Proximity queries for the world simulation.
//!
//! [`SpatialHash`] partitions the plane into square cells and files every
//! positioned entity under the cell it falls in. The grid is rebuilt from the
//! [`Store`](sim_component::Store) once per tick and answers "who is near this
//! point / inside this rectangle / near this entity" by scanning only the
//! cells that overlap the query.

pub mod error;
pub mod grid;

pub use error::SpatialError;
pub use grid::{CellKey, DEFAULT_CELL_SIZE, SpatialHash};
