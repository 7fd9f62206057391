//! The uniform-grid spatial hash.
//!
//! Cells are keyed by `(floor(x / cell_size), floor(y / cell_size))` and only
//! non-empty cells exist, so the grid is unbounded in every direction and
//! negative coordinates need no special casing.
//!
//! The grid is a snapshot: it reflects positions as of the last
//! [`SpatialHash::rebuild`]. Moving an entity afterwards does not move it in
//! the grid until the next rebuild. Rebuilding from scratch is O(N) per tick,
//! which beats incremental maintenance when nearly every entity moves every
//! tick anyway.
//!
//! Radius queries use an inclusive boundary: an entity exactly `radius` away
//! is returned.

use indexmap::IndexMap;
use sim_component::{Entity, Store};
use sim_math::{Position, Vec2};
use tracing::debug;

use crate::error::SpatialError;

/// Cell size used by [`SpatialHash::default`], in world units.
pub const DEFAULT_CELL_SIZE: f32 = 16.0;

/// Integer coordinates of a grid cell.
pub type CellKey = (i32, i32);

/// Sparse uniform grid over entity positions.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    /// Non-empty cells only. Each bucket records the position the entity had
    /// when it was inserted.
    cells: IndexMap<CellKey, Vec<(Entity, Vec2)>>,
    len: usize,
}

impl SpatialHash {
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCellSize`] unless `cell_size` is finite
    /// and strictly positive.
    pub fn new(cell_size: f32) -> Result<Self, SpatialError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SpatialError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            cells: IndexMap::new(),
            len: 0,
        })
    }

    /// Width and height of a cell in world units.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The cell containing `(x, y)`.
    ///
    /// Coordinates beyond the `i32` cell range saturate to the outermost cell.
    #[inline]
    #[must_use]
    pub fn cell_of(&self, x: f32, y: f32) -> CellKey {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Number of non-empty cells after the last rebuild.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of entities indexed by the last rebuild.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the last rebuild indexed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entities filed under `cell`, in insertion order.
    pub fn entities_in_cell(&self, cell: CellKey) -> impl Iterator<Item = Entity> + '_ {
        self.cells
            .get(&cell)
            .into_iter()
            .flatten()
            .map(|&(entity, _)| entity)
    }

    /// Discard every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    /// Rebuild the grid from every entity holding a [`Position`] in `store`.
    ///
    /// Previous contents are discarded. Entities with non-finite coordinates
    /// are skipped.
    pub fn rebuild(&mut self, store: &Store) {
        let positioned = store.entities_with::<Position>();
        let entries = positioned.iter().filter_map(|&entity| {
            store
                .get_component::<Position>(entity)
                .map(|position| (entity, position.0))
        });
        self.rebuild_from(entries);
    }

    /// Rebuild the grid from explicit `(entity, position)` pairs.
    pub fn rebuild_from(&mut self, entries: impl IntoIterator<Item = (Entity, Vec2)>) {
        self.clear();
        let mut skipped = 0usize;
        for (entity, position) in entries {
            if !position.is_finite() {
                skipped += 1;
                continue;
            }
            let cell = self.cell_of(position.x, position.y);
            self.cells.entry(cell).or_default().push((entity, position));
            self.len += 1;
        }

        debug!(
            entities = self.len,
            cells = self.cells.len(),
            skipped,
            "rebuilt spatial hash"
        );
    }

    /// Entities whose recorded position lies within `radius` of `(cx, cy)`.
    ///
    /// A NaN or negative radius, or a non-finite center, yields no entities.
    #[must_use]
    pub fn query(&self, cx: f32, cy: f32, radius: f32) -> Vec<Entity> {
        let mut result = Vec::new();
        self.query_into(cx, cy, radius, &mut result);
        result
    }

    /// Like [`query`](Self::query), writing into a reusable buffer. The
    /// buffer is cleared first.
    pub fn query_into(&self, cx: f32, cy: f32, radius: f32, result: &mut Vec<Entity>) {
        result.clear();
        if !cx.is_finite() || !cy.is_finite() || radius.is_nan() || radius < 0.0 {
            return;
        }

        let center = Vec2::new(cx, cy);
        let radius_sq = radius * radius;
        self.for_each_in_box(
            Vec2::new(cx - radius, cy - radius),
            Vec2::new(cx + radius, cy + radius),
            |entity, position| {
                if position.distance_squared(center) <= radius_sq {
                    result.push(entity);
                }
            },
        );
    }

    /// Entities whose recorded position lies inside the axis-aligned
    /// rectangle spanned by the two corners, edges included.
    ///
    /// The corners may be given in any order.
    #[must_use]
    pub fn query_rect(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> Vec<Entity> {
        let mut result = Vec::new();
        if x1.is_nan() || y1.is_nan() || x2.is_nan() || y2.is_nan() {
            return result;
        }

        let min = Vec2::new(x1.min(x2), y1.min(y2));
        let max = Vec2::new(x1.max(x2), y1.max(y2));
        self.for_each_in_box(min, max, |entity, position| {
            if position.cmpge(min).all() && position.cmple(max).all() {
                result.push(entity);
            }
        });
        result
    }

    /// Entities within `radius` of `entity`'s current position in `store`,
    /// excluding `entity` itself.
    ///
    /// The center is read live from the store; the candidates come from the
    /// last rebuild. An entity without a position has no neighbors.
    #[must_use]
    pub fn neighbors(&self, entity: Entity, radius: f32, store: &Store) -> Vec<Entity> {
        let Some(position) = store.get_component::<Position>(entity) else {
            return Vec::new();
        };
        let mut result = self.query(position.x(), position.y(), radius);
        result.retain(|&other| other != entity);
        result
    }

    /// Visit every recorded entry in cells overlapping the box `[min, max]`.
    ///
    /// When the box spans more cells than are occupied, the occupied cells
    /// are filtered against the box instead of probing every cell in it.
    fn for_each_in_box(&self, min: Vec2, max: Vec2, mut visit: impl FnMut(Entity, Vec2)) {
        let (min_cx, min_cy) = self.cell_of(min.x, min.y);
        let (max_cx, max_cy) = self.cell_of(max.x, max.y);

        let span_x = i64::from(max_cx) - i64::from(min_cx) + 1;
        let span_y = i64::from(max_cy) - i64::from(min_cy) + 1;
        let spanned = span_x.saturating_mul(span_y);

        if spanned > self.cells.len() as i64 {
            for (&(cx, cy), bucket) in &self.cells {
                if (min_cx..=max_cx).contains(&cx) && (min_cy..=max_cy).contains(&cy) {
                    for &(entity, position) in bucket {
                        visit(entity, position);
                    }
                }
            }
            return;
        }

        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    for &(entity, position) in bucket {
                        visit(entity, position);
                    }
                }
            }
        }
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            cells: IndexMap::new(),
            len: 0,
        }
    }
}
