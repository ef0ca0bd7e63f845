//! Grid cells on the X/Z plane.

use serde::{Deserialize, Serialize};
use ward_geom::{Aabb, BlockPos, ColumnPos};

/// Largest accepted cell shift. Cells are at most 2^24 blocks wide.
pub const MAX_CELL_SHIFT: u8 = 24;

/// Grid layout settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells are `1 << cell_shift` blocks wide on X and Z. 4 gives 16×16 chunk columns.
    pub cell_shift: u8,
    /// A region covering more cells than this is kept off the grid and
    /// checked on every query instead.
    pub max_cells_per_region: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_shift: 4,
            max_cells_per_region: 4096,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub const fn shift(&self) -> u8 {
        if self.cell_shift > MAX_CELL_SHIFT {
            MAX_CELL_SHIFT
        } else {
            self.cell_shift
        }
    }
}

/// Coordinates of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub x: i32,
    pub z: i32,
}

impl CellKey {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Cell holding a column. Arithmetic shift floors negative coordinates.
    #[must_use]
    pub const fn of(column: ColumnPos, shift: u8) -> Self {
        Self {
            x: column.x >> shift,
            z: column.z >> shift,
        }
    }

    /// Block-space box of this cell over the given height range.
    #[must_use]
    pub fn bounds(self, shift: u8, min_y: i32, max_y: i32) -> Aabb {
        let size = (1_i64 << shift) - 1;
        let min_x = i64::from(self.x) << shift;
        let min_z = i64::from(self.z) << shift;
        Aabb::new(
            BlockPos::new(min_x as i32, min_y, min_z as i32),
            BlockPos::new((min_x + size) as i32, max_y, (min_z + size) as i32),
        )
    }
}

/// Inclusive rectangle of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSpan {
    pub min: CellKey,
    pub max: CellKey,
}

impl CellSpan {
    /// Cells touched by a box's footprint.
    #[must_use]
    pub const fn covering(aabb: &Aabb, shift: u8) -> Self {
        Self {
            min: CellKey::of(aabb.min().column(), shift),
            max: CellKey::of(aabb.max().column(), shift),
        }
    }

    /// Number of cells in the span.
    #[must_use]
    pub fn len(&self) -> u64 {
        let width = (i64::from(self.max.x) - i64::from(self.min.x) + 1) as u64;
        let depth = (i64::from(self.max.z) - i64::from(self.min.z) + 1) as u64;
        width.saturating_mul(depth)
    }

    #[must_use]
    pub const fn contains(&self, key: CellKey) -> bool {
        key.x >= self.min.x && key.x <= self.max.x && key.z >= self.min.z && key.z <= self.max.z
    }

    /// Every cell in the span, row by row.
    pub fn iter(&self) -> impl Iterator<Item = CellKey> + use<> {
        let Self { min, max } = *self;
        (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| CellKey::new(x, z)))
    }
}
