//! Axis-aligned bounding boxes in block space.

use crate::{BlockPos, ColumnPos};

/// An axis-aligned box of blocks. Both corners are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Aabb {
    min: BlockPos,
    max: BlockPos,
}

impl Aabb {
    /// The box covering every addressable block.
    pub const EVERYTHING: Self = Self {
        min: BlockPos::new(i32::MIN, i32::MIN, i32::MIN),
        max: BlockPos::new(i32::MAX, i32::MAX, i32::MAX),
    };

    /// Create a box spanning two corners, in any order.
    #[must_use]
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A box holding exactly one block.
    #[must_use]
    pub const fn block(pos: BlockPos) -> Self {
        Self { min: pos, max: pos }
    }

    /// Minimum corner (inclusive).
    #[must_use]
    pub const fn min(&self) -> BlockPos {
        self.min
    }

    /// Maximum corner (inclusive).
    #[must_use]
    pub const fn max(&self) -> BlockPos {
        self.max
    }

    /// Check whether a block lies inside the box.
    #[must_use]
    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// Check whether a column lies inside the box's footprint.
    #[must_use]
    pub const fn contains_column(&self, column: ColumnPos) -> bool {
        column.x >= self.min.x && column.x <= self.max.x && column.z >= self.min.z && column.z <= self.max.z
    }

    /// Check whether two boxes share at least one block.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Check whether the vertical ranges of two boxes overlap.
    #[must_use]
    pub const fn overlaps_vertically(&self, other: &Self) -> bool {
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Number of blocks along each axis.
    #[must_use]
    pub fn extent(&self) -> (u64, u64, u64) {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1) as u64;
        (
            span(self.min.x, self.max.x),
            span(self.min.y, self.max.y),
            span(self.min.z, self.max.z),
        )
    }

    /// Number of blocks in the box, saturating at `u64::MAX`.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let (dx, dy, dz) = self.extent();
        dx.saturating_mul(dy).saturating_mul(dz)
    }

    /// The four footprint corners, counter-clockwise from the minimum.
    #[must_use]
    pub const fn footprint(&self) -> [ColumnPos; 4] {
        [
            ColumnPos::new(self.min.x, self.min.z),
            ColumnPos::new(self.max.x, self.min.z),
            ColumnPos::new(self.max.x, self.max.z),
            ColumnPos::new(self.min.x, self.max.z),
        ]
    }
}
