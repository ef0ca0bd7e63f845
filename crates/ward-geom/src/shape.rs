//! The closed set of region shapes.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{Aabb, BlockPos, ColumnPos, Polygon, polygon::outlines_intersect};

/// Discriminant of a [`Shape`], used by records and listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Cuboid,
    Polygon,
    Global,
}

/// Geometry of a region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Axis-aligned box, both corners inclusive.
    Cuboid(Aabb),
    /// Polygonal prism.
    Polygon(Polygon),
    /// Covers the whole world.
    Global,
}

impl Shape {
    /// Cuboid spanning two corners, in any order.
    #[must_use]
    pub fn cuboid(a: BlockPos, b: BlockPos) -> Self {
        Self::Cuboid(Aabb::new(a, b))
    }

    /// The shape's discriminant.
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Cuboid(_) => ShapeKind::Cuboid,
            Self::Polygon(_) => ShapeKind::Polygon,
            Self::Global => ShapeKind::Global,
        }
    }

    #[must_use]
    pub const fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    /// Check whether a block lies inside the shape.
    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        match self {
            Self::Cuboid(aabb) => aabb.contains(pos),
            Self::Polygon(polygon) => polygon.contains(pos),
            Self::Global => true,
        }
    }

    /// Check whether two shapes share at least one block.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Global, _) | (_, Self::Global) => true,
            (Self::Cuboid(a), Self::Cuboid(b)) => a.intersects(b),
            _ => {
                let (a, b) = (self.bounding_box(), other.bounding_box());
                a.intersects(&b) && outlines_intersect(&self.outline(), &other.outline())
            }
        }
    }

    /// Check whether a box shares at least one block with the shape.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        match self {
            Self::Cuboid(own) => own.intersects(aabb),
            Self::Polygon(polygon) => {
                polygon.bounding_box().intersects(aabb) && outlines_intersect(polygon.points(), &aabb.footprint())
            }
            Self::Global => true,
        }
    }

    /// Check whether a column lies inside the shape's footprint.
    #[must_use]
    pub fn contains_column(&self, column: ColumnPos) -> bool {
        match self {
            Self::Cuboid(aabb) => aabb.contains_column(column),
            Self::Polygon(polygon) => polygon.contains_column(column),
            Self::Global => true,
        }
    }

    /// Bounding box. The global shape reports [`Aabb::EVERYTHING`].
    #[must_use]
    pub const fn bounding_box(&self) -> Aabb {
        match self {
            Self::Cuboid(aabb) => *aabb,
            Self::Polygon(polygon) => polygon.bounding_box(),
            Self::Global => Aabb::EVERYTHING,
        }
    }

    /// Number of blocks inside the shape, saturating at `u64::MAX`.
    #[must_use]
    pub fn volume(&self) -> u64 {
        match self {
            Self::Cuboid(aabb) => aabb.volume(),
            Self::Polygon(polygon) => polygon.volume(),
            Self::Global => u64::MAX,
        }
    }

    /// Footprint outline on the X/Z plane.
    fn outline(&self) -> Cow<'_, [ColumnPos]> {
        match self {
            Self::Cuboid(aabb) => Cow::Owned(aabb.footprint().to_vec()),
            Self::Polygon(polygon) => Cow::Borrowed(polygon.points()),
            Self::Global => Cow::Owned(Aabb::EVERYTHING.footprint().to_vec()),
        }
    }
}

impl From<Aabb> for Shape {
    fn from(aabb: Aabb) -> Self {
        Self::Cuboid(aabb)
    }
}

impl From<Polygon> for Shape {
    fn from(polygon: Polygon) -> Self {
        Self::Polygon(polygon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Shape {
        let points = [(0, 0), (20, 0), (0, 20)].map(ColumnPos::from);
        Shape::Polygon(Polygon::new(points, 0, 64).unwrap())
    }

    #[test]
    fn test_global_contains_and_intersects_everything() {
        let far = BlockPos::new(i32::MAX, i32::MIN, -30_000_000);
        assert!(Shape::Global.contains(far));
        assert!(Shape::Global.intersects(&triangle()));
        assert!(triangle().intersects(&Shape::Global));
    }

    #[test]
    fn test_polygon_against_cuboid() {
        let tri = triangle();
        let near_hypotenuse = Shape::cuboid(BlockPos::new(10, 0, 10), BlockPos::new(15, 10, 15));
        let beyond_hypotenuse = Shape::cuboid(BlockPos::new(11, 0, 11), BlockPos::new(15, 10, 15));
        let above = Shape::cuboid(BlockPos::new(1, 65, 1), BlockPos::new(2, 70, 2));

        assert!(tri.intersects(&near_hypotenuse));
        assert!(near_hypotenuse.intersects(&tri));
        assert!(!tri.intersects(&beyond_hypotenuse));
        assert!(!tri.intersects(&above));
    }

    #[test]
    fn test_cuboid_inside_polygon_intersects() {
        let tri = triangle();
        let inner = Aabb::new(BlockPos::new(2, 5, 2), BlockPos::new(3, 6, 3));
        assert!(tri.intersects(&Shape::Cuboid(inner)));
        assert!(tri.intersects_aabb(&inner));
    }

    #[test]
    fn test_single_column_cuboid() {
        let pillar = Shape::cuboid(BlockPos::new(5, 0, 5), BlockPos::new(5, 255, 5));
        assert!(pillar.contains(BlockPos::new(5, 100, 5)));
        assert!(pillar.intersects(&triangle()));
        assert_eq!(pillar.volume(), 256);
    }
}
