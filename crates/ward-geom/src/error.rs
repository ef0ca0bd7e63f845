//! Geometry validation errors.

use thiserror::Error;

/// Reasons a shape definition is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Polygon outline has fewer than three distinct vertices.
    #[error("polygon needs at least 3 distinct points, got {0}")]
    TooFewPoints(usize),

    /// All polygon vertices lie on one line.
    #[error("polygon has zero area (all points are collinear)")]
    ZeroArea,

    /// Two non-adjacent polygon edges cross or touch.
    #[error("polygon edges {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },

    /// The same vertex appears twice in the outline.
    #[error("polygon repeats vertex ({x}, {z})")]
    RepeatedVertex { x: i32, z: i32 },
}

/// Result type for geometry construction.
pub type GeometryResult<T> = Result<T, GeometryError>;
