//! Block-space geometry for protected regions.
//!
//! All coordinates are integer block coordinates. Volumes are closed on both
//! ends: a cuboid from `(0, 0, 0)` to `(15, 255, 15)` contains 16 × 256 × 16
//! blocks, and two cuboids sharing a face block overlap on that face.
//!
//! # Shapes
//!
//! ```text
//! Shape::Cuboid   min/max corners, both inclusive
//! Shape::Polygon  2-D outline on the X/Z plane extruded over [min_y, max_y]
//! Shape::Global   no boundary; contains every block in its world
//! ```
//!
//! Polygon containment uses the even-odd rule; blocks lying on an edge or a
//! vertex of the outline are inside.

mod aabb;
mod error;
mod polygon;
mod pos;
mod shape;

pub use aabb::Aabb;
pub use error::{GeometryError, GeometryResult};
pub use polygon::Polygon;
pub use pos::{BlockPos, ColumnPos};
pub use shape::{Shape, ShapeKind};
