//! Polygonal prisms: a simple polygon on the X/Z plane extruded vertically.

use crate::{Aabb, BlockPos, ColumnPos, GeometryError, GeometryResult};

/// A simple (non self-intersecting) polygon extruded over `[min_y, max_y]`.
///
/// Vertices are block columns. Containment follows the even-odd rule, with
/// every block on an edge or vertex counted as inside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<ColumnPos>,
    min_y: i32,
    max_y: i32,
    bounds: Aabb,
}

impl Polygon {
    /// Build a polygon, validating the outline.
    ///
    /// Consecutive duplicate vertices (including a closing vertex equal to
    /// the first) are dropped. The height range may be given in either order.
    pub fn new(points: impl IntoIterator<Item = ColumnPos>, min_y: i32, max_y: i32) -> GeometryResult<Self> {
        let mut outline: Vec<ColumnPos> = Vec::new();
        for point in points {
            if outline.last() != Some(&point) {
                outline.push(point);
            }
        }
        while outline.len() > 1 && outline.first() == outline.last() {
            outline.pop();
        }

        validate_outline(&outline)?;

        let (min_y, max_y) = (min_y.min(max_y), min_y.max(max_y));
        let bounds = outline_bounds(&outline, min_y, max_y);

        Ok(Self {
            points: outline,
            min_y,
            max_y,
            bounds,
        })
    }

    /// Outline vertices in definition order.
    #[must_use]
    pub fn points(&self) -> &[ColumnPos] {
        &self.points
    }

    /// Lowest block layer (inclusive).
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Highest block layer (inclusive).
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Bounding box of the prism.
    #[must_use]
    pub const fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    /// Check whether a block lies inside the prism.
    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        self.bounds.contains(pos) && outline_contains(&self.points, pos.column())
    }

    /// Check whether a column lies inside the outline, ignoring height.
    #[must_use]
    pub fn contains_column(&self, column: ColumnPos) -> bool {
        self.bounds.contains_column(column) && outline_contains(&self.points, column)
    }

    /// Number of blocks inside the prism.
    ///
    /// Counts lattice columns inside or on the outline via Pick's theorem,
    /// multiplied by the number of layers.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let twice_area = twice_signed_area(&self.points).unsigned_abs();
        let boundary: u128 = self
            .edges()
            .map(|(a, b)| gcd(
                (i64::from(b.x) - i64::from(a.x)).unsigned_abs(),
                (i64::from(b.z) - i64::from(a.z)).unsigned_abs(),
            ))
            .map(u128::from)
            .sum();
        let columns = (twice_area + boundary + 2) / 2;
        let layers = (i64::from(self.max_y) - i64::from(self.min_y) + 1) as u128;
        u64::try_from(columns.saturating_mul(layers)).unwrap_or(u64::MAX)
    }

    /// Iterate over edges as vertex pairs, closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (ColumnPos, ColumnPos)> + '_ {
        edges(&self.points)
    }
}

/// Check whether two outlines share at least one column.
pub(crate) fn outlines_intersect(a: &[ColumnPos], b: &[ColumnPos]) -> bool {
    if b.iter().any(|&p| outline_contains(a, p)) || a.iter().any(|&p| outline_contains(b, p)) {
        return true;
    }
    edges(a).any(|(p1, p2)| edges(b).any(|(q1, q2)| segments_intersect(p1, p2, q1, q2)))
}

/// Even-odd containment with boundary-inclusive semantics.
pub(crate) fn outline_contains(points: &[ColumnPos], p: ColumnPos) -> bool {
    let mut inside = false;

    for (a, b) in edges(points) {
        if on_segment(a, b, p) {
            return true;
        }

        let (ax, az) = (i128::from(a.x), i128::from(a.z));
        let (bx, bz) = (i128::from(b.x), i128::from(b.z));
        let (px, pz) = (i128::from(p.x), i128::from(p.z));

        // Edge straddles the horizontal ray through p (half-open on z).
        if (az > pz) != (bz > pz) {
            let dz = bz - az;
            let cross = (bx - ax) * (pz - az) - (px - ax) * dz;
            // p lies left of the crossing point: the ray to +x hits this edge.
            if (cross > 0) == (dz > 0) {
                inside = !inside;
            }
        }
    }

    inside
}

fn edges(points: &[ColumnPos]) -> impl Iterator<Item = (ColumnPos, ColumnPos)> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[i], points[(i + 1) % n]))
}

fn validate_outline(points: &[ColumnPos]) -> GeometryResult<()> {
    if points.len() < 3 {
        return Err(GeometryError::TooFewPoints(points.len()));
    }

    for (i, p) in points.iter().enumerate() {
        if points[i + 1..].contains(p) {
            return Err(GeometryError::RepeatedVertex { x: p.x, z: p.z });
        }
    }

    if twice_signed_area(points) == 0 {
        return Err(GeometryError::ZeroArea);
    }

    let n = points.len();
    let edge_list: Vec<_> = edges(points).collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            let (p1, p2) = edge_list[i];
            let (q1, q2) = edge_list[j];

            if adjacent {
                // Adjacent edges share one vertex; they only conflict when
                // the second doubles back along the first.
                let (a, shared, c) = if j == i + 1 { (p1, p2, q2) } else { (q1, q2, p2) };
                if orientation(a, shared, c) == 0 && doubles_back(a, shared, c) {
                    return Err(GeometryError::SelfIntersecting { first: i, second: j });
                }
            } else if segments_intersect(p1, p2, q1, q2) {
                return Err(GeometryError::SelfIntersecting { first: i, second: j });
            }
        }
    }

    Ok(())
}

fn outline_bounds(points: &[ColumnPos], min_y: i32, max_y: i32) -> Aabb {
    let (mut min_x, mut max_x) = (i32::MAX, i32::MIN);
    let (mut min_z, mut max_z) = (i32::MAX, i32::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_z = min_z.min(p.z);
        max_z = max_z.max(p.z);
    }
    Aabb::new(BlockPos::new(min_x, min_y, min_z), BlockPos::new(max_x, max_y, max_z))
}

fn twice_signed_area(points: &[ColumnPos]) -> i128 {
    edges(points)
        .map(|(a, b)| i128::from(a.x) * i128::from(b.z) - i128::from(b.x) * i128::from(a.z))
        .sum()
}

/// Sign of the cross product `(b - a) × (c - a)`.
fn orientation(a: ColumnPos, b: ColumnPos, c: ColumnPos) -> i8 {
    let cross = (i128::from(b.x) - i128::from(a.x)) * (i128::from(c.z) - i128::from(a.z))
        - (i128::from(b.z) - i128::from(a.z)) * (i128::from(c.x) - i128::from(a.x));
    cross.signum() as i8
}

/// For collinear `a`, `b`, `c`: does the walk `a -> b -> c` reverse direction?
fn doubles_back(a: ColumnPos, b: ColumnPos, c: ColumnPos) -> bool {
    let dot = (i128::from(b.x) - i128::from(a.x)) * (i128::from(c.x) - i128::from(b.x))
        + (i128::from(b.z) - i128::from(a.z)) * (i128::from(c.z) - i128::from(b.z));
    dot < 0
}

fn on_segment(a: ColumnPos, b: ColumnPos, p: ColumnPos) -> bool {
    orientation(a, b, p) == 0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.z >= a.z.min(b.z)
        && p.z <= a.z.max(b.z)
}

fn segments_intersect(p1: ColumnPos, p2: ColumnPos, q1: ColumnPos, q2: ColumnPos) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if d1 != d2 && d3 != d4 && d1 != 0 && d2 != 0 && d3 != 0 && d4 != 0 {
        return true;
    }

    on_segment(q1, q2, p1) || on_segment(q1, q2, p2) || on_segment(p1, p2, q1) || on_segment(p1, p2, q2)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
