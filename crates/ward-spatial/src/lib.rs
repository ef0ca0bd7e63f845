//! Spatial index of the regions in one world.
//!
//! Regions are bucketed by the grid cells (chunk columns by default) their
//! footprint touches, so a point query only inspects the regions sharing its
//! cell:
//!
//! ```text
//!  pos ──► CellKey(x >> shift, z >> shift) ──► bucket ──┐
//!                                oversized regions ─────┼─► contains(pos)? ──► ApplicableSet
//!                                                       │        + parent chains
//!                                                       │        + __global__
//! ```
//!
//! [`RegionIndex`] owns the regions and keeps parent links acyclic;
//! [`ApplicableSet`] is the immutable result of a query.

mod applicable;
mod cell;
mod grid;
mod index;

pub use applicable::ApplicableSet;
pub use cell::{CellKey, CellSpan, GridConfig, MAX_CELL_SHIFT};
pub use grid::SpatialGrid;
pub use index::{RegionIndex, RemovalStrategy};
