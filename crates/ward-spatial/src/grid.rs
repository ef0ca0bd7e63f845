//! Cell buckets for region lookup.

use hashbrown::{HashMap, HashSet};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use ward_geom::{Aabb, BlockPos, Shape};
use ward_region::RegionId;

use crate::{CellKey, CellSpan, GridConfig};

type Bucket = SmallVec<[RegionId; 4]>;

/// Buckets region ids by the grid cells their footprint touches.
///
/// Regions spanning more cells than the configured budget go to a separate
/// list that every query scans. The global region is never gridded.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    config: GridConfig,
    cells: HashMap<CellKey, Bucket, FxBuildHasher>,
    oversized: Vec<RegionId>,
}

impl SpatialGrid {
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            cells: HashMap::with_hasher(FxBuildHasher),
            oversized: Vec::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Add a region's footprint.
    pub fn insert(&mut self, id: &RegionId, shape: &Shape) {
        if shape.is_global() {
            return;
        }

        let span = CellSpan::covering(&shape.bounding_box(), self.config.shift());
        if span.len() > self.config.max_cells_per_region {
            tracing::trace!("region '{}' spans {} cells, indexed as oversized", id, span.len());
            self.oversized.push(id.clone());
            return;
        }

        for key in self.touched(shape, span) {
            self.cells.entry(key).or_default().push(id.clone());
        }
    }

    /// Remove a region's footprint. `shape` must be the shape it was inserted with.
    pub fn remove(&mut self, id: &RegionId, shape: &Shape) {
        if shape.is_global() {
            return;
        }

        let span = CellSpan::covering(&shape.bounding_box(), self.config.shift());
        if span.len() > self.config.max_cells_per_region {
            self.oversized.retain(|other| other != id);
            return;
        }

        for key in span.iter() {
            if let Some(bucket) = self.cells.get_mut(&key) {
                bucket.retain(|other| other != id);
                if bucket.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
    }

    /// Ids of regions that may contain a block.
    pub fn candidates_at(&self, pos: BlockPos) -> impl Iterator<Item = &RegionId> {
        let key = CellKey::of(pos.column(), self.config.shift());
        self.cells.get(&key).into_iter().flatten().chain(&self.oversized)
    }

    /// Ids of regions that may intersect a box, without duplicates.
    #[must_use]
    pub fn candidates_in(&self, aabb: &Aabb) -> HashSet<&RegionId, FxBuildHasher> {
        let span = CellSpan::covering(aabb, self.config.shift());
        let mut found = HashSet::with_hasher(FxBuildHasher);

        if span.len() > self.cells.len() as u64 {
            for (key, bucket) in &self.cells {
                if span.contains(*key) {
                    found.extend(bucket);
                }
            }
        } else {
            for key in span.iter() {
                if let Some(bucket) = self.cells.get(&key) {
                    found.extend(bucket);
                }
            }
        }

        found.extend(&self.oversized);
        found
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn oversized(&self) -> &[RegionId] {
        &self.oversized
    }

    /// Cells of the span that the shape actually reaches.
    fn touched(&self, shape: &Shape, span: CellSpan) -> Vec<CellKey> {
        let shift = self.config.shift();
        match shape {
            Shape::Polygon(polygon) => span
                .iter()
                .filter(|key| shape.intersects_aabb(&key.bounds(shift, polygon.min_y(), polygon.max_y())))
                .collect(),
            _ => span.iter().collect(),
        }
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}
