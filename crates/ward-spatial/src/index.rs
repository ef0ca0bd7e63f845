//! Per-world region index.

use std::{collections::BTreeMap, sync::Arc};

use ward_geom::{BlockPos, Shape};
use ward_region::{Region, RegionError, RegionId, RegionResult};

use crate::{ApplicableSet, GridConfig, SpatialGrid};

/// What happens to the children of a removed region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemovalStrategy {
    /// Children take the removed region's parent (or none).
    #[default]
    Reparent,
    /// Children lose their parent link.
    UnsetParentInChildren,
    /// Children and all their descendants are removed too.
    RemoveChildren,
}

/// All regions of one world, bucketed for spatial lookup.
///
/// The index owns its regions. Every edit goes through a method that
/// validates first and applies second, so a failed call leaves the index
/// untouched. Regions are handed out as `Arc` snapshots; an edit replaces the
/// `Arc` instead of mutating through it.
#[derive(Clone, Debug, Default)]
pub struct RegionIndex {
    regions: BTreeMap<RegionId, Arc<Region>>,
    grid: SpatialGrid,
}

impl RegionIndex {
    /// An empty index.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        Self {
            regions: BTreeMap::new(),
            grid: SpatialGrid::new(config),
        }
    }

    /// Build an index from a bulk list, as read from storage.
    ///
    /// Regions may appear in any order relative to their parents. Fails on
    /// duplicate ids, dangling parent links and inheritance cycles.
    pub fn from_regions(config: GridConfig, regions: impl IntoIterator<Item = Region>) -> RegionResult<Self> {
        let mut index = Self::new(config);

        for region in regions {
            if index.regions.contains_key(region.id()) {
                return Err(RegionError::DuplicateRegionId(region.id().clone()));
            }
            index.regions.insert(region.id().clone(), Arc::new(region));
        }

        for region in index.regions.values() {
            if let Some(parent) = region.parent() {
                if !index.regions.contains_key(parent) {
                    return Err(RegionError::RegionNotFound(parent.to_string()));
                }
            }
        }

        index.check_acyclic()?;

        for (id, region) in &index.regions {
            index.grid.insert(id, region.shape());
        }

        tracing::debug!(
            "built region index: {} regions, {} cells, {} oversized",
            index.regions.len(),
            index.grid.cell_count(),
            index.grid.oversized().len()
        );

        Ok(index)
    }

    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        self.grid.config()
    }

    #[must_use]
    pub const fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Add a region. Its parent, if set, must already be indexed.
    pub fn insert(&mut self, region: Region) -> RegionResult<Arc<Region>> {
        if self.regions.contains_key(region.id()) {
            return Err(RegionError::DuplicateRegionId(region.id().clone()));
        }
        if let Some(parent) = region.parent() {
            self.check_parent(region.id(), parent)?;
        }

        let region = Arc::new(region);
        self.grid.insert(region.id(), region.shape());
        self.regions.insert(region.id().clone(), Arc::clone(&region));

        tracing::debug!("indexed region '{}'", region.id());
        Ok(region)
    }

    /// Remove a region, reparenting its children to its own parent.
    pub fn remove(&mut self, id: &str) -> RegionResult<Vec<Arc<Region>>> {
        self.remove_with(id, RemovalStrategy::Reparent)
    }

    /// Remove a region, handling its children as asked.
    ///
    /// Returns every removed region, the requested one first.
    pub fn remove_with(&mut self, id: &str, strategy: RemovalStrategy) -> RegionResult<Vec<Arc<Region>>> {
        let target = Arc::clone(self.require(id)?);
        let id = target.id().clone();

        let mut removed = vec![];

        match strategy {
            RemovalStrategy::RemoveChildren => {
                for descendant in self.descendants(&id) {
                    removed.extend(self.detach(&descendant));
                }
            }
            RemovalStrategy::Reparent | RemovalStrategy::UnsetParentInChildren => {
                let new_parent = match strategy {
                    RemovalStrategy::Reparent => target.parent().cloned(),
                    _ => None,
                };

                let mut updated = Vec::new();
                for child in self.children(&id) {
                    let mut child = Region::clone(child);
                    child.set_parent(new_parent.clone())?;
                    updated.push(child);
                }
                for child in updated {
                    self.regions.insert(child.id().clone(), Arc::new(child));
                }
            }
        }

        removed.insert(0, target);
        self.detach(&id);

        tracing::debug!("removed region '{}' ({} total, {:?})", id, removed.len(), strategy);
        Ok(removed)
    }

    /// Apply an edit to one region.
    ///
    /// The closure works on a copy. The copy replaces the indexed region only
    /// if the closure succeeds and the edited parent link stays valid.
    pub fn update<F>(&mut self, id: &str, edit: F) -> RegionResult<Arc<Region>>
    where
        F: FnOnce(&mut Region) -> RegionResult<()>,
    {
        let current = Arc::clone(self.require(id)?);
        let mut updated = Region::clone(&current);
        edit(&mut updated)?;

        if updated.parent() != current.parent() {
            if let Some(parent) = updated.parent() {
                self.check_parent(updated.id(), parent)?;
            }
        }

        if updated.shape() != current.shape() {
            self.grid.remove(current.id(), current.shape());
            self.grid.insert(updated.id(), updated.shape());
        }

        let updated = Arc::new(updated);
        self.regions.insert(updated.id().clone(), Arc::clone(&updated));
        tracing::trace!("updated region '{}'", updated.id());
        Ok(updated)
    }

    /// Set or clear a region's parent.
    pub fn set_parent(&mut self, id: &str, parent: Option<&str>) -> RegionResult<Arc<Region>> {
        let parent = parent.map(RegionId::new).transpose()?;
        self.update(id, |region| region.set_parent(parent))
    }

    /// Give a region a new id, repointing its children.
    pub fn rename(&mut self, id: &str, new_id: RegionId) -> RegionResult<Arc<Region>> {
        let current = Arc::clone(self.require(id)?);
        if self.regions.contains_key(&new_id) {
            return Err(RegionError::DuplicateRegionId(new_id));
        }

        let renamed = Arc::new(current.renamed(new_id.clone())?);

        let mut children = Vec::new();
        for child in self.children(current.id()) {
            let mut child = Region::clone(child);
            child.set_parent(Some(new_id.clone()))?;
            children.push(child);
        }

        self.detach(current.id());
        self.grid.insert(renamed.id(), renamed.shape());
        self.regions.insert(new_id, Arc::clone(&renamed));
        for child in children {
            self.regions.insert(child.id().clone(), Arc::new(child));
        }

        tracing::debug!("renamed region '{}' to '{}'", current.id(), renamed.id());
        Ok(renamed)
    }

    /// Look up a region. Ids are matched case-insensitively.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Region>> {
        match self.regions.get(id) {
            Some(region) => Some(region),
            None => self.regions.get(id.to_ascii_lowercase().as_str()),
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The `__global__` region, if defined.
    #[must_use]
    pub fn global(&self) -> Option<&Arc<Region>> {
        self.regions.get(RegionId::GLOBAL)
    }

    /// All regions sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Region>> {
        self.regions.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions whose parent is `id`, sorted by id.
    pub fn children<'a>(&'a self, id: &'a RegionId) -> impl Iterator<Item = &'a Arc<Region>> + 'a {
        self.regions.values().filter(move |region| region.parent() == Some(id))
    }

    /// Parent chain of a region, nearest first, excluding the region itself.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<&Arc<Region>> {
        let mut chain = Vec::new();
        let mut next = self.get(id).and_then(|region| region.parent());
        while let Some(parent) = next.and_then(|parent| self.regions.get(parent)) {
            if chain.len() >= self.regions.len() {
                break;
            }
            chain.push(parent);
            next = parent.parent();
        }
        chain
    }

    /// Every region whose geometry contains the block, plus their ancestors
    /// and the global region.
    #[must_use]
    pub fn regions_containing(&self, pos: BlockPos) -> ApplicableSet {
        let direct = self
            .grid
            .candidates_at(pos)
            .filter_map(|id| self.regions.get(id))
            .filter(|region| region.contains(pos))
            .cloned()
            .collect();

        ApplicableSet::build(direct, self.global().cloned(), |id| self.regions.get(id))
    }

    /// Every region whose geometry shares a block with `shape`, plus their
    /// ancestors and the global region.
    #[must_use]
    pub fn regions_intersecting(&self, shape: &Shape) -> ApplicableSet {
        let direct = if shape.is_global() {
            self.regions.values().filter(|region| !region.is_global()).cloned().collect()
        } else {
            self.grid
                .candidates_in(&shape.bounding_box())
                .into_iter()
                .filter_map(|id| self.regions.get(id))
                .filter(|region| region.intersects(shape))
                .cloned()
                .collect()
        };

        ApplicableSet::build(direct, self.global().cloned(), |id| self.regions.get(id))
    }

    fn require(&self, id: &str) -> RegionResult<&Arc<Region>> {
        self.get(id).ok_or_else(|| RegionError::RegionNotFound(id.to_owned()))
    }

    /// `parent` must exist and must not have `child` among its ancestors.
    fn check_parent(&self, child: &RegionId, parent: &RegionId) -> RegionResult<()> {
        if !self.regions.contains_key(parent) {
            return Err(RegionError::RegionNotFound(parent.to_string()));
        }

        let mut next = Some(parent);
        let mut steps = 0;
        while let Some(current) = next {
            if current == child {
                return Err(RegionError::CyclicParent {
                    child: child.clone(),
                    parent: parent.clone(),
                });
            }
            steps += 1;
            if steps > self.regions.len() {
                break;
            }
            next = self.regions.get(current).and_then(|region| region.parent());
        }

        Ok(())
    }

    /// Walk every chain once, failing on the first link that loops back.
    fn check_acyclic(&self) -> RegionResult<()> {
        let mut done = std::collections::BTreeSet::new();

        for start in self.regions.keys() {
            let mut path = Vec::new();
            let mut next = Some(start);

            while let Some(current) = next {
                if done.contains(current) {
                    break;
                }
                if path.contains(&current) {
                    let child = path.last().copied().unwrap_or(current);
                    return Err(RegionError::CyclicParent {
                        child: child.clone(),
                        parent: current.clone(),
                    });
                }
                path.push(current);
                next = self.regions.get(current).and_then(|region| region.parent());
            }

            done.extend(path);
        }

        Ok(())
    }

    /// A region's descendants, children before grandchildren.
    fn descendants(&self, id: &RegionId) -> Vec<RegionId> {
        let mut found = Vec::new();
        let mut frontier = vec![id.clone()];

        while let Some(current) = frontier.pop() {
            for child in self.children(&current) {
                if !found.contains(child.id()) && child.id() != id {
                    found.push(child.id().clone());
                    frontier.push(child.id().clone());
                }
            }
        }

        found
    }

    fn detach(&mut self, id: &RegionId) -> Option<Arc<Region>> {
        let region = self.regions.remove(id)?;
        self.grid.remove(id, region.shape());
        Some(region)
    }
}
