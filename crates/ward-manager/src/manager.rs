//! The per-world region manager.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::{Mutex, RwLock, RwLockUpgradableReadGuard};
use ward_geom::{BlockPos, Shape};
use ward_region::{
    FlagEntry, FlagRegistry, Principal, Region, RegionId, RegionRecord, RegionResult, State, Subject,
};
use ward_resolve::{FlagResolution, FlagResolver};
use ward_spatial::{ApplicableSet, GridConfig, RegionIndex, RemovalStrategy};
use ward_storage::RegionStore;

use crate::{ManagerResult, RegionFilter, RegionSummary, listing};

/// Owns the authoritative region index of one world.
///
/// Reads share a lock and copy out `Arc` snapshots before any resolution
/// work; writes hold the lock exclusively for the whole edit, so a query sees
/// either the state before an edit or the state after it.
///
/// With autosave on, an edit is applied to a copy of the index, written to
/// the store and only then swapped in; a failed write leaves the index as it
/// was.
pub struct RegionManager {
    world: String,
    index: RwLock<RegionIndex>,
    /// Held from snapshot to finished write, so saves land in edit order.
    save_lock: Mutex<()>,
    registry: Arc<FlagRegistry>,
    store: Arc<dyn RegionStore>,
    dirty: AtomicBool,
    autosave: bool,
}

impl RegionManager {
    /// A manager with an empty index. Call [`RegionManager::load`] to read
    /// the stored regions.
    pub fn new(world: impl Into<String>, grid: GridConfig, registry: Arc<FlagRegistry>, store: Arc<dyn RegionStore>) -> Self {
        Self {
            world: world.into(),
            index: RwLock::new(RegionIndex::new(grid)),
            save_lock: Mutex::new(()),
            registry,
            store,
            dirty: AtomicBool::new(false),
            autosave: false,
        }
    }

    /// Save after every successful mutation.
    #[must_use]
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    #[must_use]
    pub fn world(&self) -> &str {
        &self.world
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<FlagRegistry> {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Replace the index with the stored regions.
    ///
    /// The new index is built without holding the lock and swapped in at
    /// once. On any failure the current index stays as it was.
    pub fn load(&self) -> ManagerResult<usize> {
        let records = self.store.load(&self.world)?;
        let regions = records
            .into_iter()
            .map(|record| record.into_region(&self.registry))
            .collect::<RegionResult<Vec<_>>>()?;

        let grid = *self.index.read().config();
        let index = RegionIndex::from_regions(grid, regions)?;
        let count = index.len();

        *self.index.write() = index;
        self.dirty.store(false, Ordering::Release);

        tracing::info!("loaded {} regions for world '{}' from {} store", count, self.world, self.store.name());
        Ok(count)
    }

    /// Write every region to the store.
    pub fn save(&self) -> ManagerResult<()> {
        let _saving = self.save_lock.lock();
        // Clear first: an edit racing with the save marks the world dirty again.
        self.dirty.store(false, Ordering::Release);
        let records = self.records();

        if let Err(err) = self.write(&records) {
            self.dirty.store(true, Ordering::Release);
            return Err(err);
        }
        Ok(())
    }

    /// Save only if something changed since the last load or save.
    pub fn save_if_dirty(&self) -> ManagerResult<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Records of every region, sorted by id.
    #[must_use]
    pub fn records(&self) -> Vec<RegionRecord> {
        self.index.read().iter().map(|region| RegionRecord::from(&**region)).collect()
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Add a fully built region.
    pub fn define_region(&self, region: Region) -> ManagerResult<Arc<Region>> {
        let id = region.id().clone();
        let region = self.mutate(|index| index.insert(region))?;
        tracing::info!("defined region '{}' in world '{}'", id, self.world);
        Ok(region)
    }

    /// Add a region with default priority and no flags.
    pub fn define(&self, id: &str, shape: Shape) -> ManagerResult<Arc<Region>> {
        self.define_region(Region::new(RegionId::new(id)?, shape)?)
    }

    /// Create the `__global__` region if it does not exist yet.
    pub fn ensure_global(&self) -> ManagerResult<Arc<Region>> {
        if let Some(global) = self.index.read().global() {
            return Ok(Arc::clone(global));
        }
        self.mutate(|index| match index.global() {
            Some(global) => Ok(Arc::clone(global)),
            None => index.insert(Region::global()),
        })
    }

    /// Replace a region's geometry, keeping everything else.
    pub fn redefine_geometry(&self, id: &str, shape: Shape) -> ManagerResult<Arc<Region>> {
        self.edit(id, |region| region.set_shape(shape))
    }

    /// Set a flag. Returns the entry it replaced.
    pub fn set_flag(&self, id: &str, flag: &str, entry: FlagEntry) -> ManagerResult<Option<FlagEntry>> {
        let mut previous = None;
        self.edit(id, |region| {
            previous = region.set_flag(&self.registry, flag, entry)?;
            Ok(())
        })?;
        Ok(previous)
    }

    /// Remove a flag entry, value and group alike. Returns the removed entry.
    pub fn clear_flag(&self, id: &str, flag: &str) -> ManagerResult<Option<FlagEntry>> {
        let name = self.registry.require(flag)?.name.clone();
        let mut removed = None;
        self.edit(id, |region| {
            removed = region.clear_flag(&name);
            Ok(())
        })?;
        Ok(removed)
    }

    pub fn set_priority(&self, id: &str, priority: i32) -> ManagerResult<Arc<Region>> {
        self.edit(id, |region| {
            region.set_priority(priority);
            Ok(())
        })
    }

    /// Set or clear the parent. Fails with `CyclicParent` if the link would
    /// close a loop.
    pub fn set_parent(&self, id: &str, parent: Option<&str>) -> ManagerResult<Arc<Region>> {
        self.mutate(|index| index.set_parent(id, parent))
    }

    /// Returns `false` if the principal was already an owner.
    pub fn add_owner(&self, id: &str, principal: Principal) -> ManagerResult<bool> {
        self.edit_domain(id, |region| region.owners_mut().add(principal))
    }

    /// Returns `false` if the principal was not an owner.
    pub fn remove_owner(&self, id: &str, principal: &Principal) -> ManagerResult<bool> {
        self.edit_domain(id, |region| region.owners_mut().remove(principal))
    }

    /// Returns `false` if the principal was already a member.
    pub fn add_member(&self, id: &str, principal: Principal) -> ManagerResult<bool> {
        self.edit_domain(id, |region| region.members_mut().add(principal))
    }

    /// Returns `false` if the principal was not a member.
    pub fn remove_member(&self, id: &str, principal: &Principal) -> ManagerResult<bool> {
        self.edit_domain(id, |region| region.members_mut().remove(principal))
    }

    /// Remove a region; its children move up to its parent.
    pub fn remove_region(&self, id: &str) -> ManagerResult<Vec<Arc<Region>>> {
        self.remove_region_with(id, RemovalStrategy::Reparent)
    }

    /// Remove a region with an explicit policy for its children.
    pub fn remove_region_with(&self, id: &str, strategy: RemovalStrategy) -> ManagerResult<Vec<Arc<Region>>> {
        let removed = self.mutate(|index| index.remove_with(id, strategy))?;
        tracing::info!("removed {} region(s) from world '{}'", removed.len(), self.world);
        Ok(removed)
    }

    /// Rename a region; children follow.
    pub fn rename_region(&self, id: &str, new_id: &str) -> ManagerResult<Arc<Region>> {
        let new_id = RegionId::new(new_id)?;
        let renamed = self.mutate(|index| index.rename(id, new_id))?;
        tracing::info!("renamed region '{}' to '{}' in world '{}'", id, renamed.id(), self.world);
        Ok(renamed)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Region>> {
        self.index.read().get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Run a closure against the current index under the read lock.
    pub fn with_index<R>(&self, read: impl FnOnce(&RegionIndex) -> R) -> R {
        read(&self.index.read())
    }

    #[must_use]
    pub fn regions_containing(&self, pos: BlockPos) -> ApplicableSet {
        self.index.read().regions_containing(pos)
    }

    #[must_use]
    pub fn regions_intersecting(&self, shape: &Shape) -> ApplicableSet {
        self.index.read().regions_intersecting(shape)
    }

    /// Resolve a flag at a block for an optional subject.
    pub fn query_flag(&self, pos: BlockPos, flag: &str, subject: Option<&dyn Subject>) -> ManagerResult<FlagResolution> {
        let set = self.regions_containing(pos);
        Ok(FlagResolver::new(&self.registry).resolve(&set, flag, subject)?)
    }

    /// Resolve a flag over every region touching a volume.
    pub fn query_flag_volume(&self, shape: &Shape, flag: &str, subject: Option<&dyn Subject>) -> ManagerResult<FlagResolution> {
        let set = self.regions_intersecting(shape);
        Ok(FlagResolver::new(&self.registry).resolve(&set, flag, subject)?)
    }

    /// Resolve several state flags together at a block.
    pub fn test_state(&self, pos: BlockPos, flags: &[&str], subject: Option<&dyn Subject>) -> ManagerResult<Option<State>> {
        let set = self.regions_containing(pos);
        Ok(FlagResolver::new(&self.registry).test_state(&set, flags, subject)?)
    }

    /// Summaries of matching regions, global first, the rest by id.
    #[must_use]
    pub fn list(&self, filter: &RegionFilter<'_>) -> Vec<RegionSummary> {
        listing::list(&self.index.read(), filter)
    }

    /// Regions touching `shape` that `subject` does not own.
    ///
    /// A claim over `shape` should be refused while this is non-empty.
    #[must_use]
    pub fn overlapping_unowned(&self, shape: &Shape, subject: &dyn Subject) -> Vec<Arc<Region>> {
        let set = self.regions_intersecting(shape);
        set.direct()
            .iter()
            .filter(|region| !set.chain(region).any(|link| link.has_owner(subject)))
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn write(&self, records: &[RegionRecord]) -> ManagerResult<()> {
        if let Err(err) = self.store.save(&self.world, records) {
            tracing::warn!("failed to save world '{}': {}", self.world, err);
            return Err(err.into());
        }
        tracing::debug!("saved {} regions for world '{}'", records.len(), self.world);
        Ok(())
    }

    fn mutate<T>(&self, apply: impl FnOnce(&mut RegionIndex) -> RegionResult<T>) -> ManagerResult<T> {
        self.commit(|index| Ok((apply(index)?, true)))
    }

    /// Apply an edit that reports whether it changed anything. Unchanged
    /// edits neither mark the world dirty nor autosave.
    fn commit<T>(&self, apply: impl FnOnce(&mut RegionIndex) -> RegionResult<(T, bool)>) -> ManagerResult<T> {
        if !self.autosave {
            let (out, changed) = apply(&mut self.index.write())?;
            if changed {
                self.dirty.store(true, Ordering::Release);
            }
            return Ok(out);
        }

        // Other writers wait on the upgradable guard; readers keep going
        // against the current index until the swap.
        let current = self.index.upgradable_read();
        let mut next = RegionIndex::clone(&current);
        let (out, changed) = apply(&mut next)?;
        if !changed {
            return Ok(out);
        }

        let _saving = self.save_lock.lock();
        let records: Vec<_> = next.iter().map(|region| RegionRecord::from(&**region)).collect();
        self.write(&records)?;

        *RwLockUpgradableReadGuard::upgrade(current) = next;
        self.dirty.store(false, Ordering::Release);
        Ok(out)
    }

    fn edit(&self, id: &str, edit: impl FnOnce(&mut Region) -> RegionResult<()>) -> ManagerResult<Arc<Region>> {
        self.mutate(|index| index.update(id, edit))
    }

    fn edit_domain(&self, id: &str, edit: impl FnOnce(&mut Region) -> bool) -> ManagerResult<bool> {
        self.commit(|index| {
            let mut changed = false;
            index.update(id, |region| {
                changed = edit(region);
                Ok(())
            })?;
            Ok((changed, changed))
        })
    }
}

impl std::fmt::Debug for RegionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionManager")
            .field("world", &self.world)
            .field("regions", &self.len())
            .field("store", &self.store.name())
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}
