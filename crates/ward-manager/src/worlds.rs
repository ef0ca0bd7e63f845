//! The table of loaded worlds.

use std::sync::Arc;

use hashbrown::{HashMap, hash_map::Entry};
use parking_lot::RwLock;
use ward_geom::BlockPos;
use ward_region::{FlagRegistry, Subject};
use ward_resolve::FlagResolution;
use ward_storage::{RegionStore, check_world_name};

use crate::{ManagerConfig, ManagerError, ManagerResult, RegionManager};

/// One [`RegionManager`] per loaded world.
///
/// Worlds never share a lock: the table lock is only held to look a manager
/// up, insert it or take it out.
pub struct Worlds {
    config: ManagerConfig,
    registry: Arc<FlagRegistry>,
    store: Arc<dyn RegionStore>,
    worlds: RwLock<HashMap<String, Arc<RegionManager>>>,
}

impl Worlds {
    #[must_use]
    pub fn new(config: ManagerConfig, registry: Arc<FlagRegistry>, store: Arc<dyn RegionStore>) -> Self {
        Self {
            config,
            registry,
            store,
            worlds: RwLock::new(HashMap::new()),
        }
    }

    /// Open the configured store and start with no worlds loaded.
    pub fn open(config: ManagerConfig, registry: Arc<FlagRegistry>) -> ManagerResult<Self> {
        let store = config.open_store()?;
        Ok(Self::new(config, registry, store))
    }

    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn RegionStore> {
        &self.store
    }

    /// Load a world from the store and register its manager.
    ///
    /// If loading fails the world stays unloaded.
    pub fn load_world(&self, world: &str) -> ManagerResult<Arc<RegionManager>> {
        check_world_name(world)?;
        if self.worlds.read().contains_key(world) {
            return Err(ManagerError::WorldAlreadyLoaded(world.to_owned()));
        }

        let manager = RegionManager::new(world, self.config.grid, Arc::clone(&self.registry), Arc::clone(&self.store))
            .with_autosave(self.config.autosave);
        if let Err(err) = manager.load() {
            tracing::warn!("world '{}' failed to load: {}", world, err);
            return Err(err);
        }
        let manager = Arc::new(manager);

        match self.worlds.write().entry(world.to_owned()) {
            Entry::Occupied(_) => Err(ManagerError::WorldAlreadyLoaded(world.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&manager));
                tracing::info!("world '{}' loaded", world);
                Ok(manager)
            }
        }
    }

    /// Unregister a world, saving it first if it has unsaved edits and the
    /// config asks for it.
    ///
    /// If that save fails the world stays loaded.
    pub fn unload_world(&self, world: &str) -> ManagerResult<()> {
        let manager = self
            .worlds
            .write()
            .remove(world)
            .ok_or_else(|| ManagerError::WorldNotLoaded(world.to_owned()))?;

        if self.config.save_on_unload {
            if let Err(err) = manager.save_if_dirty() {
                self.worlds.write().insert(world.to_owned(), manager);
                return Err(err);
            }
        }

        tracing::info!("world '{}' unloaded", world);
        Ok(())
    }

    pub fn get(&self, world: &str) -> ManagerResult<Arc<RegionManager>> {
        self.worlds
            .read()
            .get(world)
            .cloned()
            .ok_or_else(|| ManagerError::WorldNotLoaded(world.to_owned()))
    }

    /// Names of loaded worlds, sorted.
    #[must_use]
    pub fn loaded(&self) -> Vec<String> {
        let mut names: Vec<_> = self.worlds.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve a flag in a loaded world.
    pub fn query_flag(&self, world: &str, pos: BlockPos, flag: &str, subject: Option<&dyn Subject>) -> ManagerResult<FlagResolution> {
        self.get(world)?.query_flag(pos, flag, subject)
    }

    /// Save every loaded world with unsaved edits. Returns how many were saved.
    pub fn save_all(&self) -> ManagerResult<usize> {
        let managers: Vec<_> = self.worlds.read().values().cloned().collect();
        let mut saved = 0;
        for manager in managers {
            if manager.save_if_dirty()? {
                saved += 1;
            }
        }
        Ok(saved)
    }
}

impl std::fmt::Debug for Worlds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worlds")
            .field("loaded", &self.loaded())
            .field("store", &self.store.name())
            .finish_non_exhaustive()
    }
}
