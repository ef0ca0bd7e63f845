//! The save/load contract and the in-memory backend.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ward_region::RegionRecord;

use crate::{JsonStore, LmdbStore, StorageError, StorageResult};

/// Persists the regions of each world as a whole.
///
/// `save` replaces everything previously stored for the world; `load`
/// returns exactly what the last `save` wrote, or nothing for a world that
/// was never saved.
pub trait RegionStore: Send + Sync {
    fn load(&self, world: &str) -> StorageResult<Vec<RegionRecord>>;

    fn save(&self, world: &str, records: &[RegionRecord]) -> StorageResult<()>;

    /// Names of worlds with saved data, sorted.
    fn worlds(&self) -> StorageResult<Vec<String>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Which backend to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// One `regions.json` per world directory.
    #[default]
    Json,
    /// One LMDB environment, one entry per world.
    Lmdb,
    /// Nothing touches disk.
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "lmdb" => Ok(Self::Lmdb),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Open a backend rooted at `path`. The memory backend ignores the path.
pub fn open_store(kind: StoreKind, path: impl AsRef<Path>) -> StorageResult<Arc<dyn RegionStore>> {
    let store: Arc<dyn RegionStore> = match kind {
        StoreKind::Json => Arc::new(JsonStore::new(path.as_ref())),
        StoreKind::Lmdb => Arc::new(LmdbStore::open(path)?),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::debug!("opened {} region store", store.name());
    Ok(store)
}

/// World names allowed as directory and key names.
pub fn check_world_name(world: &str) -> StorageResult<()> {
    let valid = !world.is_empty()
        && world != "."
        && world != ".."
        && world
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidWorldName(world.to_owned()))
    }
}

/// Keeps records in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    worlds: Mutex<BTreeMap<String, Vec<RegionRecord>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegionStore for MemoryStore {
    fn load(&self, world: &str) -> StorageResult<Vec<RegionRecord>> {
        check_world_name(world)?;
        Ok(self.worlds.lock().get(world).cloned().unwrap_or_default())
    }

    fn save(&self, world: &str, records: &[RegionRecord]) -> StorageResult<()> {
        check_world_name(world)?;
        self.worlds.lock().insert(world.to_owned(), records.to_vec());
        tracing::trace!("stored {} regions for '{}' in memory", records.len(), world);
        Ok(())
    }

    fn worlds(&self) -> StorageResult<Vec<String>> {
        Ok(self.worlds.lock().keys().cloned().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
