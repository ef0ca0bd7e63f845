//! LMDB backend.

use std::path::Path;

use heed::{
    Database, Env, EnvOpenOptions,
    types::{Bytes, Str},
};
use ward_region::RegionRecord;

use crate::{RegionStore, StorageResult, check_world_name};

/// Stores every world in one LMDB environment.
///
/// The key is the world name and the value is the bincode-encoded record
/// list, so a save replaces a world in a single write transaction.
pub struct LmdbStore {
    env: Env,
    db: Database<Str, Bytes>,
}

impl LmdbStore {
    /// Open or create the environment at the given directory.
    ///
    /// # Safety
    /// Uses unsafe to call heed's open method which requires ensuring
    /// the environment is not opened multiple times with different options.
    #[allow(unsafe_code)]
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        // SAFETY: one store per directory is opened by the manager.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(1024 * 1024 * 1024) // 1GB max
                .max_dbs(1)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let db = env.create_database(&mut wtxn, Some("regions"))?;
        wtxn.commit()?;

        tracing::debug!("opened region database at {}", path.display());
        Ok(Self { env, db })
    }
}

impl RegionStore for LmdbStore {
    fn load(&self, world: &str) -> StorageResult<Vec<RegionRecord>> {
        check_world_name(world)?;

        let rtxn = self.env.read_txn()?;
        let Some(bytes) = self.db.get(&rtxn, world)? else {
            return Ok(Vec::new());
        };

        let records: Vec<RegionRecord> = bincode::deserialize(bytes)?;
        tracing::trace!("loaded {} regions for '{}'", records.len(), world);
        Ok(records)
    }

    fn save(&self, world: &str, records: &[RegionRecord]) -> StorageResult<()> {
        check_world_name(world)?;
        let bytes = bincode::serialize(records)?;

        let mut wtxn = self.env.write_txn()?;
        self.db.put(&mut wtxn, world, &bytes)?;
        wtxn.commit()?;

        tracing::trace!("persisted {} regions for '{}' ({} bytes)", records.len(), world, bytes.len());
        Ok(())
    }

    fn worlds(&self) -> StorageResult<Vec<String>> {
        let rtxn = self.env.read_txn()?;
        let mut worlds = Vec::new();
        for entry in self.db.iter(&rtxn)? {
            let (world, _) = entry?;
            worlds.push(world.to_owned());
        }
        Ok(worlds)
    }

    fn name(&self) -> &'static str {
        "lmdb"
    }
}
