//! JSON file backend.

use std::{
    fs,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use ward_region::RegionRecord;

use crate::{RegionStore, StorageError, StorageResult, check_world_name};

const FILE_NAME: &str = "regions.json";
const FORMAT_VERSION: u32 = 1;

/// On-disk layout of one world's file.
#[derive(Serialize, Deserialize)]
struct RegionFile {
    version: u32,
    regions: Vec<RegionRecord>,
}

/// Stores each world as `<root>/<world>/regions.json`.
///
/// Saves write a temporary file next to the target and rename it over, so a
/// crash mid-save leaves the previous file intact.
#[derive(Clone, Debug)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a world's region file.
    pub fn path_for(&self, world: &str) -> StorageResult<PathBuf> {
        check_world_name(world)?;
        Ok(self.root.join(world).join(FILE_NAME))
    }
}

impl RegionStore for JsonStore {
    fn load(&self, world: &str) -> StorageResult<Vec<RegionRecord>> {
        let path = self.path_for(world)?;

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("no region file at {}, starting empty", path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let contents: RegionFile = serde_json::from_reader(BufReader::new(file))?;
        if contents.version != FORMAT_VERSION {
            return Err(StorageError::Corrupt {
                world: world.to_owned(),
                reason: format!("unsupported format version {}", contents.version),
            });
        }

        tracing::debug!("loaded {} regions from {}", contents.regions.len(), path.display());
        Ok(contents.regions)
    }

    fn save(&self, world: &str, records: &[RegionRecord]) -> StorageResult<()> {
        let path = self.path_for(world)?;
        let dir = self.root.join(world);
        fs::create_dir_all(&dir)?;

        // Each save gets its own temp file.
        let mut tmp = tempfile::Builder::new().prefix(FILE_NAME).suffix(".tmp").tempfile_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            let contents = RegionFile {
                version: FORMAT_VERSION,
                regions: records.to_vec(),
            };
            serde_json::to_writer_pretty(&mut writer, &contents)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|err| err.error)?;

        tracing::debug!("saved {} regions to {}", records.len(), path.display());
        Ok(())
    }

    fn worlds(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut worlds = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().join(FILE_NAME).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if check_world_name(name).is_ok() {
                    worlds.push(name.to_owned());
                }
            }
        }
        worlds.sort();
        Ok(worlds)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
