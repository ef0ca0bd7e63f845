//! Manager configuration.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use ward_spatial::GridConfig;
use ward_storage::{RegionStore, StoreKind, open_store};

use crate::{ManagerError, ManagerResult};

/// Overrides [`ManagerConfig::data_dir`].
pub const DATA_DIR_VAR: &str = "WARD_DATA_DIR";
/// Overrides [`ManagerConfig::backend`] (`json`, `lmdb` or `memory`).
pub const BACKEND_VAR: &str = "WARD_BACKEND";
/// Overrides [`ManagerConfig::autosave`] (`true`/`false`).
pub const AUTOSAVE_VAR: &str = "WARD_AUTOSAVE";

/// Settings shared by every world manager.
///
/// Every field has a default, so `{}` is a complete config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub grid: GridConfig,
    /// Root directory handed to the storage backend.
    pub data_dir: PathBuf,
    pub backend: StoreKind,
    /// Save the world after every successful mutation.
    pub autosave: bool,
    /// Save dirty worlds when they are unloaded.
    pub save_on_unload: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            data_dir: PathBuf::from("worlds"),
            backend: StoreKind::default(),
            autosave: false,
            save_on_unload: true,
        }
    }
}

impl ManagerConfig {
    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> ManagerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManagerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read the file if given, fall back to defaults otherwise, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> ManagerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        tracing::debug!("manager config: {:?}", config);
        Ok(config)
    }

    /// Apply overrides read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> ManagerResult<()> {
        if let Some(dir) = var(DATA_DIR_VAR) {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(value) = var(BACKEND_VAR) {
            self.backend = value.parse().map_err(|_| ManagerError::ConfigEnv {
                var: BACKEND_VAR,
                value: value.clone(),
            })?;
        }

        if let Some(value) = var(AUTOSAVE_VAR) {
            self.autosave = value.parse().map_err(|_| ManagerError::ConfigEnv {
                var: AUTOSAVE_VAR,
                value: value.clone(),
            })?;
        }

        Ok(())
    }

    /// Open the configured backend.
    pub fn open_store(&self) -> ManagerResult<Arc<dyn RegionStore>> {
        Ok(open_store(self.backend, &self.data_dir)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: ManagerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config: ManagerConfig =
            serde_json::from_str(r#"{"backend": "lmdb", "grid": {"cell_shift": 5}, "autosave": true}"#).unwrap();

        assert_eq!(config.backend, StoreKind::Lmdb);
        assert_eq!(config.grid.cell_shift, 5);
        assert_eq!(config.grid.max_cells_per_region, GridConfig::default().max_cells_per_region);
        assert!(config.autosave);
        assert_eq!(config.data_dir, PathBuf::from("worlds"));
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [(DATA_DIR_VAR, "/srv/ward"), (BACKEND_VAR, "Memory"), (AUTOSAVE_VAR, "true")].into();

        let mut config = ManagerConfig::default();
        config.apply_env(|var| env.get(var).map(ToString::to_string)).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/ward"));
        assert_eq!(config.backend, StoreKind::Memory);
        assert!(config.autosave);
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = ManagerConfig::default();
        let err = config
            .apply_env(|var| (var == BACKEND_VAR).then(|| "floppy".to_owned()))
            .unwrap_err();

        assert!(matches!(err, ManagerError::ConfigEnv { var: BACKEND_VAR, .. }));
        assert_eq!(config.backend, StoreKind::Json);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.json");
        std::fs::write(&path, r#"{"data_dir": "data", "save_on_unload": false}"#).unwrap();

        let config = ManagerConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(!config.save_on_unload);

        assert!(matches!(
            ManagerConfig::from_file(dir.path().join("missing.json")).unwrap_err(),
            ManagerError::ConfigRead { .. }
        ));
    }
}
