//! Region persistence.
//!
//! A [`RegionStore`] saves and loads the complete record list of a world.
//! Backends:
//!
//! - [`JsonStore`]: `<root>/<world>/regions.json`, human-editable
//! - [`LmdbStore`]: one LMDB environment, bincode values keyed by world
//! - [`MemoryStore`]: process memory, for tests and throwaway worlds
//!
//! Records are validated when they are turned back into regions, not here;
//! a store hands back exactly what it was given.

mod error;
mod json;
mod lmdb;
mod store;

pub use error::{StorageError, StorageResult};
pub use json::JsonStore;
pub use lmdb::LmdbStore;
pub use store::{MemoryStore, RegionStore, StoreKind, check_world_name, open_store};
