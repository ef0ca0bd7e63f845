//! Region managers.
//!
//! A [`RegionManager`] is the façade for one world: it owns the region
//! index behind a reader/writer lock, validates administrative edits, tracks
//! unsaved changes and answers flag queries through the resolver.
//! [`Worlds`] keeps one manager per loaded world and ties their lifecycle to
//! the configured store.
//!
//! ```text
//! host event ─► Worlds::get(world) ─► RegionManager::query_flag(pos, flag, subject)
//!                                        │ read lock: RegionIndex::regions_containing
//!                                        └ no lock:  FlagResolver::resolve
//! ```

pub mod config;
mod error;
mod listing;
mod manager;
mod worlds;

pub use config::ManagerConfig;
pub use error::{ManagerError, ManagerResult};
pub use listing::{RegionFilter, RegionSummary, Relation};
pub use manager::RegionManager;
pub use worlds::Worlds;
