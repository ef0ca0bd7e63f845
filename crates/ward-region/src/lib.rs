//! Protected region entities.
//!
//! A [`Region`] is a named, prioritized volume carrying typed flags and two
//! [`Domain`]s (owners and members). Flag names are checked against a
//! [`FlagRegistry`] before they are stored, so a region never holds a value
//! whose variant disagrees with the flag's declared [`FlagKind`].
//!
//! ```text
//! Region
//!   ├── id        RegionId (lowercase, validated)
//!   ├── priority  i32
//!   ├── shape     ward_geom::Shape
//!   ├── parent    Option<RegionId>   inheritance only
//!   ├── flags     name -> FlagEntry { value, group, override_immune }
//!   ├── owners    Domain { players, groups }
//!   └── members   Domain { players, groups }
//! ```
//!
//! [`RegionRecord`] is the serializable form used by storage backends.

mod domain;
mod error;
mod flag;
mod id;
mod record;
mod region;
mod registry;

pub use domain::{Domain, Player, Principal, Subject};
pub use error::{RegionError, RegionResult};
pub use flag::{FlagEntry, FlagKind, FlagValue, RegionGroup, State};
pub use id::RegionId;
pub use record::{FlagRecord, GeometryRecord, RegionRecord};
pub use region::Region;
pub use registry::{FlagDef, FlagRegistry};
