//! Region validation errors.

use thiserror::Error;
use ward_geom::GeometryError;

use crate::{FlagKind, RegionId};

/// Every way an administrative operation on regions can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// A region with this id already exists in the world.
    #[error("region '{0}' already exists")]
    DuplicateRegionId(RegionId),

    /// No region with this id exists in the world.
    #[error("region '{0}' not found")]
    RegionNotFound(String),

    /// The shape is degenerate or self-intersecting.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// Setting this parent would close an inheritance loop.
    #[error("setting parent of '{child}' to '{parent}' would create an inheritance cycle")]
    CyclicParent { child: RegionId, parent: RegionId },

    /// The flag name has no registered definition.
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),

    /// The value's variant differs from the flag's declared kind.
    #[error("flag '{flag}' expects a {expected} value, got {found}")]
    TypeMismatch {
        flag: String,
        expected: FlagKind,
        found: FlagKind,
    },

    /// Doubles must be finite; stores cannot represent NaN or infinities.
    #[error("flag '{0}' only accepts finite numbers")]
    NonFiniteValue(String),

    /// The id contains characters outside `[A-Za-z0-9_,'\-+/]` or is empty.
    #[error("invalid region id '{0}'")]
    InvalidRegionId(String),

    /// Only `__global__` may use the global shape, and it may use no other.
    #[error("region '{0}': the global shape is reserved for the `__global__` region")]
    GlobalShapeMismatch(RegionId),

    /// A flag name was registered twice with different definitions.
    #[error("flag '{0}' is already registered with a different definition")]
    ConflictingFlag(String),
}

/// Result type for region operations.
pub type RegionResult<T> = Result<T, RegionError>;
