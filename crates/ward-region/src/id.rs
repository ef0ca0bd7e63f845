//! Region identifiers.

use std::{borrow::Borrow, fmt};

use crate::{RegionError, RegionResult};

/// A validated, lowercase region identifier.
///
/// Ids may contain ASCII letters, digits and `_ , ' - + /`. They are folded
/// to lowercase on construction, so `Spawn` and `spawn` name the same region.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(String);

impl RegionId {
    /// Id reserved for the world-wide default region.
    pub const GLOBAL: &'static str = "__global__";

    /// Validate and normalize an id.
    pub fn new(id: impl AsRef<str>) -> RegionResult<Self> {
        let id = id.as_ref();
        if Self::is_valid(id) {
            Ok(Self(id.to_ascii_lowercase()))
        } else {
            Err(RegionError::InvalidRegionId(id.to_owned()))
        }
    }

    /// The id of the global region.
    #[must_use]
    pub fn global() -> Self {
        Self(Self::GLOBAL.to_owned())
    }

    /// Check an id against the allowed character set.
    #[must_use]
    pub fn is_valid(id: &str) -> bool {
        !id.is_empty()
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b',' | b'\'' | b'-' | b'+' | b'/'))
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.0 == Self::GLOBAL
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_fold_to_lowercase() {
        assert_eq!(RegionId::new("Spawn-Town").unwrap().as_str(), "spawn-town");
        assert_eq!(RegionId::new("SPAWN").unwrap(), RegionId::new("spawn").unwrap());
    }

    #[test]
    fn test_rejects_bad_characters() {
        for bad in ["", "has space", "semi;colon", "ünïcode", "dot.dot"] {
            assert_eq!(
                RegionId::new(bad).unwrap_err(),
                RegionError::InvalidRegionId(bad.to_owned()),
                "{bad:?} should be rejected"
            );
        }
        assert!(RegionId::new("a_b,c'd-e+f/g").is_ok());
    }

    #[test]
    fn test_global_id() {
        assert!(RegionId::global().is_global());
        assert!(RegionId::new("__GLOBAL__").unwrap().is_global());
        assert!(!RegionId::new("global").unwrap().is_global());
    }
}
