//! Typed flag values.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Allow/deny state used by permission-style flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Allow,
    Deny,
}

/// The variant tag a flag is declared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Boolean,
    State,
    String,
    Integer,
    Double,
    ActorSet,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Boolean => "boolean",
            Self::State => "state",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::ActorSet => "actor-set",
        })
    }
}

/// A flag value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagValue {
    Boolean(bool),
    State(State),
    String(String),
    Integer(i64),
    Double(f64),
    ActorSet(BTreeSet<Uuid>),
}

impl FlagValue {
    #[must_use]
    pub const fn kind(&self) -> FlagKind {
        match self {
            Self::Boolean(_) => FlagKind::Boolean,
            Self::State(_) => FlagKind::State,
            Self::String(_) => FlagKind::String,
            Self::Integer(_) => FlagKind::Integer,
            Self::Double(_) => FlagKind::Double,
            Self::ActorSet(_) => FlagKind::ActorSet,
        }
    }

    #[must_use]
    pub const fn as_state(&self) -> Option<State> {
        match self {
            Self::State(state) => Some(*state),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_deny(&self) -> bool {
        matches!(self, Self::State(State::Deny))
    }
}

impl From<State> for FlagValue {
    fn from(state: State) -> Self {
        Self::State(state)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Which actors a region's flag entry applies to.
///
/// Membership is judged against the region that is being evaluated, with
/// owners counted as members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionGroup {
    #[default]
    All,
    Members,
    Owners,
    NonMembers,
    NonOwners,
    None,
}

impl RegionGroup {
    /// Whether an actor with the given standing falls in this group.
    #[must_use]
    pub const fn contains(self, is_owner: bool, is_member: bool) -> bool {
        match self {
            Self::All => true,
            Self::Members => is_member || is_owner,
            Self::Owners => is_owner,
            Self::NonMembers => !is_member && !is_owner,
            Self::NonOwners => !is_owner,
            Self::None => false,
        }
    }
}

/// A flag as set on one region.
#[derive(Clone, Debug, PartialEq)]
pub struct FlagEntry {
    pub value: FlagValue,
    /// Actors the value applies to; everyone else sees the flag as unset.
    pub group: RegionGroup,
    /// A deny that region owners cannot bypass.
    pub override_immune: bool,
}

impl FlagEntry {
    /// An entry applying to everyone.
    #[must_use]
    pub fn new(value: impl Into<FlagValue>) -> Self {
        Self {
            value: value.into(),
            group: RegionGroup::All,
            override_immune: false,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: RegionGroup) -> Self {
        self.group = group;
        self
    }

    /// Mark the entry immune to owner bypass.
    #[must_use]
    pub fn immune(mut self) -> Self {
        self.override_immune = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_membership_table() {
        // (group, owner, member, expected)
        let cases = [
            (RegionGroup::All, false, false, true),
            (RegionGroup::Members, false, true, true),
            (RegionGroup::Members, true, false, true),
            (RegionGroup::Members, false, false, false),
            (RegionGroup::Owners, false, true, false),
            (RegionGroup::NonMembers, false, true, false),
            (RegionGroup::NonMembers, true, false, false),
            (RegionGroup::NonMembers, false, false, true),
            (RegionGroup::NonOwners, false, true, true),
            (RegionGroup::NonOwners, true, true, false),
            (RegionGroup::None, true, true, false),
        ];

        for (group, owner, member, expected) in cases {
            assert_eq!(group.contains(owner, member), expected, "{group:?} owner={owner} member={member}");
        }
    }

    #[test]
    fn test_value_serializes_with_kind_tag() {
        let json = serde_json::to_string(&FlagValue::State(State::Deny)).unwrap();
        assert_eq!(json, r#"{"state":"deny"}"#);

        let back: FlagValue = serde_json::from_str(r#"{"integer":20}"#).unwrap();
        assert_eq!(back, FlagValue::Integer(20));
        assert_eq!(back.kind(), FlagKind::Integer);
    }
}
