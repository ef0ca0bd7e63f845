//! Owner and member sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An acting entity, as seen by the engine.
///
/// Identity and group data belong to the host: the engine asks through this
/// trait whenever a domain lists groups.
pub trait Subject {
    /// Unique id of the actor.
    fn id(&self) -> Uuid;

    /// Whether the actor belongs to a named group (lowercase).
    fn is_in_group(&self, group: &str) -> bool;
}

/// A plain [`Subject`] with a fixed group list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Player {
    id: Uuid,
    groups: BTreeSet<String>,
}

impl Player {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            groups: BTreeSet::new(),
        }
    }

    /// Add a group membership.
    #[must_use]
    pub fn with_group(mut self, group: impl AsRef<str>) -> Self {
        self.groups.insert(group.as_ref().to_ascii_lowercase());
        self
    }
}

impl Subject for Player {
    fn id(&self) -> Uuid {
        self.id
    }

    fn is_in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

/// Something that can be listed in a domain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Principal {
    Player(Uuid),
    Group(String),
}

impl Principal {
    /// A group principal. Group names are case-insensitive.
    #[must_use]
    pub fn group(name: impl AsRef<str>) -> Self {
        Self::Group(name.as_ref().to_ascii_lowercase())
    }
}

impl From<Uuid> for Principal {
    fn from(id: Uuid) -> Self {
        Self::Player(id)
    }
}

/// A set of players and groups: a region's owners or its members.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default)]
    players: BTreeSet<Uuid>,
    #[serde(default, deserialize_with = "lowercase_groups")]
    groups: BTreeSet<String>,
}

fn lowercase_groups<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
    let groups = BTreeSet::<String>::deserialize(deserializer)?;
    Ok(groups.into_iter().map(|group| group.to_ascii_lowercase()).collect())
}

impl Domain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a principal. Returns `false` if it was already present.
    pub fn add(&mut self, principal: Principal) -> bool {
        match principal {
            Principal::Player(id) => self.players.insert(id),
            Principal::Group(name) => self.groups.insert(name.to_ascii_lowercase()),
        }
    }

    /// Remove a principal. Returns `false` if it was absent.
    pub fn remove(&mut self, principal: &Principal) -> bool {
        match principal {
            Principal::Player(id) => self.players.remove(id),
            Principal::Group(name) => self.groups.remove(&name.to_ascii_lowercase()),
        }
    }

    /// Whether the domain lists this principal explicitly.
    #[must_use]
    pub fn has(&self, principal: &Principal) -> bool {
        match principal {
            Principal::Player(id) => self.players.contains(id),
            Principal::Group(name) => self.groups.contains(&name.to_ascii_lowercase()),
        }
    }

    /// Whether the subject is listed directly or through one of its groups.
    pub fn contains(&self, subject: &dyn Subject) -> bool {
        self.players.contains(&subject.id()) || self.groups.iter().any(|group| subject.is_in_group(group))
    }

    /// Whether a player id is listed directly, ignoring groups.
    #[must_use]
    pub fn contains_player(&self, id: Uuid) -> bool {
        self.players.contains(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.players.iter().copied()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len() + self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.groups.clear();
    }
}
