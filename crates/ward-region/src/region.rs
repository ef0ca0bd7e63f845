//! The region entity.

use std::collections::BTreeMap;

use ward_geom::{Aabb, BlockPos, Shape};

use crate::{Domain, FlagEntry, FlagRegistry, RegionError, RegionId, RegionResult, Subject};

/// A named, prioritized volume with flags and owner/member domains.
///
/// A standalone `Region` is a plain value. Once inserted into a world index
/// it is only changed through that index, which re-validates parent links
/// and geometry on every edit.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    id: RegionId,
    priority: i32,
    shape: Shape,
    parent: Option<RegionId>,
    flags: BTreeMap<String, FlagEntry>,
    owners: Domain,
    members: Domain,
}

impl Region {
    /// Create a region with priority 0 and no flags.
    ///
    /// Fails if the global shape is used with an id other than `__global__`,
    /// or `__global__` with any other shape.
    pub fn new(id: RegionId, shape: Shape) -> RegionResult<Self> {
        check_global(&id, &shape)?;
        Ok(Self {
            id,
            priority: 0,
            shape,
            parent: None,
            flags: BTreeMap::new(),
            owners: Domain::new(),
            members: Domain::new(),
        })
    }

    /// The world's `__global__` region.
    #[must_use]
    pub fn global() -> Self {
        Self {
            id: RegionId::global(),
            priority: 0,
            shape: Shape::Global,
            parent: None,
            flags: BTreeMap::new(),
            owners: Domain::new(),
            members: Domain::new(),
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Replace the geometry, keeping every other field.
    pub fn set_shape(&mut self, shape: Shape) -> RegionResult<()> {
        check_global(&self.id, &shape)?;
        self.shape = shape;
        Ok(())
    }

    #[must_use]
    pub fn parent(&self) -> Option<&RegionId> {
        self.parent.as_ref()
    }

    /// Set or clear the parent link.
    ///
    /// Only a self-reference is caught here; longer cycles need the whole
    /// world and are rejected by the index.
    pub fn set_parent(&mut self, parent: Option<RegionId>) -> RegionResult<()> {
        if let Some(parent) = &parent {
            if *parent == self.id {
                return Err(RegionError::CyclicParent {
                    child: self.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
        self.parent = parent;
        Ok(())
    }

    #[must_use]
    pub fn flags(&self) -> &BTreeMap<String, FlagEntry> {
        &self.flags
    }

    #[must_use]
    pub fn flag(&self, name: &str) -> Option<&FlagEntry> {
        self.flags.get(name)
    }

    /// Set a flag after checking it against the registry.
    ///
    /// Returns the entry it replaced, if any.
    pub fn set_flag(&mut self, registry: &FlagRegistry, name: &str, entry: FlagEntry) -> RegionResult<Option<FlagEntry>> {
        let def = registry.check(name, &entry.value)?;
        Ok(self.flags.insert(def.name.clone(), entry))
    }

    /// Remove a flag. Returns the removed entry, if any.
    pub fn clear_flag(&mut self, name: &str) -> Option<FlagEntry> {
        self.flags.remove(&name.to_ascii_lowercase())
    }

    #[must_use]
    pub const fn owners(&self) -> &Domain {
        &self.owners
    }

    pub fn owners_mut(&mut self) -> &mut Domain {
        &mut self.owners
    }

    #[must_use]
    pub const fn members(&self) -> &Domain {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut Domain {
        &mut self.members
    }

    /// Whether the subject is listed as an owner of this region alone.
    pub fn has_owner(&self, subject: &dyn Subject) -> bool {
        self.owners.contains(subject)
    }

    /// Whether the subject is listed as a member or owner of this region alone.
    pub fn has_member(&self, subject: &dyn Subject) -> bool {
        self.members.contains(subject) || self.owners.contains(subject)
    }

    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.shape.is_global()
    }

    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        self.shape.contains(pos)
    }

    #[must_use]
    pub fn intersects(&self, shape: &Shape) -> bool {
        self.shape.intersects(shape)
    }

    #[must_use]
    pub const fn bounding_box(&self) -> Aabb {
        self.shape.bounding_box()
    }

    #[must_use]
    pub fn volume(&self) -> u64 {
        self.shape.volume()
    }

    /// A copy of this region under a new id.
    pub fn renamed(&self, id: RegionId) -> RegionResult<Self> {
        check_global(&id, &self.shape)?;
        Ok(Self { id, ..self.clone() })
    }
}

fn check_global(id: &RegionId, shape: &Shape) -> RegionResult<()> {
    if id.is_global() == shape.is_global() {
        Ok(())
    } else {
        Err(RegionError::GlobalShapeMismatch(id.clone()))
    }
}
