//! Serializable region records exchanged with storage backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ward_geom::{Aabb, BlockPos, ColumnPos, Polygon, Shape};

use crate::{Domain, FlagEntry, FlagRegistry, FlagValue, Region, RegionGroup, RegionId, RegionResult};

/// Storage form of a region.
///
/// Records are not validated until [`RegionRecord::into_region`]; a record
/// loaded from disk may name unknown flags or carry a broken outline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: String,
    #[serde(default)]
    pub priority: i32,
    pub geometry: GeometryRecord,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub flags: BTreeMap<String, FlagRecord>,
    #[serde(default)]
    pub owners: Domain,
    #[serde(default)]
    pub members: Domain,
}

/// Storage form of a shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryRecord {
    Cuboid { min: BlockPos, max: BlockPos },
    Polygon { points: Vec<ColumnPos>, min_y: i32, max_y: i32 },
    Global,
}

/// Storage form of a flag entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagRecord {
    pub value: FlagValue,
    #[serde(default)]
    pub group: RegionGroup,
    #[serde(default)]
    pub override_immune: bool,
}

impl RegionRecord {
    /// Validate the record and build a region from it.
    ///
    /// The parent link is copied as-is; whether the parent exists and whether
    /// the link closes a cycle is for the index to decide.
    pub fn into_region(self, registry: &FlagRegistry) -> RegionResult<Region> {
        let id = RegionId::new(&self.id)?;
        let shape = self.geometry.into_shape()?;

        let mut region = Region::new(id, shape)?.with_priority(self.priority);

        if let Some(parent) = self.parent {
            region.set_parent(Some(RegionId::new(parent)?))?;
        }

        for (name, flag) in self.flags {
            let entry = FlagEntry {
                value: flag.value,
                group: flag.group,
                override_immune: flag.override_immune,
            };
            region.set_flag(registry, &name, entry)?;
        }

        *region.owners_mut() = self.owners;
        *region.members_mut() = self.members;

        Ok(region)
    }
}

impl From<&Region> for RegionRecord {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id().to_string(),
            priority: region.priority(),
            geometry: GeometryRecord::from(region.shape()),
            parent: region.parent().map(ToString::to_string),
            flags: region
                .flags()
                .iter()
                .map(|(name, entry)| {
                    let record = FlagRecord {
                        value: entry.value.clone(),
                        group: entry.group,
                        override_immune: entry.override_immune,
                    };
                    (name.clone(), record)
                })
                .collect(),
            owners: region.owners().clone(),
            members: region.members().clone(),
        }
    }
}

impl GeometryRecord {
    /// Validate and build the shape.
    pub fn into_shape(self) -> RegionResult<Shape> {
        Ok(match self {
            Self::Cuboid { min, max } => Shape::Cuboid(Aabb::new(min, max)),
            Self::Polygon { points, min_y, max_y } => Shape::Polygon(Polygon::new(points, min_y, max_y)?),
            Self::Global => Shape::Global,
        })
    }
}

impl From<&Shape> for GeometryRecord {
    fn from(shape: &Shape) -> Self {
        match shape {
            Shape::Cuboid(aabb) => Self::Cuboid {
                min: aabb.min(),
                max: aabb.max(),
            },
            Shape::Polygon(polygon) => Self::Polygon {
                points: polygon.points().to_vec(),
                min_y: polygon.min_y(),
                max_y: polygon.max_y(),
            },
            Shape::Global => Self::Global,
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{Principal, RegionError, State};

    fn district(registry: &FlagRegistry) -> Region {
        let outline = [(0, 0), (30, 0), (30, 10), (10, 10), (10, 30), (0, 30)].map(ColumnPos::from);
        let shape = Shape::Polygon(Polygon::new(outline, 10, 90).unwrap());

        let mut region = Region::new(RegionId::new("market").unwrap(), shape).unwrap().with_priority(-3);
        region.set_parent(Some(RegionId::new("town").unwrap())).unwrap();
        region
            .set_flag(registry, "build", FlagEntry::new(State::Deny).with_group(RegionGroup::NonMembers).immune())
            .unwrap();
        region.set_flag(registry, "greeting", FlagEntry::new("welcome")).unwrap();
        region.owners_mut().add(Principal::Player(Uuid::from_u128(99)));
        region.members_mut().add(Principal::group("traders"));
        region
    }

    #[test]
    fn test_record_round_trip_through_json() {
        let registry = FlagRegistry::standard();
        let region = district(&registry);

        let json = serde_json::to_string(&RegionRecord::from(&region)).unwrap();
        let record: RegionRecord = serde_json::from_str(&json).unwrap();
        let back = record.into_region(&registry).unwrap();

        assert_eq!(back, region);
    }

    #[test]
    fn test_minimal_record_uses_defaults() {
        let json = r#"{"id": "Plot-1", "geometry": {"cuboid": {"min": {"x": 0, "y": 0, "z": 0}, "max": {"x": 9, "y": 9, "z": 9}}}}"#;
        let record: RegionRecord = serde_json::from_str(json).unwrap();
        let region = record.into_region(&FlagRegistry::standard()).unwrap();

        assert_eq!(region.id().as_str(), "plot-1");
        assert_eq!(region.priority(), 0);
        assert!(region.parent().is_none());
        assert_eq!(region.volume(), 1000);
    }

    #[test]
    fn test_record_with_unknown_flag_is_rejected() {
        let registry = FlagRegistry::standard();
        let mut record = RegionRecord::from(&district(&registry));
        record.flags.insert(
            "teleport-home".to_owned(),
            FlagRecord {
                value: FlagValue::Boolean(true),
                group: RegionGroup::All,
                override_immune: false,
            },
        );

        assert_eq!(
            record.into_region(&registry).unwrap_err(),
            RegionError::UnknownFlag("teleport-home".to_owned())
        );
    }

    #[test]
    fn test_record_with_broken_outline_is_rejected() {
        let record = RegionRecord {
            id: "bad".to_owned(),
            priority: 0,
            geometry: GeometryRecord::Polygon {
                points: vec![ColumnPos::new(0, 0), ColumnPos::new(1, 1)],
                min_y: 0,
                max_y: 5,
            },
            parent: None,
            flags: BTreeMap::new(),
            owners: Domain::new(),
            members: Domain::new(),
        };

        assert!(matches!(
            record.into_region(&FlagRegistry::new()).unwrap_err(),
            RegionError::InvalidGeometry(_)
        ));
    }
}
