//! Resolution behaviour over real indexes.

use pretty_assertions::assert_eq;
use uuid::Uuid;
use ward_geom::{BlockPos, Shape};
use ward_region::{
    FlagEntry, FlagRegistry, FlagValue, Player, Principal, Region, RegionError, RegionGroup, RegionId, State, Subject,
};
use ward_resolve::{FlagResolution, FlagResolver};
use ward_spatial::RegionIndex;

const ORIGIN: BlockPos = BlockPos::new(5, 5, 5);

fn owner() -> Player {
    Player::new(Uuid::from_u128(1))
}

fn stranger() -> Player {
    Player::new(Uuid::from_u128(2))
}

struct World {
    registry: FlagRegistry,
    index: RegionIndex,
}

impl World {
    fn new() -> Self {
        Self {
            registry: FlagRegistry::standard(),
            index: RegionIndex::default(),
        }
    }

    /// A region covering `ORIGIN`.
    fn region(&mut self, id: &str, priority: i32, flags: &[(&str, FlagEntry)]) -> &mut Self {
        self.region_at(id, priority, (0, 0, 0), flags)
    }

    fn region_at(&mut self, id: &str, priority: i32, min: (i32, i32, i32), flags: &[(&str, FlagEntry)]) -> &mut Self {
        let min = BlockPos::from(min);
        let max = BlockPos::new(min.x + 9, min.y + 9, min.z + 9);
        let region = Region::new(RegionId::new(id).unwrap(), Shape::cuboid(min, max)).unwrap();
        self.add(region.with_priority(priority), flags)
    }

    fn add(&mut self, mut region: Region, flags: &[(&str, FlagEntry)]) -> &mut Self {
        for (name, entry) in flags {
            region.set_flag(&self.registry, name, entry.clone()).unwrap();
        }
        self.index.insert(region).unwrap();
        self
    }

    fn edit(&mut self, id: &str, edit: impl FnOnce(&mut Region)) -> &mut Self {
        self.index
            .update(id, |region| {
                edit(region);
                Ok(())
            })
            .unwrap();
        self
    }

    fn resolve_at(&self, pos: BlockPos, flag: &str, subject: Option<&dyn Subject>) -> FlagResolution {
        let set = self.index.regions_containing(pos);
        FlagResolver::new(&self.registry).resolve(&set, flag, subject).unwrap()
    }

    fn resolve(&self, flag: &str, subject: Option<&dyn Subject>) -> FlagResolution {
        self.resolve_at(ORIGIN, flag, subject)
    }
}

fn deny() -> FlagEntry {
    FlagEntry::new(State::Deny)
}

fn allow() -> FlagEntry {
    FlagEntry::new(State::Allow)
}

fn winner(resolution: &FlagResolution) -> Option<&str> {
    resolution.winning_region.as_ref().map(RegionId::as_str)
}

#[test]
fn test_higher_priority_wins() {
    let mut world = World::new();
    world.region("a", 1, &[("pvp", deny())]).region("b", 5, &[("pvp", allow())]);

    let result = world.resolve("pvp", None);
    assert_eq!(result.state(), Some(State::Allow));
    assert_eq!(winner(&result), Some("b"));
    assert_eq!(result.candidates.len(), 2);
}

#[test]
fn test_unset_flag_inherits_from_parent() {
    let mut world = World::new();
    world.region_at("a", 0, (100, 0, 100), &[("pvp", deny())]);
    world.region("c", 0, &[]).edit("c", |c| c.set_parent(Some(RegionId::new("a").unwrap())).unwrap());

    let result = world.resolve("pvp", None);
    assert_eq!(result.state(), Some(State::Deny));
    assert_eq!(winner(&result), Some("a"));
}

#[test]
fn test_child_value_shadows_parent() {
    let mut world = World::new();
    world.region("a", 0, &[("greeting", FlagEntry::new("parent"))]);
    world
        .region("c", 0, &[("greeting", FlagEntry::new("child"))])
        .edit("c", |c| c.set_parent(Some(RegionId::new("a").unwrap())).unwrap());

    let result = world.resolve("greeting", None);
    assert_eq!(result.value, Some(FlagValue::String("child".to_owned())));
    assert_eq!(winner(&result), Some("c"));
    assert_eq!(result.candidates.len(), 1);
}

#[test]
fn test_inherited_value_competes_at_head_priority() {
    let mut world = World::new();
    // The parent's own priority is irrelevant once it is reached by inheritance.
    world.region_at("parent", 100, (500, 0, 500), &[("pvp", allow())]);
    world.region("low-child", 1, &[]).edit("low-child", |r| {
        r.set_parent(Some(RegionId::new("parent").unwrap())).unwrap();
    });
    world.region("mid", 3, &[("pvp", deny())]);

    let result = world.resolve("pvp", None);
    assert_eq!(result.state(), Some(State::Deny));
    assert_eq!(winner(&result), Some("mid"));
}

#[test]
fn test_owner_bypasses_build_deny() {
    let mut world = World::new();
    world
        .region("d", 3, &[("build", deny())])
        .edit("d", |d| _ = d.owners_mut().add(Principal::Player(owner().id())));

    let owner = owner();
    let result = world.resolve("build", Some(&owner));
    assert_eq!(result.state(), Some(State::Allow));
    assert!(result.owner_override);
    assert_eq!(winner(&result), Some("d"));

    let stranger = stranger();
    let result = world.resolve("build", Some(&stranger));
    assert_eq!(result.state(), Some(State::Deny));
    assert!(!result.owner_override);
}

#[test]
fn test_override_immune_deny_holds_against_owner() {
    let mut world = World::new();
    world
        .region("d", 3, &[("build", deny().immune())])
        .edit("d", |d| _ = d.owners_mut().add(Principal::Player(owner().id())));

    let owner = owner();
    let result = world.resolve("build", Some(&owner));
    assert_eq!(result.state(), Some(State::Deny));
    assert_eq!(winner(&result), Some("d"));
}

#[test]
fn test_owned_region_below_winner_cannot_bypass() {
    let mut world = World::new();
    world
        .region("plot", 1, &[])
        .edit("plot", |p| _ = p.owners_mut().add(Principal::Player(owner().id())));
    world.region("admin", 10, &[("build", deny())]);

    let owner = owner();
    let result = world.resolve("build", Some(&owner));
    assert_eq!(result.state(), Some(State::Deny));
    assert_eq!(winner(&result), Some("admin"));
}

#[test]
fn test_members_do_not_bypass() {
    let mut world = World::new();
    world
        .region("d", 0, &[("build", deny())])
        .edit("d", |d| _ = d.members_mut().add(Principal::Player(owner().id())));

    let member = owner();
    assert_eq!(world.resolve("build", Some(&member)).state(), Some(State::Deny));
}

#[test]
fn test_flags_without_bypass_ignore_ownership() {
    let mut world = World::new();
    world
        .region("arena", 0, &[("pvp", deny())])
        .edit("arena", |a| _ = a.owners_mut().add(Principal::Player(owner().id())));

    let owner = owner();
    assert_eq!(world.resolve("pvp", Some(&owner)).state(), Some(State::Deny));
}

#[test]
fn test_deny_wins_a_priority_tie() {
    let mut world = World::new();
    world
        .region("a", 2, &[("pvp", allow())])
        .region("b", 2, &[("pvp", deny())])
        .region("c", 2, &[("pvp", deny())]);

    let result = world.resolve("pvp", None);
    assert_eq!(result.state(), Some(State::Deny));
    assert_eq!(winner(&result), Some("b"));
}

#[test]
fn test_value_tie_goes_to_lowest_id() {
    let mut world = World::new();
    world
        .region("zulu", 0, &[("greeting", FlagEntry::new("z"))])
        .region("alpha", 0, &[("greeting", FlagEntry::new("a"))]);

    let result = world.resolve("greeting", None);
    assert_eq!(result.value, Some(FlagValue::String("a".to_owned())));
    assert_eq!(winner(&result), Some("alpha"));
}

#[test]
fn test_global_only_answers_when_nothing_else_does() {
    let mut world = World::new();
    world.add(Region::global(), &[("pvp", deny()), ("greeting", FlagEntry::new("hello"))]);

    let result = world.resolve("pvp", None);
    assert_eq!(result.state(), Some(State::Deny));
    assert_eq!(winner(&result), Some("__global__"));

    world.region("arena", -5, &[("pvp", allow())]);
    let result = world.resolve("pvp", None);
    assert_eq!(result.state(), Some(State::Allow));
    assert_eq!(winner(&result), Some("arena"));

    // The arena covers the point but does not set a greeting.
    let result = world.resolve("greeting", None);
    assert_eq!(result.value, Some(FlagValue::String("hello".to_owned())));
}

#[test]
fn test_unset_everywhere() {
    let mut world = World::new();
    world.region("quiet", 0, &[]);

    let result = world.resolve("pvp", None);
    assert_eq!(result, FlagResolution::default());
    assert!(result.allows(true));
    assert!(!result.allows(false));
}

#[test]
fn test_group_scoped_entry_falls_through_the_chain() {
    let mut world = World::new();
    world.region_at("town", 0, (200, 0, 200), &[("build", allow())]);
    world
        .region("shop", 0, &[("build", deny().with_group(RegionGroup::NonMembers))])
        .edit("shop", |s| {
            s.set_parent(Some(RegionId::new("town").unwrap())).unwrap();
            s.members_mut().add(Principal::Player(owner().id()));
        });

    let member = owner();
    let result = world.resolve("build", Some(&member));
    assert_eq!(result.state(), Some(State::Allow));
    assert_eq!(winner(&result), Some("town"));

    let stranger = stranger();
    let result = world.resolve("build", Some(&stranger));
    assert_eq!(result.state(), Some(State::Deny));
    assert_eq!(winner(&result), Some("shop"));

    // No subject at all counts as a non-member.
    assert_eq!(world.resolve("build", None).state(), Some(State::Deny));
}

#[test]
fn test_membership_is_inherited_from_ancestors() {
    let mut world = World::new();
    world
        .region_at("guild-hall", 0, (300, 0, 300), &[])
        .edit("guild-hall", |g| _ = g.members_mut().add(Principal::group("masons")));
    world
        .region("workshop", 0, &[("interact", deny().with_group(RegionGroup::NonMembers))])
        .edit("workshop", |w| {
            w.set_parent(Some(RegionId::new("guild-hall").unwrap())).unwrap();
        });

    let mason = stranger().with_group("masons");
    assert_eq!(world.resolve("interact", Some(&mason)).value, None);

    let outsider = stranger();
    assert_eq!(world.resolve("interact", Some(&outsider)).state(), Some(State::Deny));
}

#[test]
fn test_test_state_combines_flags() {
    let mut world = World::new();
    world.region("mixed", 0, &[("build", allow()), ("pvp", deny())]);

    let set = world.index.regions_containing(ORIGIN);
    let resolver = FlagResolver::new(&world.registry);

    assert_eq!(resolver.test_state(&set, &["build"], None).unwrap(), Some(State::Allow));
    assert_eq!(resolver.test_state(&set, &["build", "pvp"], None).unwrap(), Some(State::Deny));
    assert_eq!(resolver.test_state(&set, &["entry"], None).unwrap(), None);
    assert!(matches!(
        resolver.test_state(&set, &["greeting"], None).unwrap_err(),
        RegionError::TypeMismatch { .. }
    ));
}

#[test]
fn test_unknown_flag_is_an_error() {
    let world = World::new();
    let set = world.index.regions_containing(ORIGIN);
    let err = FlagResolver::new(&world.registry).resolve(&set, "fly", None).unwrap_err();
    assert_eq!(err, RegionError::UnknownFlag("fly".to_owned()));
}

#[test]
fn test_resolution_is_deterministic_across_threads() {
    let mut world = World::new();
    for i in 0..12 {
        let state = if i % 3 == 0 { deny() } else { allow() };
        world.region(&format!("r{i:02}"), i % 4, &[("pvp", state)]);
    }

    let expected = world.resolve("pvp", None);
    assert_eq!(winner(&expected), Some("r03"));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(world.resolve("pvp", None), expected);
                }
            });
        }
    });
}
