//! Readers racing a writer never see a half-applied edit.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use ward_geom::{BlockPos, Shape};
use ward_manager::RegionManager;
use ward_region::{FlagEntry, FlagRegistry, Region, RegionId, State};
use ward_spatial::GridConfig;
use ward_storage::{JsonStore, MemoryStore, RegionStore};

fn manager() -> Arc<RegionManager> {
    Arc::new(RegionManager::new(
        "race",
        GridConfig::default(),
        Arc::new(FlagRegistry::standard()),
        Arc::new(MemoryStore::new()),
    ))
}

fn keep() -> Region {
    let shape = Shape::cuboid(BlockPos::new(0, 0, 0), BlockPos::new(63, 63, 63));
    let mut region = Region::new(RegionId::new("keep").unwrap(), shape).unwrap();
    region.set_priority(10);
    region
        .set_flag(&FlagRegistry::standard(), "pvp", FlagEntry::new(State::Deny))
        .unwrap();
    region
}

#[test]
fn test_queries_during_remove_and_redefine() {
    let manager = manager();
    manager.define("floor", Shape::cuboid(BlockPos::new(-100, 0, -100), BlockPos::new(100, 10, 100))).unwrap();
    manager.set_flag("floor", "pvp", FlagEntry::new(State::Allow)).unwrap();
    manager.define_region(keep()).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let pos = BlockPos::new(i, 5, i);
                let mut seen = 0_u64;
                loop {
                    let result = manager.query_flag(pos, "pvp", None).unwrap();
                    let winner = result.winning_region.as_ref().map(RegionId::as_str);
                    // Either `keep` is fully there and wins, or it is gone and `floor` wins.
                    match winner {
                        Some("keep") => assert_eq!(result.state(), Some(State::Deny)),
                        Some("floor") => assert_eq!(result.state(), Some(State::Allow)),
                        other => panic!("unexpected winner {other:?}"),
                    }
                    seen += 1;
                    if stop.load(Ordering::Relaxed) {
                        return seen;
                    }
                }
            })
        })
        .collect();

    for round in 0..200 {
        manager.remove_region("keep").unwrap();
        manager.define_region(keep()).unwrap();
        if round % 2 == 0 {
            manager.set_priority("keep", 10).unwrap();
        }
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert_eq!(manager.len(), 2);
}

#[test]
fn test_snapshot_outlives_edit() {
    let manager = manager();
    manager.define_region(keep()).unwrap();

    let snapshot = manager.regions_containing(BlockPos::new(1, 1, 1));
    manager.remove_region("keep").unwrap();

    assert!(snapshot.contains("keep"));
    assert!(manager.regions_containing(BlockPos::new(1, 1, 1)).is_empty());
}

#[test]
fn test_concurrent_saves_keep_every_edit() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn RegionStore> = Arc::new(JsonStore::new(dir.path()));
    let manager = Arc::new(
        RegionManager::new("race", GridConfig::default(), Arc::new(FlagRegistry::standard()), Arc::clone(&store))
            .with_autosave(true),
    );

    let writers: Vec<_> = (0..8)
        .map(|t| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for n in 0..25 {
                    let x = (t * 25 + n) * 8;
                    let shape = Shape::cuboid(BlockPos::new(x, 0, 0), BlockPos::new(x + 3, 3, 3));
                    manager.define(&format!("plot-{t}-{n}"), shape).unwrap();
                    manager.save().unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert!(!manager.is_dirty());
    let stored = store.load("race").unwrap();
    assert_eq!(stored.len(), 200);
    assert_eq!(stored, manager.records());
}
