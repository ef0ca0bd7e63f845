//! Region index benchmarks using criterion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ward_geom::{BlockPos, Shape};
use ward_region::{Region, RegionId};
use ward_spatial::{GridConfig, RegionIndex};

/// A square city of `side * side` plots, 32 blocks each, every row of
/// plots parented to a district region.
fn city(side: i32) -> RegionIndex {
    let mut regions = Vec::new();

    for row in 0..side {
        let district = RegionId::new(format!("district-{row}")).unwrap();
        let shape = Shape::cuboid(BlockPos::new(0, 0, row * 32), BlockPos::new(side * 32 - 1, 255, row * 32 + 31));
        regions.push(Region::new(district.clone(), shape).unwrap());

        for col in 0..side {
            let id = RegionId::new(format!("plot-{row}-{col}")).unwrap();
            let min = BlockPos::new(col * 32 + 2, 0, row * 32 + 2);
            let max = BlockPos::new(col * 32 + 29, 255, row * 32 + 29);
            let mut plot = Region::new(id, Shape::cuboid(min, max)).unwrap().with_priority(1);
            plot.set_parent(Some(district.clone())).unwrap();
            regions.push(plot);
        }
    }

    regions.push(Region::global());
    RegionIndex::from_regions(GridConfig::default(), regions).unwrap()
}

fn point_query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("regions_containing");

    for side in [10, 50, 100] {
        let index = city(side);
        let probes: Vec<_> = (0..1000)
            .map(|i| BlockPos::new((i * 37) % (side * 32), 64, (i * 91) % (side * 32)))
            .collect();

        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_with_input(BenchmarkId::new("city", side * side), &probes, |b, probes| {
            b.iter(|| {
                for &pos in probes {
                    black_box(index.regions_containing(pos));
                }
            });
        });
    }

    group.finish();
}

fn volume_query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("regions_intersecting");
    let index = city(50);

    for size in [8, 64, 512] {
        let probe = Shape::cuboid(BlockPos::new(100, 0, 100), BlockPos::new(100 + size, 255, 100 + size));
        group.bench_with_input(BenchmarkId::new("cuboid", size), &probe, |b, probe| {
            b.iter(|| black_box(index.regions_intersecting(probe)));
        });
    }

    group.finish();
}

fn build_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_regions");

    for side in [10, 50] {
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::new("city", side * side), &side, |b, &side| {
            b.iter(|| black_box(city(side)));
        });
    }

    group.finish();
}

criterion_group!(benches, point_query_benchmarks, volume_query_benchmarks, build_benchmarks);
criterion_main!(benches);
