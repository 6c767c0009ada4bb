//! Quadtree benchmarks - put, viewport query and movement update at scale.
//!
//! Run with: cargo bench --bench quadtree_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use empires_world::components::{EntityId, ResourceKind, Unit};
use empires_world::constants::QUADTREE_CAPACITY;
use empires_world::geometry::{Aabb, Point};
use empires_world::map::MapSize;
use empires_world::quadtree::Quadtree;
use empires_world::world::GameWorld;

const EXTENT: i32 = 220 * 32;

fn scattered_units(count: usize) -> Vec<Unit> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..count)
        .map(|i| {
            let (x, y) = (rng.random_range(16..EXTENT - 16), rng.random_range(16..EXTENT - 16));
            let id = EntityId(i as u32 + 1);
            if i % 4 == 0 {
                Unit::villager(id, x, y, 1)
            } else {
                Unit::resource(id, x, y, ResourceKind::ALL[i % 4])
            }
        })
        .collect()
}

fn build_tree(units: &[Unit]) -> Quadtree {
    let mut tree = Quadtree::with_capacity(Aabb::from_corners(0, 0, EXTENT, EXTENT), QUADTREE_CAPACITY);
    for u in units {
        tree.put(u);
    }
    tree
}

fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_put");
    for count in [1_000, 10_000] {
        let units = scattered_units(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &units, |b, units| {
            b.iter(|| black_box(build_tree(units)).len());
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_query");
    for count in [1_000, 10_000] {
        let tree = build_tree(&scattered_units(count));
        let viewport = Aabb::from_corners(2000, 2000, 3024, 2768);
        let mut out = Vec::new();
        group.bench_with_input(BenchmarkId::new("viewport", count), &count, |b, _| {
            b.iter(|| {
                out.clear();
                tree.query(&mut out, black_box(viewport));
                black_box(out.len())
            });
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut units = scattered_units(10_000);
    let mut tree = build_tree(&units);
    let mut step = 0;
    c.bench_function("quadtree_update_10k_walkers", |b| {
        b.iter(|| {
            step += 1;
            let shift = if step % 2 == 0 { 3 } else { -3 };
            for u in units.iter_mut().filter(|u| u.is_dynamic()) {
                let p = u.pos();
                u.set_pos(Point::new(p.x + shift, p.y));
                tree.update(u);
            }
        });
    });
}

fn bench_frame(c: &mut Criterion) {
    let mut world = GameWorld::with_size(MapSize::Huge, QUADTREE_CAPACITY).expect("huge map");
    world.reshape_viewport(2000, 2000, 1024, 768);
    let mut rng = StdRng::seed_from_u64(2);
    let mut walkers = Vec::new();
    for _ in 0..2_000 {
        let (x, y) = (rng.random_range(0..EXTENT), rng.random_range(0..EXTENT));
        if let Some(id) = world.spawn_villager(x, y, 1) {
            walkers.push(id);
        }
    }
    for &id in &walkers {
        world.move_unit(id, rng.random_range(0..EXTENT), rng.random_range(0..EXTENT), 0, 0);
    }
    c.bench_function("world_tick_cull_2k_walkers", |b| {
        b.iter(|| {
            let (_, moved) = world.tick();
            let list = world.cull();
            black_box((moved, list.units.len()))
        });
    });
}

criterion_group!(benches, bench_put, bench_query, bench_update, bench_frame);
criterion_main!(benches);
