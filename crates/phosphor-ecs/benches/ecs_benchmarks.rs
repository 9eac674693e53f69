//! Store and pool benchmarks.
//!
//! The frame budget at 60 steps/second is 16.67ms; the store's share of a
//! tick (queries + component access for every system) needs to stay well
//! under a milliseconds-scale fraction of that at a few thousand entities.
//!
//! Run with: `cargo bench --bench ecs_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use phosphor_ecs::prelude::*;

// ---------------------------------------------------------------------------
// Benchmark component types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
struct Health(u32);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A world with `count` entities; every entity has Position, half have
/// Velocity, a tenth have Health.
fn populated_world(count: usize) -> World {
    let mut world = World::new();
    for i in 0..count {
        let e = world.spawn_with(Position {
            x: i as f32,
            y: -(i as f32),
        });
        if i % 2 == 0 {
            world.insert(e, Velocity { dx: 1.0, dy: 0.5 }).unwrap();
        }
        if i % 10 == 0 {
            world.insert(e, Health(100)).unwrap();
        }
    }
    world
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_spawn(c: &mut Criterion) {
    c.bench_function("spawn_with_position_1k", |b| {
        b.iter(|| {
            let mut world = World::new();
            for i in 0..1_000 {
                black_box(world.spawn_with(Position {
                    x: i as f32,
                    y: 0.0,
                }));
            }
        });
    });
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_pos_vel");
    for count in [1_000usize, 5_000] {
        let world = populated_world(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &world, |b, world| {
            b.iter(|| black_box(world.query::<(Position, Velocity)>().len()));
        });
    }
    group.finish();
}

fn bench_movement_pass(c: &mut Criterion) {
    let mut world = populated_world(2_000);
    c.bench_function("movement_pass_2k", |b| {
        b.iter(|| {
            for id in world.query::<(Position, Velocity)>() {
                let vel = *world.get::<Velocity>(id).unwrap();
                if let Some(pos) = world.get_mut::<Position>(id) {
                    pos.x += vel.dx;
                    pos.y += vel.dy;
                }
            }
        });
    });
}

fn bench_pool_churn(c: &mut Criterion) {
    c.bench_function("pool_acquire_release_256", |b| {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "bench", 256, EvictPolicy::EvictOldest);
        b.iter(|| {
            let mut held = Vec::with_capacity(256);
            for _ in 0..256 {
                held.push(pool.acquire(&mut world).unwrap());
            }
            for h in held {
                pool.release(&mut world, h);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_spawn,
    bench_query,
    bench_movement_pass,
    bench_pool_churn
);
criterion_main!(benches);
