//! Property tests for the store and pools.
//!
//! Random operation sequences are replayed against the world while a shadow
//! model tracks which handles should still be live. After every sequence the
//! store's observable state must agree with the model.

use phosphor_ecs::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
struct Pos {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
struct Vel {
    dx: f32,
    dy: f32,
}

/// Operations the fuzzer can perform.
#[derive(Debug, Clone)]
enum Op {
    SpawnPos(i32, i32),
    SpawnPosVel(i32, i32),
    Despawn(usize),
    DespawnTwice(usize),
    InsertVel(usize),
    RemoveVel(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-1000i32..1000, -1000i32..1000).prop_map(|(x, y)| Op::SpawnPos(x, y)),
        (-1000i32..1000, -1000i32..1000).prop_map(|(x, y)| Op::SpawnPosVel(x, y)),
        (0..64usize).prop_map(Op::Despawn),
        (0..64usize).prop_map(Op::DespawnTwice),
        (0..64usize).prop_map(Op::InsertVel),
        (0..64usize).prop_map(Op::RemoveVel),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn random_ops_preserve_store_invariants(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut world = World::new();
        // Shadow model: (handle, alive, has_vel).
        let mut model: Vec<(EntityId, bool, bool)> = Vec::new();

        for op in ops {
            match op {
                Op::SpawnPos(x, y) => {
                    let e = world.spawn_with(Pos { x: x as f32, y: y as f32 });
                    model.push((e, true, false));
                }
                Op::SpawnPosVel(x, y) => {
                    let e = world.spawn_with(Pos { x: x as f32, y: y as f32 });
                    world.insert(e, Vel { dx: 0.5, dy: -0.5 }).unwrap();
                    model.push((e, true, true));
                }
                Op::Despawn(i) | Op::DespawnTwice(i) => {
                    let idx = i % model.len().max(1);
                    if let Some(entry) = model.get_mut(idx) {
                        let was_alive = entry.1;
                        let first = world.despawn(entry.0);
                        prop_assert_eq!(first, was_alive, "despawn outcome disagrees with model");
                        // Idempotence: a second despawn is always a no-op.
                        prop_assert!(!world.despawn(entry.0));
                        entry.1 = false;
                    }
                }
                Op::InsertVel(i) => {
                    let idx = i % model.len().max(1);
                    if let Some(entry) = model.get_mut(idx) {
                        let result = world.insert(entry.0, Vel { dx: 1.0, dy: 1.0 });
                        prop_assert_eq!(result.is_ok(), entry.1);
                        if entry.1 {
                            entry.2 = true;
                        }
                    }
                }
                Op::RemoveVel(i) => {
                    let idx = i % model.len().max(1);
                    if let Some(entry) = model.get_mut(idx) {
                        let result = world.remove::<Vel>(entry.0);
                        prop_assert_eq!(result.is_ok(), entry.1);
                        if entry.1 {
                            entry.2 = false;
                        }
                    }
                }
            }

            // Invariants after every op:
            // 1. Liveness agrees with the model.
            for (handle, alive, _) in &model {
                prop_assert_eq!(world.is_alive(*handle), *alive);
            }
            // 2. Dead handles expose no components.
            for (handle, alive, _) in &model {
                if !alive {
                    prop_assert!(world.get::<Pos>(*handle).is_none());
                    prop_assert!(world.get::<Vel>(*handle).is_none());
                }
            }
            // 3. Query results match the model's live sets exactly.
            let live_pos: usize = model.iter().filter(|(_, alive, _)| *alive).count();
            let live_vel: usize = model.iter().filter(|(_, alive, vel)| *alive && *vel).count();
            prop_assert_eq!(world.query::<(Pos,)>().len(), live_pos);
            prop_assert_eq!(world.query::<(Pos, Vel)>().len(), live_vel);
            prop_assert_eq!(world.entity_count(), live_pos);
        }
    }

    #[test]
    fn recycled_generations_strictly_increase(count in 1..40usize) {
        let mut world = World::new();
        let mut retired: Vec<EntityId> = Vec::new();
        for _ in 0..count {
            let e = world.spawn_with(Pos { x: 0.0, y: 0.0 });
            world.despawn(e);
            retired.push(e);
        }
        // Respawn the same number; every reused index must carry a strictly
        // higher generation, and every retired handle must stay dead.
        for _ in 0..count {
            let e = world.spawn();
            if let Some(old) = retired.iter().find(|r| r.index() == e.index()) {
                prop_assert!(e.generation() > old.generation());
            }
        }
        for old in &retired {
            prop_assert!(!world.is_alive(*old));
            prop_assert!(world.get::<Pos>(*old).is_none());
        }
    }

    #[test]
    fn pool_never_exceeds_capacity(capacity in 1..16usize, spawns in 1..64usize) {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "fuzz", capacity, EvictPolicy::EvictOldest);
        for _ in 0..spawns {
            pool.acquire(&mut world).unwrap();
            prop_assert!(pool.live_count() <= capacity);
            prop_assert_eq!(world.entity_count(), pool.live_count());
        }
    }
}
