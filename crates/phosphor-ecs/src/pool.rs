//! Fixed-capacity entity pools for churn-heavy classes.
//!
//! A [`Pool`] pre-creates its whole slot budget at startup on *reserved*
//! allocator slots, then hands slots out and takes them back without ever
//! allocating again. Capacity is fixed for the session: a pool that runs dry
//! either drops the new spawn or force-evicts its oldest live member,
//! depending on the [`EvictPolicy`] chosen at construction.
//!
//! Forced eviction runs the normal destroy path (generation bump, lazy row
//! sweep on revive), so no live handle is ever silently aliased.

use std::collections::VecDeque;

use crate::entity::EntityId;
use crate::world::World;
use crate::EcsError;

// ---------------------------------------------------------------------------
// EvictPolicy
// ---------------------------------------------------------------------------

/// What `acquire` does when every slot is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictPolicy {
    /// Refuse the new spawn; the caller sees [`EcsError::PoolExhausted`] and
    /// a drop counter ticks up. Right for classes where losing an existing
    /// member is worse than skipping a new one (projectiles).
    DropNew,
    /// Destroy the oldest live member and reuse its slot. Right for classes
    /// where visual continuity tolerates early reclamation (particles).
    EvictOldest,
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// A fixed-capacity slot set for one entity class.
#[derive(Debug)]
pub struct Pool {
    label: &'static str,
    capacity: usize,
    policy: EvictPolicy,
    /// Parked slot indices, ready to revive.
    parked: Vec<u32>,
    /// Live handles in acquisition order; front is the oldest.
    live: VecDeque<EntityId>,
    /// Spawns refused under [`EvictPolicy::DropNew`]. Surfaced so the
    /// application can log or react to sustained exhaustion.
    dropped: u64,
}

impl Pool {
    /// Pre-create `capacity` reserved slots in `world` and park them all.
    pub fn new(world: &mut World, label: &'static str, capacity: usize, policy: EvictPolicy) -> Self {
        let mut parked = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let id = world.spawn_reserved();
            world.despawn(id);
            parked.push(id.index());
        }
        // LIFO reuse keeps recently cooled slots hot.
        parked.reverse();
        Self {
            label,
            capacity,
            policy,
            parked,
            live: VecDeque::with_capacity(capacity),
            dropped: 0,
        }
    }

    /// Take a slot from the pool. The returned entity is live and blank; the
    /// caller attaches whatever components the class needs.
    pub fn acquire(&mut self, world: &mut World) -> Result<EntityId, EcsError> {
        if let Some(index) = self.parked.pop() {
            let id = world
                .revive(index)
                .expect("parked pool slot must be reserved and dead");
            self.live.push_back(id);
            return Ok(id);
        }
        match self.policy {
            EvictPolicy::DropNew => {
                self.dropped += 1;
                Err(EcsError::PoolExhausted {
                    pool: self.label,
                    capacity: self.capacity,
                })
            }
            EvictPolicy::EvictOldest => {
                let Some(oldest) = self.live.pop_front() else {
                    // Zero-capacity pool; nothing to evict.
                    self.dropped += 1;
                    return Err(EcsError::PoolExhausted {
                        pool: self.label,
                        capacity: self.capacity,
                    });
                };
                tracing::debug!(pool = self.label, evicted = %oldest, "pool full, evicting oldest");
                world.despawn(oldest);
                let id = world
                    .revive(oldest.index())
                    .expect("evicted pool slot must be revivable");
                self.live.push_back(id);
                Ok(id)
            }
        }
    }

    /// Return a live member to the pool, invalidating its handle. Reports
    /// `false` for a stale handle or an entity this pool does not own.
    pub fn release(&mut self, world: &mut World, entity: EntityId) -> bool {
        if !world.is_alive(entity) {
            return false;
        }
        let Some(position) = self.live.iter().position(|&h| h == entity) else {
            return false;
        };
        self.live.remove(position);
        world.despawn(entity);
        self.parked.push(entity.index());
        true
    }

    /// Whether this pool currently owns `entity` as a live member.
    pub fn owns(&self, entity: EntityId) -> bool {
        self.live.contains(&entity)
    }

    /// Live handles in acquisition order (oldest first).
    pub fn live(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.live.iter().copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictPolicy {
        self.policy
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Spawns refused so far under [`EvictPolicy::DropNew`].
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Spark(u32);

    // -- capacity & policies -------------------------------------------------

    #[test]
    fn drop_new_refuses_the_third_spawn() {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "sparks", 2, EvictPolicy::DropNew);

        let a = pool.acquire(&mut world).unwrap();
        let b = pool.acquire(&mut world).unwrap();
        let third = pool.acquire(&mut world);

        assert!(matches!(third, Err(EcsError::PoolExhausted { .. })));
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.dropped(), 1);
        assert!(world.is_alive(a));
        assert!(world.is_alive(b));
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn evict_oldest_reclaims_the_first_member() {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "sparks", 2, EvictPolicy::EvictOldest);

        let a = pool.acquire(&mut world).unwrap();
        world.insert(a, Spark(1)).unwrap();
        let b = pool.acquire(&mut world).unwrap();
        let c = pool.acquire(&mut world).unwrap();

        assert!(!world.is_alive(a), "oldest member was destroyed");
        assert!(world.is_alive(b));
        assert!(world.is_alive(c));
        assert_eq!(c.index(), a.index(), "slot was reused");
        assert!(c.generation() > a.generation());
        // The destroy path ran: the evicted member's data is gone.
        assert_eq!(world.get::<Spark>(c), None);
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.dropped(), 0);
    }

    #[test]
    fn released_slot_comes_back_with_new_generation() {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "bolts", 1, EvictPolicy::DropNew);

        let a = pool.acquire(&mut world).unwrap();
        world.insert(a, Spark(7)).unwrap();
        assert!(pool.release(&mut world, a));
        assert!(!world.is_alive(a));

        let b = pool.acquire(&mut world).unwrap();
        assert_eq!(b.index(), a.index());
        assert!(b.generation() > a.generation());
        assert_eq!(world.get::<Spark>(b), None, "rows swept on revive");
        // Operations through the stale handle report not-found.
        assert!(world.insert(a, Spark(9)).is_err());
    }

    #[test]
    fn release_rejects_stale_and_foreign_handles() {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "bolts", 1, EvictPolicy::DropNew);
        let a = pool.acquire(&mut world).unwrap();
        assert!(pool.release(&mut world, a));
        assert!(!pool.release(&mut world, a), "stale handle");

        let outsider = world.spawn();
        assert!(!pool.release(&mut world, outsider), "not a pool member");
        assert!(world.is_alive(outsider));
    }

    #[test]
    fn zero_capacity_pool_always_exhausted() {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "empty", 0, EvictPolicy::EvictOldest);
        assert!(matches!(
            pool.acquire(&mut world),
            Err(EcsError::PoolExhausted { .. })
        ));
        assert_eq!(pool.dropped(), 1);
    }

    #[test]
    fn dropped_counter_accumulates() {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "bolts", 1, EvictPolicy::DropNew);
        let _a = pool.acquire(&mut world).unwrap();
        for _ in 0..5 {
            let _ = pool.acquire(&mut world);
        }
        assert_eq!(pool.dropped(), 5);
    }

    #[test]
    fn pool_slots_never_leak_into_general_spawns() {
        let mut world = World::new();
        let mut pool = Pool::new(&mut world, "bolts", 4, EvictPolicy::DropNew);
        let held: Vec<EntityId> = (0..4).map(|_| pool.acquire(&mut world).unwrap()).collect();
        for &h in &held {
            pool.release(&mut world, h);
        }
        // All four slots are parked; a general spawn must not touch them.
        let general = world.spawn();
        assert!(held.iter().all(|h| h.index() != general.index()));
    }
}
