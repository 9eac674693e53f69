//! Phosphor ECS -- sparse-set entity/component store with pooled slots.
//!
//! This crate is the storage substrate for the Phosphor engine: generational
//! entity handles, one dense-plus-sparse column per component type, and
//! fixed-capacity pools for churn-heavy entity classes. It holds plain data
//! and liveness -- all behavior lives in the engine's system pipeline.
//!
//! # Quick Start
//!
//! ```
//! use phosphor_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let mut world = World::new();
//! let e = world.spawn_with(Position { x: 0.0, y: 0.0 });
//! world.insert(e, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
//!
//! for id in world.query::<(Position, Velocity)>() {
//!     let vel = *world.get::<Velocity>(id).unwrap();
//!     if let Some(pos) = world.get_mut::<Position>(id) {
//!         pos.x += vel.dx;
//!     }
//! }
//! assert_eq!(world.get::<Position>(e), Some(&Position { x: 1.0, y: 0.0 }));
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod pool;
pub mod store;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Recoverable outcomes of store and pool operations. Nothing here is fatal:
/// a stale handle means "already gone", an exhausted pool means "spawn
/// refused by policy".
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The handle's generation no longer matches its slot (or the slot never
    /// existed). The entity is gone; treat as already-destroyed.
    #[error("entity {entity} not found (stale or never allocated)")]
    NotFound {
        entity: entity::EntityId,
    },

    /// Every slot in the pool is live and the pool's policy refused the
    /// spawn. Recoverable by design; sustained occurrences are surfaced via
    /// [`Pool::dropped`](pool::Pool::dropped).
    #[error("pool '{pool}' exhausted at capacity {capacity}")]
    PoolExhausted {
        pool: &'static str,
        capacity: usize,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::EntityId;
    pub use crate::pool::{EvictPolicy, Pool};
    pub use crate::store::{Component, SparseSet};
    pub use crate::world::{ComponentSet, World};
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
