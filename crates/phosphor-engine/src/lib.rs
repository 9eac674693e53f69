//! Phosphor Engine -- fixed-timestep simulation over a character-cell
//! renderer.
//!
//! This crate is the simulation driver and render substrate for a terminal
//! combat game: a [`Scene`](scene::Scene) aggregate (entity store, object
//! pools, spatial hash, intent queue, seeded RNG, render surface), a
//! [`Scheduler`](sched::Scheduler) that runs the system pipeline at a fixed
//! rate behind a wall-clock accumulator, and a double-buffered cell surface
//! with a braille sub-cell layer that diffs down to minimal writes.
//!
//! The engine never touches a device: input arrives as queued
//! [`Intent`](intent::Intent)s, output leaves as a
//! [`CellWrite`](render::CellWrite) list. Everything in between is
//! deterministic for a given seed and intent stream.
//!
//! # Quick Start
//!
//! ```
//! use phosphor_engine::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default());
//! let mut sched = Scheduler::new(StepConfig::default());
//! standard_pipeline(&mut sched);
//!
//! // Spawn a player the systems will drive.
//! let player = scene.world.spawn_with(PlayerTag);
//! scene.world.insert(player, Position { x: 40.0, y: 12.0 }).unwrap();
//! scene.world.insert(player, Velocity { dx: 0.0, dy: 0.0 }).unwrap();
//! scene.world.insert(player, Friction(0.85)).unwrap();
//! scene.world.insert(player, MaxSpeed(72.0)).unwrap();
//! scene.world.insert(player, Renderable { glyph: '@', color: Color::WHITE, layer: 5 }).unwrap();
//!
//! // One wall frame: queue input, advance, present.
//! scene.intents.push(Intent::Move { dx: 1.0, dy: 0.0 });
//! let steps = sched.advance(&mut scene, 1.0 / 60.0);
//! assert_eq!(steps, 1);
//! let writes = scene.surface.flush();
//! assert!(!writes.is_empty());
//! ```

#![deny(unsafe_code)]

pub mod components;
pub mod intent;
pub mod render;
pub mod sched;
pub mod scene;
pub mod spatial;
pub mod systems;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the storage crate for convenience.
pub use phosphor_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use phosphor_ecs::prelude::*;

    pub use crate::components::*;
    pub use crate::intent::{Intent, IntentQueue};
    pub use crate::render::{
        frame_hash, palette, BufferPair, Cell, CellBuffer, CellWrite, Color, DotCanvas, Surface,
    };
    pub use crate::sched::{Scheduler, StepConfig, StepDiagnostics, SystemFn};
    pub use crate::scene::{Scene, SceneConfig};
    pub use crate::spatial::SpatialHash;
    pub use crate::systems::standard_pipeline;
}
