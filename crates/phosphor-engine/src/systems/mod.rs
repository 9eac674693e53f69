//! The simulation system pipeline.
//!
//! Execution order is a hard contract -- each system assumes everything
//! above it has settled this tick:
//!
//! 1. `intents`   -- queued input becomes player state
//! 2. `ai`        -- brains steer and attack
//! 3. `integrate` -- velocities become positions
//! 4. `confine`   -- arena bounds applied
//! 5. `index`     -- spatial hash rebuilt from settled positions
//! 6. `collide`   -- broad phase + damage resolution
//! 7. `reap`      -- zero-health entities leave the field
//! 8. `expire`    -- the timer sweep reclaims and un-flags
//! 9. `compose`   -- surviving state drawn into the surface

pub mod ai;
pub mod combat;
pub mod intents;
pub mod lifetime;
pub mod motion;
pub mod visual;

use crate::sched::Scheduler;
use crate::scene::Scene;

/// Rebuild the spatial index from this tick's integrated positions. No
/// system after this may see stale bucket membership.
pub fn refresh_index(scene: &mut Scene, _dt: f32) {
    let Scene { world, index, .. } = scene;
    index.rebuild(world);
}

/// Register the standard pipeline on a scheduler, in contract order.
pub fn standard_pipeline(sched: &mut Scheduler) {
    sched.add_system("intents", intents::apply);
    sched.add_system("ai", ai::think);
    sched.add_system("integrate", motion::integrate);
    sched.add_system("confine", motion::confine);
    sched.add_system("index", refresh_index);
    sched.add_system("collide", combat::collide);
    sched.add_system("reap", combat::reap);
    sched.add_system("expire", lifetime::expire);
    sched.add_system("compose", visual::compose);
}
