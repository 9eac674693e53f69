//! The single timer sweep.
//!
//! Every countdown in the simulation ticks here, once per step: lifetimes
//! reclaim their entity when they hit zero, status windows fall off, dash
//! timers cool down. No other system decrements a timer -- "wait then act"
//! is always a state edge observed by the owning system on a later tick.

use crate::components::*;
use crate::scene::Scene;

pub fn expire(scene: &mut Scene, _dt: f32) {
    // Lifetimes: reaching zero releases the entity (pooled classes go back
    // to their pool, anything else despawns).
    for id in scene.world.query::<(Lifetime,)>() {
        let Some(life) = scene.world.get_mut::<Lifetime>(id) else {
            continue;
        };
        life.ticks = life.ticks.saturating_sub(1);
        if life.ticks == 0 {
            scene.release_pooled(id);
        }
    }

    // Status windows fall off when spent.
    for id in scene.world.query::<(Invulnerable,)>() {
        if let Some(inv) = scene.world.get_mut::<Invulnerable>(id) {
            inv.ticks = inv.ticks.saturating_sub(1);
            if inv.ticks == 0 {
                let _ = scene.world.remove::<Invulnerable>(id);
            }
        }
    }
    for id in scene.world.query::<(HitFlash,)>() {
        if let Some(flash) = scene.world.get_mut::<HitFlash>(id) {
            flash.ticks = flash.ticks.saturating_sub(1);
            if flash.ticks == 0 {
                let _ = scene.world.remove::<HitFlash>(id);
            }
        }
    }
    for id in scene.world.query::<(Stunned,)>() {
        if let Some(stun) = scene.world.get_mut::<Stunned>(id) {
            stun.ticks = stun.ticks.saturating_sub(1);
            if stun.ticks == 0 {
                let _ = scene.world.remove::<Stunned>(id);
            }
        }
    }

    // Dash bookkeeping stays attached; only its counters move.
    for id in scene.world.query::<(DashState,)>() {
        if let Some(dash) = scene.world.get_mut::<DashState>(id) {
            dash.active = dash.active.saturating_sub(1);
            dash.cooldown = dash.cooldown.saturating_sub(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
