//! Player intent integration.
//!
//! Drains the scene's [`IntentQueue`] at the start of every step and turns
//! discrete intents into state on player-tagged entities: steering
//! acceleration, a dash burst behind a cooldown gate, and slash attacks
//! spawned as transient hit volumes from the hit-volume pool.

use crate::components::*;
use crate::intent::Intent;
use crate::render::palette;
use crate::scene::Scene;

/// Steering acceleration, cells/s^2.
const MOVE_ACCEL: f32 = 9_000.0;

/// Dash burst speed, cells/s.
const DASH_SPEED: f32 = 210.0;
/// Dash duration and cooldown gate, in ticks.
const DASH_TICKS: u32 = 8;
const DASH_COOLDOWN: u32 = 30;

/// Slash tuning: reach from the player center, volume size, damage, and how
/// long the volume lingers.
const SLASH_REACH: f32 = 2.0;
const SLASH_SIZE: f32 = 3.0;
const SLASH_DAMAGE: i32 = 25;
const SLASH_TICKS: u32 = 4;

pub fn apply(scene: &mut Scene, dt: f32) {
    let intents: Vec<Intent> = scene.intents.drain().collect();
    if intents.is_empty() {
        return;
    }
    let players = scene.world.query::<(PlayerTag, Position, Velocity)>();

    for intent in intents {
        for &player in &players {
            match intent {
                Intent::Move { dx, dy } => {
                    let len = (dx * dx + dy * dy).sqrt();
                    if len <= f32::EPSILON {
                        continue;
                    }
                    if let Some(vel) = scene.world.get_mut::<Velocity>(player) {
                        vel.dx += dx / len * MOVE_ACCEL * dt;
                        vel.dy += dy / len * MOVE_ACCEL * dt;
                    }
                }
                Intent::Dash => {
                    let Some(dash) = scene.world.get::<DashState>(player).copied() else {
                        continue;
                    };
                    if dash.cooldown > 0 {
                        continue;
                    }
                    let Some(vel) = scene.world.get::<Velocity>(player).copied() else {
                        continue;
                    };
                    let speed = vel.speed();
                    if speed <= f32::EPSILON {
                        continue;
                    }
                    let _ = scene.world.insert(
                        player,
                        Velocity {
                            dx: vel.dx / speed * DASH_SPEED,
                            dy: vel.dy / speed * DASH_SPEED,
                        },
                    );
                    let _ = scene.world.insert(
                        player,
                        DashState {
                            active: DASH_TICKS,
                            cooldown: DASH_COOLDOWN,
                        },
                    );
                    // Dashes phase through damage.
                    let _ = scene.world.insert(player, Invulnerable { ticks: DASH_TICKS });
                }
                Intent::Attack { dx, dy } => {
                    let len = (dx * dx + dy * dy).sqrt();
                    if len <= f32::EPSILON {
                        continue;
                    }
                    let Some(pos) = scene.world.get::<Position>(player).copied() else {
                        continue;
                    };
                    let (nx, ny) = (dx / len, dy / len);
                    let (hx, hy) = (pos.x + nx * SLASH_REACH, pos.y + ny * SLASH_REACH);
                    // Drop-new on a full pool: the swing whiffs, the drop
                    // counter records it.
                    if scene
                        .spawn_hit_volume(player, hx, hy, SLASH_SIZE, SLASH_SIZE, SLASH_DAMAGE, SLASH_TICKS)
                        .is_ok()
                    {
                        scene.spawn_burst(hx, hy, 3, palette::NEON_CYAN);
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
