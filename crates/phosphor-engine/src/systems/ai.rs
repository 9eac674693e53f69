//! Enemy decision making.
//!
//! One system switches on the [`AiBehavior`] tag -- there are no per-type
//! behavior objects. Phase transitions ride on the brain's countdown timer
//! reaching zero or a range condition tripping; nothing suspends.
//!
//! The player is found through the spatial index (`query_nearest`), so a
//! dead player simply means no target and idle brains.

use crate::components::*;
use crate::scene::Scene;

/// Chase: ticks of lunge gate, lunge burst, and recovery.
const LUNGE_GATE: u32 = 30;
const LUNGE_TICKS: u32 = 10;
const LUNGE_RECOVER: u32 = 18;
/// Extra acceleration during a lunge, cells/s per tick.
const LUNGE_BOOST: f32 = 48.0;

/// Guard: shot cadence and projectile tuning.
const GUARD_FIRE_GATE: u32 = 45;
const GUARD_SHOT_SPEED: f32 = 35.0;
const GUARD_SHOT_DAMAGE: i32 = 10;

/// Charge: trigger range and recovery.
const CHARGE_RANGE: f32 = 14.0;
const CHARGE_RECOVER: u32 = 24;

/// Stunned brains lose half their velocity per tick and think nothing.
const STUN_DAMPING: f32 = 0.5;

pub fn think(scene: &mut Scene, dt: f32) {
    let brains = scene.world.query::<(EnemyTag, AiBrain, Position, Velocity)>();
    if brains.is_empty() {
        return;
    }

    for id in brains {
        if scene.world.has::<Stunned>(id) {
            if let Some(vel) = scene.world.get_mut::<Velocity>(id) {
                vel.dx *= STUN_DAMPING;
                vel.dy *= STUN_DAMPING;
            }
            continue;
        }

        let Some(pos) = scene.world.get::<Position>(id).copied() else {
            continue;
        };
        let Some(mut brain) = scene.world.get::<AiBrain>(id).copied() else {
            continue;
        };
        let Some(mut vel) = scene.world.get::<Velocity>(id).copied() else {
            continue;
        };

        // Nearest live player, through the index. No position has changed
        // since the last rebuild -- integration runs after this system -- so
        // the index is current here, not stale.
        let target = scene
            .index
            .query_nearest(&scene.world, pos.x, pos.y, |candidate| {
                scene.world.has::<PlayerTag>(candidate)
            })
            .and_then(|p| scene.world.get::<Position>(p).copied());

        match brain.behavior {
            AiBehavior::Chase { speed, lunge_range } => {
                think_chase(&mut brain, &mut vel, &pos, target.as_ref(), speed, lunge_range, dt);
            }
            AiBehavior::Guard {
                home_x,
                home_y,
                radius,
                speed,
            } => {
                let fired = think_guard(
                    &mut brain,
                    &mut vel,
                    &pos,
                    target.as_ref(),
                    (home_x, home_y),
                    radius,
                    speed,
                    dt,
                );
                if let Some((dir_x, dir_y)) = fired {
                    let _ = scene.spawn_projectile(
                        id,
                        pos.x + dir_x,
                        pos.y + dir_y,
                        dir_x,
                        dir_y,
                        GUARD_SHOT_SPEED,
                        GUARD_SHOT_DAMAGE,
                        'o',
                        crate::render::palette::NEON_ORANGE,
                    );
                }
            }
            AiBehavior::Charge {
                speed,
                windup,
                burst,
                burst_speed,
            } => {
                think_charge(
                    &mut brain,
                    &mut vel,
                    &pos,
                    target.as_ref(),
                    speed,
                    windup,
                    burst,
                    burst_speed,
                    dt,
                );
            }
        }

        let _ = scene.world.insert(id, brain);
        let _ = scene.world.insert(id, vel);
    }
}

/// Chase: accelerate at the target, lunge when close, recover, repeat.
fn think_chase(
    brain: &mut AiBrain,
    vel: &mut Velocity,
    pos: &Position,
    target: Option<&Position>,
    speed: f32,
    lunge_range: f32,
    dt: f32,
) {
    match brain.phase {
        AiPhase::Idle => {
            let Some(target) = target else {
                return;
            };
            let (dx, dy) = pos.direction_to(target);
            vel.dx += dx * speed * dt;
            vel.dy += dy * speed * dt;
            brain.timer = brain.timer.saturating_sub(1);
            if brain.timer == 0 && pos.distance_to(target) < lunge_range {
                brain.phase = AiPhase::Active;
                brain.timer = LUNGE_TICKS;
                brain.aim_x = dx;
                brain.aim_y = dy;
            }
        }
        // Chase has no windup; treat it as idle if something left it there.
        AiPhase::Windup => {
            brain.phase = AiPhase::Idle;
            brain.timer = LUNGE_GATE;
        }
        AiPhase::Active => {
            vel.dx += brain.aim_x * LUNGE_BOOST;
            vel.dy += brain.aim_y * LUNGE_BOOST;
            brain.timer = brain.timer.saturating_sub(1);
            if brain.timer == 0 {
                brain.phase = AiPhase::Recover;
                brain.timer = LUNGE_RECOVER;
            }
        }
        AiPhase::Recover => {
            vel.dx *= 0.85;
            vel.dy *= 0.85;
            brain.timer = brain.timer.saturating_sub(1);
            if brain.timer == 0 {
                brain.phase = AiPhase::Idle;
                brain.timer = LUNGE_GATE;
            }
        }
    }
}

/// Guard: hold a post, rush intruders, fire at the target on a cadence.
/// Returns the shot direction when the cadence timer fires.
#[allow(clippy::too_many_arguments)]
fn think_guard(
    brain: &mut AiBrain,
    vel: &mut Velocity,
    pos: &Position,
    target: Option<&Position>,
    home: (f32, f32),
    radius: f32,
    speed: f32,
    dt: f32,
) -> Option<(f32, f32)> {
    let home_pos = Position {
        x: home.0,
        y: home.1,
    };
    let intruder = target.filter(|t| home_pos.distance_to(t) < radius);

    match intruder {
        Some(t) => {
            let (dx, dy) = pos.direction_to(t);
            vel.dx += dx * speed * dt;
            vel.dy += dy * speed * dt;
            brain.timer = brain.timer.saturating_sub(1);
            if brain.timer == 0 {
                brain.timer = GUARD_FIRE_GATE;
                return Some((dx, dy));
            }
        }
        None => {
            // Walk back to the post; re-arm so the first shot at a new
            // intruder is not instant.
            let (dx, dy) = pos.direction_to(&home_pos);
            if pos.distance_to(&home_pos) > 0.5 {
                vel.dx += dx * speed * 0.5 * dt;
                vel.dy += dy * speed * 0.5 * dt;
            }
            brain.timer = GUARD_FIRE_GATE;
        }
    }
    None
}

/// Charge: drift, telegraph (windup), burst along the locked aim, recover.
#[allow(clippy::too_many_arguments)]
fn think_charge(
    brain: &mut AiBrain,
    vel: &mut Velocity,
    pos: &Position,
    target: Option<&Position>,
    speed: f32,
    windup: u32,
    burst: u32,
    burst_speed: f32,
    dt: f32,
) {
    match brain.phase {
        AiPhase::Idle => {
            let Some(target) = target else {
                return;
            };
            let (dx, dy) = pos.direction_to(target);
            vel.dx += dx * speed * dt;
            vel.dy += dy * speed * dt;
            if pos.distance_to(target) < CHARGE_RANGE {
                // Telegraph: lock the aim now so the player can read it.
                brain.phase = AiPhase::Windup;
                brain.timer = windup;
                brain.aim_x = dx;
                brain.aim_y = dy;
            }
        }
        AiPhase::Windup => {
            vel.dx *= 0.8;
            vel.dy *= 0.8;
            brain.timer = brain.timer.saturating_sub(1);
            if brain.timer == 0 {
                brain.phase = AiPhase::Active;
                brain.timer = burst;
            }
        }
        AiPhase::Active => {
            vel.dx = brain.aim_x * burst_speed;
            vel.dy = brain.aim_y * burst_speed;
            brain.timer = brain.timer.saturating_sub(1);
            if brain.timer == 0 {
                brain.phase = AiPhase::Recover;
                brain.timer = CHARGE_RECOVER;
            }
        }
        AiPhase::Recover => {
            vel.dx *= 0.8;
            vel.dy *= 0.8;
            brain.timer = brain.timer.saturating_sub(1);
            if brain.timer == 0 {
                brain.phase = AiPhase::Idle;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
