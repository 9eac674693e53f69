//! Collision and damage resolution.
//!
//! Runs strictly after the spatial index rebuild: every query here assumes
//! bucket membership matches this tick's integrated positions. Broad phase
//! goes through [`SpatialHash::query_radius`], narrow phase is exact AABB
//! overlap, and faction is decided by resolving the attack's owner handle --
//! an owner that died this tick simply resolves to the default (player-side)
//! faction, it never dangles.

use phosphor_ecs::prelude::EntityId;

use crate::components::*;
use crate::render::palette;
use crate::scene::Scene;

/// Impulse applied away from a hit's source, cells/s.
const HIT_KNOCKBACK: f32 = 70.0;
const KNOCKBACK_DECAY: f32 = 0.7;

/// Broad-phase padding over a volume's own extent, to cover target boxes.
const TARGET_REACH: f32 = 2.0;

/// Post-hit windows, in ticks.
const PLAYER_INVULN: u32 = 45;
const HIT_FLASH_TICKS: u32 = 6;
const ENEMY_STAGGER: u32 = 8;

/// Broad-phase radius for body-contact checks around the player.
const CONTACT_RANGE: f32 = 3.0;

pub fn collide(scene: &mut Scene, _dt: f32) {
    resolve_hit_volumes(scene);
    resolve_projectiles(scene);
    resolve_contact(scene);
}

/// Whether an attack owned by `owner` hits players (true) or enemies
/// (false). A dead owner no longer has its tag and defaults to hitting
/// enemies -- the attack outliving its attacker is normal.
fn hits_players(scene: &Scene, owner: EntityId) -> bool {
    scene.world.has::<EnemyTag>(owner)
}

/// Whether `target` is a damageable combatant on the attacked side.
fn valid_target(scene: &Scene, target: EntityId, against_players: bool) -> bool {
    if !scene.world.has::<Health>(target) {
        return false;
    }
    if against_players {
        scene.world.has::<PlayerTag>(target)
    } else {
        scene.world.has::<EnemyTag>(target)
    }
}

fn apply_damage(scene: &mut Scene, target: EntityId, source: &Position, amount: i32) {
    let Some(mut health) = scene.world.get::<Health>(target).copied() else {
        return;
    };
    health.current -= amount;
    let _ = scene.world.insert(target, health);
    let _ = scene.world.insert(target, HitFlash { ticks: HIT_FLASH_TICKS });

    if let Some(tpos) = scene.world.get::<Position>(target).copied() {
        let (dx, dy) = source.direction_to(&tpos);
        let _ = scene.world.insert(
            target,
            Knockback {
                dx: dx * HIT_KNOCKBACK,
                dy: dy * HIT_KNOCKBACK,
                decay: KNOCKBACK_DECAY,
            },
        );
    }

    if scene.world.has::<PlayerTag>(target) {
        let _ = scene.world.insert(target, Invulnerable { ticks: PLAYER_INVULN });
    } else {
        let _ = scene.world.insert(target, Stunned { ticks: ENEMY_STAGGER });
    }
}

/// Slash arcs and other transient volumes. A volume that connects with
/// anything this tick is spent and returns to its pool; one that whiffs
/// lingers until its lifetime expires.
fn resolve_hit_volumes(scene: &mut Scene) {
    for id in scene.world.query::<(HitVolumeTag, Position, CollisionBox, HitVolume)>() {
        let (Some(pos), Some(vbox), Some(hv)) = (
            scene.world.get::<Position>(id).copied(),
            scene.world.get::<CollisionBox>(id).copied(),
            scene.world.get::<HitVolume>(id).copied(),
        ) else {
            continue;
        };
        let against_players = hits_players(scene, hv.owner);
        let reach = vbox.width.max(vbox.height) / 2.0 + TARGET_REACH;

        let mut connected = false;
        for target in scene.index.query_radius(&scene.world, pos.x, pos.y, reach) {
            if target == id || target == hv.owner {
                continue;
            }
            if !valid_target(scene, target, against_players) {
                continue;
            }
            if scene.world.has::<Invulnerable>(target) {
                continue;
            }
            let (Some(tpos), Some(tbox)) = (
                scene.world.get::<Position>(target).copied(),
                scene.world.get::<CollisionBox>(target).copied(),
            ) else {
                continue;
            };
            if !vbox.overlaps(&pos, &tbox, &tpos) {
                continue;
            }
            apply_damage(scene, target, &pos, hv.damage);
            connected = true;
        }
        if connected {
            scene.release_pooled(id);
        }
    }
}

/// Projectiles stop on the first body they hit.
fn resolve_projectiles(scene: &mut Scene) {
    for id in scene.world.query::<(ProjectileTag, Position, CollisionBox, Projectile)>() {
        let (Some(pos), Some(pbox), Some(shot)) = (
            scene.world.get::<Position>(id).copied(),
            scene.world.get::<CollisionBox>(id).copied(),
            scene.world.get::<Projectile>(id).copied(),
        ) else {
            continue;
        };
        let against_players = hits_players(scene, shot.owner);
        let reach = pbox.width.max(pbox.height) / 2.0 + TARGET_REACH;

        for target in scene.index.query_radius(&scene.world, pos.x, pos.y, reach) {
            if target == id || target == shot.owner {
                continue;
            }
            if !valid_target(scene, target, against_players) {
                continue;
            }
            if scene.world.has::<Invulnerable>(target) {
                continue;
            }
            let (Some(tpos), Some(tbox)) = (
                scene.world.get::<Position>(target).copied(),
                scene.world.get::<CollisionBox>(target).copied(),
            ) else {
                continue;
            };
            if !pbox.overlaps(&pos, &tbox, &tpos) {
                continue;
            }
            apply_damage(scene, target, &pos, shot.damage);
            scene.spawn_burst(pos.x, pos.y, 4, palette::NEON_ORANGE);
            scene.release_pooled(id);
            break;
        }
    }
}

/// Enemy bodies grind against the player.
fn resolve_contact(scene: &mut Scene) {
    for player in scene.world.query::<(PlayerTag, Position, CollisionBox, Health)>() {
        if scene.world.has::<Invulnerable>(player) {
            continue;
        }
        let (Some(pos), Some(pbox)) = (
            scene.world.get::<Position>(player).copied(),
            scene.world.get::<CollisionBox>(player).copied(),
        ) else {
            continue;
        };

        for enemy in scene.index.query_radius(&scene.world, pos.x, pos.y, CONTACT_RANGE) {
            if !scene.world.has::<EnemyTag>(enemy) {
                continue;
            }
            let (Some(damage), Some(epos), Some(ebox)) = (
                scene.world.get::<Damage>(enemy).copied(),
                scene.world.get::<Position>(enemy).copied(),
                scene.world.get::<CollisionBox>(enemy).copied(),
            ) else {
                continue;
            };
            if !pbox.overlaps(&pos, &ebox, &epos) {
                continue;
            }
            apply_damage(scene, player, &epos, damage.0);
            scene.spawn_burst(pos.x, pos.y, 6, palette::NEON_RED);
            break;
        }
    }
}

/// Entities at zero health leave the field: a death burst from the particle
/// pool, then release (pooled classes to their pool, the rest despawn).
pub fn reap(scene: &mut Scene, _dt: f32) {
    for id in scene.world.query::<(Health, Position)>() {
        let Some(health) = scene.world.get::<Health>(id).copied() else {
            continue;
        };
        if health.current > 0 {
            continue;
        }
        let Some(pos) = scene.world.get::<Position>(id).copied() else {
            continue;
        };
        let color = if scene.world.has::<EnemyTag>(id) {
            palette::NEON_MAGENTA
        } else if scene.world.has::<PlayerTag>(id) {
            palette::NEON_CYAN
        } else {
            palette::GRAY_LIGHT
        };
        scene.spawn_burst(pos.x, pos.y, 12, color);
        scene.release_pooled(id);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
