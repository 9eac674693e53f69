//! Velocity integration and arena confinement.

use crate::components::*;
use crate::scene::Scene;

/// Velocities below this (cells/second) snap to zero to stop slow drift.
const DRIFT_EPSILON: f32 = 0.3;

/// Knockback impulses below this magnitude are spent.
const KNOCKBACK_EPSILON: f32 = 0.6;

/// Cells of padding between the arena edge and any confined entity.
const EDGE_MARGIN: f32 = 1.0;

/// Integrate velocities into positions.
///
/// Per entity, in order: knockback impulse (decaying), gravity, friction,
/// max-speed clamp, then `position += velocity * dt`. The order matters --
/// knockback must feel the same friction as everything else, and the clamp
/// bounds the result of all of it.
pub fn integrate(scene: &mut Scene, dt: f32) {
    for id in scene.world.query::<(Position, Velocity)>() {
        let Some(mut vel) = scene.world.get::<Velocity>(id).copied() else {
            continue;
        };

        if let Some(mut kb) = scene.world.get::<Knockback>(id).copied() {
            vel.dx += kb.dx;
            vel.dy += kb.dy;
            kb.dx *= kb.decay;
            kb.dy *= kb.decay;
            if kb.dx.abs() < KNOCKBACK_EPSILON && kb.dy.abs() < KNOCKBACK_EPSILON {
                let _ = scene.world.remove::<Knockback>(id);
            } else {
                let _ = scene.world.insert(id, kb);
            }
        }

        if let Some(gravity) = scene.world.get::<Gravity>(id).copied() {
            vel.dy += gravity.0 * dt;
        }

        if let Some(friction) = scene.world.get::<Friction>(id).copied() {
            vel.dx *= friction.0;
            vel.dy *= friction.0;
        }

        if let Some(max) = scene.world.get::<MaxSpeed>(id).copied() {
            let speed = vel.speed();
            if speed > max.0 {
                let scale = max.0 / speed;
                vel.dx *= scale;
                vel.dy *= scale;
            }
        }

        if vel.dx.abs() < DRIFT_EPSILON {
            vel.dx = 0.0;
        }
        if vel.dy.abs() < DRIFT_EPSILON {
            vel.dy = 0.0;
        }

        if let Some(pos) = scene.world.get_mut::<Position>(id) {
            pos.x += vel.dx * dt;
            pos.y += vel.dy * dt;
        }
        let _ = scene.world.insert(id, vel);
    }
}

/// Keep bodied entities inside the arena.
///
/// Particles fly free and expire on their own. Projectiles leaving the
/// arena are released back to their pool. Everything else is clamped to the
/// margin with the offending velocity component zeroed.
pub fn confine(scene: &mut Scene, _dt: f32) {
    let (w, h) = scene.bounds;
    for id in scene.world.query::<(Position, Velocity)>() {
        if scene.world.has::<ParticleTag>(id) {
            continue;
        }
        let Some(pos) = scene.world.get::<Position>(id).copied() else {
            continue;
        };

        if scene.world.has::<ProjectileTag>(id) {
            if pos.x < 0.0 || pos.x >= w || pos.y < 0.0 || pos.y >= h {
                scene.release_pooled(id);
            }
            continue;
        }

        let (min_x, max_x) = (EDGE_MARGIN, w - EDGE_MARGIN - 1.0);
        let (min_y, max_y) = (EDGE_MARGIN, h - EDGE_MARGIN - 1.0);
        let clamped = Position {
            x: pos.x.clamp(min_x, max_x),
            y: pos.y.clamp(min_y, max_y),
        };
        if clamped != pos {
            if let Some(vel) = scene.world.get_mut::<Velocity>(id) {
                if clamped.x != pos.x {
                    vel.dx = 0.0;
                }
                if clamped.y != pos.y {
                    vel.dy = 0.0;
                }
            }
            let _ = scene.world.insert(id, clamped);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;
    use crate::scene::SceneConfig;

    const DT: f32 = 1.0 / 60.0;

    fn scene() -> Scene {
        Scene::new(SceneConfig::default())
    }

    #[test]
    fn integrates_position_from_velocity() {
        let mut scene = scene();
        let e = scene.world.spawn_with(Position { x: 10.0, y: 10.0 });
        scene.world.insert(e, Velocity { dx: 60.0, dy: -30.0 }).unwrap();

        integrate(&mut scene, DT);

        let pos = scene.world.get::<Position>(e).unwrap();
        assert!((pos.x - 11.0).abs() < 1e-4);
        assert!((pos.y - 9.5).abs() < 1e-4);
    }

    #[test]
    fn friction_damps_and_drift_snaps_to_zero() {
        let mut scene = scene();
        let e = scene.world.spawn_with(Position { x: 0.0, y: 0.0 });
        scene.world.insert(e, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
        scene.world.insert(e, Friction(0.5)).unwrap();

        integrate(&mut scene, DT);

        // 1.0 * 0.5 = 0.5 < DRIFT_EPSILON, so it dies outright.
        assert_eq!(scene.world.get::<Velocity>(e).unwrap().dx, 0.0);
    }

    #[test]
    fn max_speed_clamps_magnitude() {
        let mut scene = scene();
        let e = scene.world.spawn_with(Position { x: 0.0, y: 0.0 });
        scene.world.insert(e, Velocity { dx: 300.0, dy: 400.0 }).unwrap();
        scene.world.insert(e, MaxSpeed(50.0)).unwrap();

        integrate(&mut scene, DT);

        let vel = scene.world.get::<Velocity>(e).unwrap();
        assert!((vel.speed() - 50.0).abs() < 1e-3);
        // Direction preserved: 3-4-5 triangle.
        assert!((vel.dx - 30.0).abs() < 1e-3);
        assert!((vel.dy - 40.0).abs() < 1e-3);
    }

    #[test]
    fn knockback_decays_and_expires() {
        let mut scene = scene();
        let e = scene.world.spawn_with(Position { x: 0.0, y: 0.0 });
        scene.world.insert(e, Velocity { dx: 0.0, dy: 0.0 }).unwrap();
        scene
            .world
            .insert(
                e,
                Knockback {
                    dx: 30.0,
                    dy: 0.0,
                    decay: 0.1,
                },
            )
            .unwrap();

        integrate(&mut scene, DT);
        assert!(scene.world.get::<Velocity>(e).unwrap().dx > 0.0);
        // 30 * 0.1 = 3.0, still above epsilon -> impulse survives one step.
        assert!(scene.world.has::<Knockback>(e));

        integrate(&mut scene, DT);
        // 3.0 * 0.1 = 0.3 < epsilon -> spent.
        assert!(!scene.world.has::<Knockback>(e));
    }

    #[test]
    fn gravity_pulls_particles_down() {
        let mut scene = scene();
        let e = scene
            .spawn_particle(5.0, 5.0, 0.0, 0.0, Color::WHITE, 60)
            .unwrap();
        let vy0 = scene.world.get::<Velocity>(e).unwrap().dy;
        integrate(&mut scene, DT);
        assert!(scene.world.get::<Velocity>(e).unwrap().dy >= vy0);
    }

    #[test]
    fn confine_clamps_and_kills_velocity_component() {
        let mut scene = scene(); // 80x24
        let e = scene.world.spawn_with(Position { x: -3.0, y: 10.0 });
        scene.world.insert(e, Velocity { dx: -50.0, dy: 10.0 }).unwrap();

        confine(&mut scene, DT);

        let pos = scene.world.get::<Position>(e).unwrap();
        assert_eq!(pos.x, 1.0, "clamped to the margin");
        let vel = scene.world.get::<Velocity>(e).unwrap();
        assert_eq!(vel.dx, 0.0);
        assert_eq!(vel.dy, 10.0, "unoffending axis untouched");
    }

    #[test]
    fn projectiles_release_at_the_edge() {
        let mut scene = scene();
        let shooter = scene.world.spawn();
        let p = scene
            .spawn_projectile(shooter, 81.0, 5.0, 1.0, 0.0, 10.0, 5, '-', Color::WHITE)
            .unwrap();

        confine(&mut scene, DT);

        assert!(!scene.world.is_alive(p));
        assert_eq!(scene.projectiles.live_count(), 0);
    }

    #[test]
    fn particles_may_leave_the_arena() {
        let mut scene = scene();
        let e = scene
            .spawn_particle(-5.0, -5.0, 0.0, 0.0, Color::WHITE, 60)
            .unwrap();
        confine(&mut scene, DT);
        assert!(scene.world.is_alive(e));
        assert_eq!(scene.world.get::<Position>(e).unwrap().x, -5.0);
    }
}
