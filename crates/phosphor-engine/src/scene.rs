//! The scene aggregate: everything one simulation owns.
//!
//! A [`Scene`] is the single explicitly-owned bundle of world state passed
//! by reference into the scheduler -- store, pools, spatial index, intent
//! queue, seeded RNG, and render surface. There are no ambient singletons;
//! two scenes side by side cannot observe each other.

use phosphor_ecs::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::components::*;
use crate::intent::IntentQueue;
use crate::render::{Color, Surface};
use crate::spatial::SpatialHash;

// ---------------------------------------------------------------------------
// SceneConfig
// ---------------------------------------------------------------------------

/// Construction parameters for a [`Scene`].
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Surface (and arena) width in cells.
    pub width: u16,
    /// Surface (and arena) height in cells.
    pub height: u16,
    /// Projectile pool capacity (drop-new on exhaustion).
    pub projectile_capacity: usize,
    /// Particle pool capacity (evict-oldest on exhaustion).
    pub particle_capacity: usize,
    /// Hit-volume pool capacity (drop-new on exhaustion).
    pub hit_volume_capacity: usize,
    /// Spatial hash bucket edge, in cells.
    pub bucket_size: f32,
    /// RNG seed. Same seed + same intents = same frames.
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            projectile_capacity: 64,
            particle_capacity: 256,
            hit_volume_capacity: 16,
            bucket_size: crate::spatial::DEFAULT_CELL_SIZE,
            seed: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

pub struct Scene {
    pub world: World,
    pub projectiles: Pool,
    pub particles: Pool,
    pub hit_volumes: Pool,
    pub index: SpatialHash,
    pub intents: IntentQueue,
    pub rng: Pcg64Mcg,
    pub surface: Surface,
    /// Arena bounds in cells: entities are confined to `[0, w) x [0, h)`.
    pub bounds: (f32, f32),
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let mut world = World::new();
        let projectiles = Pool::new(
            &mut world,
            "projectiles",
            config.projectile_capacity,
            EvictPolicy::DropNew,
        );
        let particles = Pool::new(
            &mut world,
            "particles",
            config.particle_capacity,
            EvictPolicy::EvictOldest,
        );
        let hit_volumes = Pool::new(
            &mut world,
            "hit_volumes",
            config.hit_volume_capacity,
            EvictPolicy::DropNew,
        );
        Self {
            world,
            projectiles,
            particles,
            hit_volumes,
            index: SpatialHash::new(config.bucket_size),
            intents: IntentQueue::new(),
            rng: Pcg64Mcg::seed_from_u64(config.seed),
            surface: Surface::new(config.width, config.height),
            bounds: (config.width as f32, config.height as f32),
        }
    }

    /// Adopt a new surface size mid-session. The next flush emits the full
    /// frame; arena bounds follow the surface.
    pub fn resize_surface(&mut self, width: u16, height: u16) {
        self.surface.resize(width, height);
        self.bounds = (width as f32, height as f32);
    }

    // -- pooled spawns -------------------------------------------------------

    /// Spawn one particle. Evict-oldest policy means this only fails on a
    /// zero-capacity pool.
    pub fn spawn_particle(
        &mut self,
        x: f32,
        y: f32,
        vx: f32,
        vy: f32,
        color: Color,
        lifetime: u32,
    ) -> Result<EntityId, EcsError> {
        let e = self.particles.acquire(&mut self.world)?;
        self.world.insert(e, Position { x, y })?;
        self.world.insert(e, Velocity { dx: vx, dy: vy })?;
        self.world.insert(e, Gravity(540.0))?;
        self.world.insert(e, Lifetime { ticks: lifetime })?;
        self.world.insert(e, Dot { color })?;
        self.world.insert(
            e,
            Renderable {
                glyph: '*',
                color,
                layer: 1,
            },
        )?;
        self.world.insert(e, ParticleTag)?;
        Ok(e)
    }

    /// Spawn a radial burst of particles (death effects, impacts).
    pub fn spawn_burst(&mut self, x: f32, y: f32, count: usize, color: Color) {
        use rand::Rng;
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.gen_range(4.0..14.0);
            let lifetime = self.rng.gen_range(18..36);
            // Evict-oldest: old sparks make way for new ones.
            let _ = self.spawn_particle(
                x,
                y,
                angle.cos() * speed,
                angle.sin() * speed * 0.6,
                color,
                lifetime,
            );
        }
    }

    /// Spawn an in-flight projectile. Drop-new policy: on a full pool the
    /// spawn is refused and the pool's drop counter ticks up.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_projectile(
        &mut self,
        owner: EntityId,
        x: f32,
        y: f32,
        dir_x: f32,
        dir_y: f32,
        speed: f32,
        damage: i32,
        glyph: char,
        color: Color,
    ) -> Result<EntityId, EcsError> {
        let e = self.projectiles.acquire(&mut self.world)?;
        self.world.insert(e, Position { x, y })?;
        self.world.insert(
            e,
            Velocity {
                dx: dir_x * speed,
                dy: dir_y * speed,
            },
        )?;
        self.world.insert(e, Projectile { owner, damage })?;
        self.world.insert(e, CollisionBox::centered(1.0, 1.0))?;
        self.world.insert(
            e,
            Renderable {
                glyph,
                color,
                layer: 2,
            },
        )?;
        // Safety net: stray shots expire even if they never hit a wall.
        self.world.insert(e, Lifetime { ticks: 300 })?;
        self.world.insert(e, ProjectileTag)?;
        Ok(e)
    }

    /// Spawn a transient attack volume at `(x, y)`.
    pub fn spawn_hit_volume(
        &mut self,
        owner: EntityId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        damage: i32,
        ticks: u32,
    ) -> Result<EntityId, EcsError> {
        let e = self.hit_volumes.acquire(&mut self.world)?;
        self.world.insert(e, Position { x, y })?;
        self.world.insert(e, CollisionBox::centered(width, height))?;
        self.world.insert(e, HitVolume { owner, damage })?;
        self.world.insert(e, Lifetime { ticks })?;
        self.world.insert(e, HitVolumeTag)?;
        Ok(e)
    }

    /// Route a pooled entity back to its class pool; unpooled entities are
    /// plainly despawned. Reports whether anything was reclaimed.
    pub fn release_pooled(&mut self, entity: EntityId) -> bool {
        if !self.world.is_alive(entity) {
            return false;
        }
        if self.world.has::<ProjectileTag>(entity) {
            return self.projectiles.release(&mut self.world, entity);
        }
        if self.world.has::<ParticleTag>(entity) {
            return self.particles.release(&mut self.world, entity);
        }
        if self.world.has::<HitVolumeTag>(entity) {
            return self.hit_volumes.release(&mut self.world, entity);
        }
        self.world.despawn(entity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooled_spawns_route_back_to_their_pools() {
        let mut scene = Scene::new(SceneConfig::default());
        let shooter = scene.world.spawn();
        let p = scene
            .spawn_projectile(shooter, 5.0, 5.0, 1.0, 0.0, 30.0, 10, '-', Color::WHITE)
            .unwrap();
        assert_eq!(scene.projectiles.live_count(), 1);
        assert!(scene.release_pooled(p));
        assert_eq!(scene.projectiles.live_count(), 0);
        assert!(!scene.world.is_alive(p));
        assert!(!scene.release_pooled(p), "stale handle is already gone");
    }

    #[test]
    fn projectile_pool_drop_new_scenario() {
        let mut scene = Scene::new(SceneConfig {
            projectile_capacity: 2,
            ..Default::default()
        });
        let shooter = scene.world.spawn();
        for _ in 0..2 {
            scene
                .spawn_projectile(shooter, 0.0, 0.0, 1.0, 0.0, 10.0, 5, '-', Color::WHITE)
                .unwrap();
        }
        let third = scene.spawn_projectile(shooter, 0.0, 0.0, 1.0, 0.0, 10.0, 5, '-', Color::WHITE);
        assert!(matches!(third, Err(EcsError::PoolExhausted { .. })));
        assert_eq!(scene.projectiles.live_count(), 2);
        assert_eq!(scene.projectiles.dropped(), 1);
    }

    #[test]
    fn burst_respects_particle_capacity() {
        let mut scene = Scene::new(SceneConfig {
            particle_capacity: 8,
            ..Default::default()
        });
        scene.spawn_burst(10.0, 10.0, 50, Color::WHITE);
        assert_eq!(scene.particles.live_count(), 8, "evict-oldest caps the pool");
    }

    #[test]
    fn resize_updates_bounds_and_forces_redraw() {
        let mut scene = Scene::new(SceneConfig::default());
        scene.surface.flush();
        scene.resize_surface(40, 12);
        assert_eq!(scene.bounds, (40.0, 12.0));
        assert!(scene.surface.needs_full_redraw());
    }
}
