//! Simulation component records.
//!
//! Plain data, no behavior, no references between components. Anything that
//! needs to point at another entity stores its [`EntityId`] and re-resolves
//! it through the store every tick, tolerating the target having died.
//!
//! Timer-shaped components (`Lifetime`, `Invulnerable`, `HitFlash`,
//! `Stunned`, dash and AI phase timers) count in whole simulation ticks and
//! are advanced by exactly one system each; "wait then act" behaviors are
//! state-machine edges on a timer reaching zero, never suspended control
//! flow.

use phosphor_ecs::prelude::EntityId;
use serde::{Deserialize, Serialize};

use crate::render::Color;

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// World position in cell units. Sub-cell precision matters: the renderer
/// quantizes, the simulation never does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn distance_to(&self, other: &Position) -> f32 {
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Unit vector toward `other`, or zero when the points coincide.
    pub fn direction_to(&self, other: &Position) -> (f32, f32) {
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > 0.0 {
            (dx / dist, dy / dist)
        } else {
            (0.0, 0.0)
        }
    }
}

/// Velocity in cells per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Velocity {
    pub fn speed(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

/// Per-step velocity damping coefficient (1.0 = none).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Friction(pub f32);

/// Speed clamp in cells per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxSpeed(pub f32);

/// A decaying impulse layered onto velocity: added each step, then damped
/// by `decay`, removed once negligible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    pub dx: f32,
    pub dy: f32,
    pub decay: f32,
}

/// Downward acceleration in cells per second squared (particle arcs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity(pub f32);

/// Axis-aligned collision bounds, offset from the entity position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBox {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl CollisionBox {
    /// Centered box of the given size.
    pub fn centered(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset_x: -width / 2.0,
            offset_y: -height / 2.0,
        }
    }

    /// AABB overlap test between two positioned boxes.
    pub fn overlaps(&self, pos: &Position, other: &CollisionBox, other_pos: &Position) -> bool {
        let x1 = pos.x + self.offset_x;
        let y1 = pos.y + self.offset_y;
        let x2 = other_pos.x + other.offset_x;
        let y2 = other_pos.y + other.offset_y;
        x1 < x2 + other.width
            && x1 + self.width > x2
            && y1 < y2 + other.height
            && y1 + self.height > y2
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// A glyph-cell visual. Higher layers draw over lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub glyph: char,
    pub color: Color,
    pub layer: i8,
}

/// A sub-cell visual: rendered as a single braille dot instead of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub color: Color,
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }
}

/// Contact damage dealt by this entity's body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Damage(pub i32);

/// Damage immunity window, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Invulnerable {
    pub ticks: u32,
}

/// White-out flash after taking a hit, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitFlash {
    pub ticks: u32,
}

/// AI freeze after a stagger, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stunned {
    pub ticks: u32,
}

/// Remaining ticks before the expiry sweep reclaims this entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    pub ticks: u32,
}

/// Player dash: a short burst with a cooldown gate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DashState {
    /// Ticks of dash left (0 = not dashing).
    pub active: u32,
    /// Ticks until the next dash is allowed.
    pub cooldown: u32,
}

/// An in-flight shot. The owner is a handle, not a reference: it is
/// re-resolved on hit and may well be dead by then.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: EntityId,
    pub damage: i32,
}

/// A transient attack volume (slash arc, shield bash zone).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitVolume {
    pub owner: EntityId,
    pub damage: i32,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitVolumeTag;

// ---------------------------------------------------------------------------
// AI
// ---------------------------------------------------------------------------

/// Behavior archetype plus its tuning payload. One AI system switches on
/// the variant; there are no per-type behavior objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AiBehavior {
    /// Accelerate at the player, lunging when close.
    Chase { speed: f32, lunge_range: f32 },
    /// Orbit a home point; rush anything that comes inside the radius.
    Guard {
        home_x: f32,
        home_y: f32,
        radius: f32,
        speed: f32,
    },
    /// Telegraphed line charge: windup, burst, recover.
    Charge {
        speed: f32,
        windup: u32,
        burst: u32,
        burst_speed: f32,
    },
}

/// Where a brain is in its behavior cycle. Transitions happen only when
/// `timer` reaches zero or a range condition trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiPhase {
    Idle,
    Windup,
    Active,
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiBrain {
    pub behavior: AiBehavior,
    pub phase: AiPhase,
    /// Ticks left in the current phase.
    pub timer: u32,
    /// Locked-in charge direction while winding up / bursting.
    pub aim_x: f32,
    pub aim_y: f32,
}

impl AiBrain {
    pub fn new(behavior: AiBehavior) -> Self {
        Self {
            behavior,
            phase: AiPhase::Idle,
            timer: 0,
            aim_x: 0.0,
            aim_y: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
