//! Render-state composition.
//!
//! Last system in the pipeline: clears the surface frame, writes every
//! glyph entity into the back buffer in layer order, and plots sub-cell
//! dots for fading particles. Purely buffer arithmetic -- the outer loop
//! decides when to flush.

use crate::components::*;
use crate::render::{palette, Cell, Color, DOTS_X, DOTS_Y};
use crate::scene::Scene;

/// Particles this close to expiry drop from a full glyph to a single
/// braille dot, and dim to gray for the last stretch.
const FADE_TICKS: u32 = 12;
const DIM_TICKS: u32 = 6;

pub fn compose(scene: &mut Scene, _dt: f32) {
    scene.surface.clear_frame();

    // Glyph pass, back-to-front by layer.
    let mut draw_list: Vec<(i8, u16, u16, Cell)> = Vec::new();
    for id in scene.world.query::<(Position, Renderable)>() {
        let (Some(pos), Some(rend)) = (
            scene.world.get::<Position>(id).copied(),
            scene.world.get::<Renderable>(id).copied(),
        ) else {
            continue;
        };
        if fading_particle(scene, id).is_some() {
            continue; // dot pass draws these
        }
        let (x, y) = (pos.x.floor() as i32, pos.y.floor() as i32);
        if x < 0 || y < 0 {
            continue;
        }
        // A fresh hit reads as a white flash.
        let color = if scene.world.has::<HitFlash>(id) {
            Color::WHITE
        } else {
            rend.color
        };
        draw_list.push((rend.layer, x as u16, y as u16, Cell::new(rend.glyph, color)));
    }
    draw_list.sort_by_key(|&(layer, ..)| layer);
    for (_, x, y, cell) in draw_list {
        scene.surface.set(x, y, cell);
    }

    // Dot pass: fading particles at sub-cell resolution.
    for id in scene.world.query::<(Position, Dot, ParticleTag, Lifetime)>() {
        let Some(ticks) = fading_particle(scene, id) else {
            continue;
        };
        let (Some(pos), Some(dot)) = (
            scene.world.get::<Position>(id).copied(),
            scene.world.get::<Dot>(id).copied(),
        ) else {
            continue;
        };
        let color = if ticks < DIM_TICKS {
            palette::GRAY_DARK
        } else {
            dot.color
        };
        scene.surface.plot(
            (pos.x * DOTS_X as f32).floor() as i32,
            (pos.y * DOTS_Y as f32).floor() as i32,
            color,
        );
    }
}

/// Remaining ticks for a particle in its fade-out window, else `None`.
fn fading_particle(scene: &Scene, id: phosphor_ecs::prelude::EntityId) -> Option<u32> {
    if !scene.world.has::<ParticleTag>(id) {
        return None;
    }
    let life = scene.world.get::<Lifetime>(id)?;
    (life.ticks < FADE_TICKS).then_some(life.ticks)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
