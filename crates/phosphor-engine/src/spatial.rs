//! Uniform-grid spatial hash for broad-phase collision and proximity.
//!
//! Entities with a [`Position`] are bucketed by `floor(coord / cell_size)`.
//! The index is rebuilt once per tick, after movement integration and
//! before any collision or proximity system runs -- queries against a stale
//! index are a pipeline-ordering bug, not something this module can detect.
//!
//! Queries scan only the buckets that can contain a match, never the whole
//! population, and their results are deterministic: radius hits come back
//! sorted by entity index, nearest ties break on lowest entity index.

use std::collections::HashMap;

use phosphor_ecs::prelude::{EntityId, World};

use crate::components::Position;

/// Default bucket edge, tuned to the typical interaction radius.
pub const DEFAULT_CELL_SIZE: f32 = 4.0;

/// Hard cap on nearest-query ring expansion, in buckets.
const RING_CAP: i32 = 32;

// ---------------------------------------------------------------------------
// SpatialHash
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    buckets: HashMap<(i32, i32), Vec<EntityId>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn bucket_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Clear and reinsert every positioned entity. O(n); bucket vectors are
    /// kept allocated across rebuilds.
    pub fn rebuild(&mut self, world: &World) {
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        for (id, pos) in world.iter::<Position>() {
            self.buckets
                .entry(self.bucket_of(pos.x, pos.y))
                .or_default()
                .push(id);
        }
    }

    /// Entities within `radius` of `(x, y)`, sorted by entity index.
    ///
    /// Broad phase scans the buckets overlapping the circle's bounding box
    /// (radius rounded up to whole buckets); the exact Euclidean filter is
    /// applied before returning, so bucket adjacency alone never admits a
    /// candidate.
    pub fn query_radius(&self, world: &World, x: f32, y: f32, radius: f32) -> Vec<EntityId> {
        let mut hits = Vec::new();
        if radius < 0.0 {
            return hits;
        }
        let (bx0, by0) = self.bucket_of(x - radius, y - radius);
        let (bx1, by1) = self.bucket_of(x + radius, y + radius);
        let r2 = radius * radius;

        for by in by0..=by1 {
            for bx in bx0..=bx1 {
                let Some(bucket) = self.buckets.get(&(bx, by)) else {
                    continue;
                };
                for &id in bucket {
                    let Some(pos) = world.get::<Position>(id) else {
                        continue;
                    };
                    let (dx, dy) = (pos.x - x, pos.y - y);
                    if dx * dx + dy * dy <= r2 {
                        hits.push(id);
                    }
                }
            }
        }
        hits.sort_unstable_by_key(|id| id.index());
        hits
    }

    /// Nearest entity to `(x, y)` passing `filter`, scanning outward ring by
    /// ring from the point's bucket. A found candidate does not stop the
    /// scan outright -- a nearer entity can sit across a bucket boundary --
    /// so rings keep expanding until no unscanned bucket could possibly
    /// beat the held best (every point of ring `r` is at least
    /// `(r - 1) * cell_size` away). Equal distances break on lowest entity
    /// index. Gives up after a hard ring cap.
    pub fn query_nearest<F>(&self, world: &World, x: f32, y: f32, filter: F) -> Option<EntityId>
    where
        F: Fn(EntityId) -> bool,
    {
        let (cx, cy) = self.bucket_of(x, y);
        let mut best: Option<(f32, EntityId)> = None;

        for ring in 0..=RING_CAP {
            if let Some((best_d2, _)) = best {
                let ring_floor = (ring - 1).max(0) as f32 * self.cell_size;
                if ring_floor * ring_floor > best_d2 {
                    break;
                }
            }
            for (bx, by) in ring_buckets(cx, cy, ring) {
                let Some(bucket) = self.buckets.get(&(bx, by)) else {
                    continue;
                };
                for &id in bucket {
                    if !filter(id) {
                        continue;
                    }
                    let Some(pos) = world.get::<Position>(id) else {
                        continue;
                    };
                    let (dx, dy) = (pos.x - x, pos.y - y);
                    let d2 = dx * dx + dy * dy;
                    let better = match best {
                        None => true,
                        Some((best_d2, best_id)) => {
                            d2 < best_d2 || (d2 == best_d2 && id.index() < best_id.index())
                        }
                    };
                    if better {
                        best = Some((d2, id));
                    }
                }
            }
        }
        best.map(|(_, id)| id)
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

/// The buckets at Chebyshev distance `ring` from `(cx, cy)`.
fn ring_buckets(cx: i32, cy: i32, ring: i32) -> Vec<(i32, i32)> {
    if ring == 0 {
        return vec![(cx, cy)];
    }
    let mut out = Vec::with_capacity((ring as usize) * 8);
    for dx in -ring..=ring {
        out.push((cx + dx, cy - ring));
        out.push((cx + dx, cy + ring));
    }
    for dy in (-ring + 1)..ring {
        out.push((cx - ring, cy + dy));
        out.push((cx + ring, cy + dy));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
