//! The entity/component world.
//!
//! [`World`] owns the entity allocator and one sparse-set column per
//! component type. Systems borrow it for the duration of a tick; nothing
//! else holds component memory.
//!
//! Two contract points worth calling out:
//!
//! - `despawn` is **idempotent**: a stale or already-dead handle is a no-op
//!   that reports "not found", never an error escalation and never undefined
//!   access.
//! - component rows are cleared **lazily**. Despawning only bumps the slot
//!   generation; the dead slot's rows are swept from every column the next
//!   time that slot is handed out. Queries filter on liveness, so the stale
//!   rows are never observable in between.

use std::any::TypeId;
use std::collections::HashMap;

use crate::entity::{EntityAllocator, EntityId};
use crate::store::{Column, Component, SparseSet};
use crate::EcsError;

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Typed, sparse storage of component records keyed by entity handle.
#[derive(Default)]
pub struct World {
    allocator: EntityAllocator,
    columns: HashMap<TypeId, Box<dyn Column>>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            columns: HashMap::new(),
        }
    }

    // -- entity lifecycle ----------------------------------------------------

    /// Create a live entity with no components.
    pub fn spawn(&mut self) -> EntityId {
        let (id, recycled) = self.allocator.allocate();
        if recycled {
            self.sweep(id.index());
        }
        id
    }

    /// Create a live entity carrying one component.
    pub fn spawn_with<T: Component>(&mut self, value: T) -> EntityId {
        let id = self.spawn();
        self.column_mut::<T>().insert(id.index(), value);
        id
    }

    /// Create a live entity on a *reserved* slot. Reserved slots belong to a
    /// pool: releasing them parks the slot instead of returning it to the
    /// general free list. See [`Pool`](crate::pool::Pool).
    pub fn spawn_reserved(&mut self) -> EntityId {
        self.allocator.allocate_reserved()
    }

    /// Destroy an entity. Returns `true` if it was alive; a stale or unknown
    /// handle is a no-op reporting `false`. O(1) -- component rows are swept
    /// lazily when the slot is reused.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.allocator.release(entity)
    }

    /// Revive a parked reserved slot, sweeping its lazily retained rows and
    /// returning a handle at the slot's current generation.
    pub fn revive(&mut self, index: u32) -> Option<EntityId> {
        let id = self.allocator.revive(index)?;
        self.sweep(index);
        Some(id)
    }

    /// Whether `entity` is live at its handle's generation.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    // -- component access ----------------------------------------------------

    /// Attach (or overwrite) a component on a live entity.
    pub fn insert<T: Component>(&mut self, entity: EntityId, value: T) -> Result<(), EcsError> {
        if !self.allocator.is_alive(entity) {
            return Err(EcsError::NotFound { entity });
        }
        self.column_mut::<T>().insert(entity.index(), value);
        Ok(())
    }

    /// Detach a component from a live entity. `Ok(None)` when the entity is
    /// alive but never carried `T`.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Result<Option<T>, EcsError> {
        if !self.allocator.is_alive(entity) {
            return Err(EcsError::NotFound { entity });
        }
        Ok(self
            .typed_column_mut::<T>()
            .and_then(|col| col.remove(entity.index())))
    }

    /// Read a component. `None` covers both a stale handle and a missing
    /// component -- either way the entity-as-addressed does not have it.
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.typed_column::<T>()?.get(entity.index())
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.typed_column_mut::<T>()?.get_mut(entity.index())
    }

    /// Whether a live entity carries `T`.
    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.get::<T>(entity).is_some()
    }

    // -- queries -------------------------------------------------------------

    /// Handles whose component set is a superset of `S`, linear in the
    /// smallest member column. Order is dense (insertion) order within that
    /// column and is not stable across despawn/spawn cycles.
    pub fn query<S: ComponentSet>(&self) -> Vec<EntityId> {
        S::collect(self)
    }

    /// Iterate one column read-only: `(handle, record)` in dense order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.typed_column::<T>()
            .into_iter()
            .flat_map(|col| col.iter())
            .filter_map(|(index, value)| self.id_at(index).map(|id| (id, value)))
    }

    // -- internals -----------------------------------------------------------

    /// Drop every column's row for `index` (slot reuse path).
    fn sweep(&mut self, index: u32) {
        for column in self.columns.values_mut() {
            column.sweep(index);
        }
    }

    fn typed_column<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.columns
            .get(&TypeId::of::<T>())
            .and_then(|c| c.as_any().downcast_ref::<SparseSet<T>>())
    }

    fn typed_column_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        self.columns
            .get_mut(&TypeId::of::<T>())
            .and_then(|c| c.as_any_mut().downcast_mut::<SparseSet<T>>())
    }

    fn column_mut<T: Component>(&mut self) -> &mut SparseSet<T> {
        let column = self
            .columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()));
        column
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("column registered under mismatched TypeId")
    }

    /// Dense index slice for `T`'s column, if the column exists.
    fn column_indices<T: Component>(&self) -> Option<&[u32]> {
        self.columns.get(&TypeId::of::<T>()).map(|c| c.indices())
    }

    /// Whether the slot at `index` currently holds a row of `T`.
    fn contains_index<T: Component>(&self, index: u32) -> bool {
        self.typed_column::<T>()
            .is_some_and(|col| col.contains(index))
    }

    /// Handle for a *live* slot at its current generation, else `None`.
    /// This is what keeps lazily retained rows invisible to queries.
    fn id_at(&self, index: u32) -> Option<EntityId> {
        if !self.allocator.index_alive(index) {
            return None;
        }
        self.allocator
            .generation_of(index)
            .map(|generation| EntityId::new(index, generation))
    }
}

// ---------------------------------------------------------------------------
// ComponentSet
// ---------------------------------------------------------------------------

/// A set of component types usable as a query request, written as a tuple:
/// `world.query::<(Position,)>()`, `world.query::<(Position, Velocity)>()`.
pub trait ComponentSet {
    /// Collect the handles whose component set is a superset of this set.
    fn collect(world: &World) -> Vec<EntityId>;
}

macro_rules! impl_component_set {
    ($(($ty:ident, $col:ident)),+) => {
        impl<$($ty: Component),+> ComponentSet for ($($ty,)+) {
            fn collect(world: &World) -> Vec<EntityId> {
                $(
                    let Some($col) = world.column_indices::<$ty>() else {
                        return Vec::new();
                    };
                )+
                // Scan the smallest member column, probe the rest.
                let mut seed: &[u32] = &[];
                let mut smallest = usize::MAX;
                $(
                    if $col.len() < smallest {
                        smallest = $col.len();
                        seed = $col;
                    }
                )+
                seed.iter()
                    .copied()
                    .filter(|&index| true $(&& world.contains_index::<$ty>(index))+)
                    .filter_map(|index| world.id_at(index))
                    .collect()
            }
        }
    };
}

impl_component_set!((A, a));
impl_component_set!((A, a), (B, b));
impl_component_set!((A, a), (B, b), (C, c));
impl_component_set!((A, a), (B, b), (C, c), (D, d));

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
