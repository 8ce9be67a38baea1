//! Fixed-capacity slot arenas backing every entity pool.
//!
//! A slot never moves: the index handed out at allocation stays the entity's
//! identity until it dies. Each slot also carries a generation that is bumped
//! when the slot is freed, so a [`Handle`] issued before the slot was recycled
//! no longer resolves.

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Occupancy flag exposed by anything the allocator can scan.
pub trait Liveness {
    /// Reports whether the slot currently holds a live entity.
    fn is_alive(&self) -> bool;
}

/// Finds the first dead slot, scanning circularly from just after `start_hint`.
///
/// Without a hint the scan starts at slot zero. Exactly `slots.len()` slots
/// are visited with the hint slot itself checked last, so `None` is returned
/// only when every slot is alive.
#[must_use]
pub fn find_dead<S: Liveness>(slots: &[S], start_hint: Option<usize>) -> Option<usize> {
    let capacity = slots.len();
    if capacity == 0 {
        return None;
    }
    let start = match start_hint {
        Some(hint) => (hint % capacity + 1) % capacity,
        None => 0,
    };
    (0..capacity)
        .map(|offset| (start + offset) % capacity)
        .find(|&index| !slots[index].is_alive())
}

const MAX_SLOTS: usize = u32::MAX as usize;

/// Generation-checked reference to an entity stored in a [`Pool`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
            marker: PhantomData,
        }
    }

    /// Slot index the handle points at.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation the slot had when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    entry: Option<T>,
}

impl<T> Liveness for Slot<T> {
    fn is_alive(&self) -> bool {
        self.entry.is_some()
    }
}

/// Fixed-capacity arena of entities addressed by slot.
#[derive(Clone, Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    hint: Option<usize>,
    live: usize,
}

impl<T> Pool<T> {
    /// Creates a pool with `capacity` dead slots.
    ///
    /// Handles store `u32` indices, so the slot count is capped at `u32::MAX`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_SLOTS);
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                entry: None,
            })
            .collect();
        Self {
            slots,
            hint: None,
            live: 0,
        }
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Reports whether no slot is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Reports whether every slot is alive.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.live == self.slots.len()
    }

    /// Slot index of the most recent allocation.
    #[must_use]
    pub fn hint(&self) -> Option<usize> {
        self.hint
    }

    /// Stores `value` in the next dead slot, handing the value back when the pool is full.
    pub fn insert(&mut self, value: T) -> Result<Handle<T>, T> {
        let Some(index) = find_dead(&self.slots, self.hint) else {
            return Err(value);
        };
        let slot = &mut self.slots[index];
        slot.entry = Some(value);
        self.hint = Some(index);
        self.live += 1;
        Ok(Handle::new(index, slot.generation))
    }

    /// Kills the entity behind `handle`, returning it when the handle was current.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let removed = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        Some(removed)
    }

    /// Reports whether `handle` still refers to a live entity.
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Resolves `handle` to its entity.
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    /// Resolves `handle` to its entity for mutation.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Current handle of the live entity in slot `index`.
    #[must_use]
    pub fn handle_at(&self, index: usize) -> Option<Handle<T>> {
        let slot = self.slots.get(index)?;
        slot.entry
            .as_ref()
            .map(|_| Handle::new(index, slot.generation))
    }

    /// Live entity stored in slot `index`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.entry.as_ref()
    }

    /// Live entity stored in slot `index`, for mutation.
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.entry.as_mut()
    }

    /// Live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|entry| (Handle::new(index, slot.generation), entry))
        })
    }

    /// Live entities in slot order, for mutation.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.entry
                .as_mut()
                .map(|entry| (Handle::new(index, generation), entry))
        })
    }

    /// Kills every live entity and forgets the allocation hint.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.hint = None;
        self.live = 0;
    }
}
