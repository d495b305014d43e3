//! Generational slot storage.
//!
//! Lines, markers and buffers refer to each other by index rather than by
//! pointer. A plain `usize` index would silently alias a reused slot once
//! the original entry is removed, so every index carries the generation of
//! the slot it was issued for. Looking up a stale index returns `None`
//! (or panics through `Index`, the same way slice indexing does).

use std::ops::{Index, IndexMut};

/// A slot index paired with the generation it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaIndex {
    idx: u32,
    generation: u32,
}

impl ArenaIndex {
    /// An index no arena ever issues, used to seed self-referential links.
    pub(crate) const DANGLING: ArenaIndex = ArenaIndex {
        idx: u32::MAX,
        generation: u32::MAX,
    };

    /// Returns the raw slot number.
    pub fn slot(&self) -> usize {
        self.idx as usize
    }

    /// Returns the generation this index was issued for.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with generation-checked indices and slot reuse.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores a value and returns its index.
    pub fn insert(&mut self, value: T) -> ArenaIndex {
        self.len += 1;

        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.value = Some(value);
            return ArenaIndex {
                idx,
                generation: slot.generation,
            };
        }

        let idx = u32::try_from(self.slots.len()).expect("arena exceeded u32::MAX slots");
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        ArenaIndex { idx, generation: 0 }
    }

    /// Removes a value. The slot's generation is bumped so that `index`
    /// can never reach whatever is stored there next.
    pub fn remove(&mut self, index: ArenaIndex) -> Option<T> {
        let slot = self.slots.get_mut(index.slot())?;
        if slot.generation != index.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index.idx);
        self.len -= 1;
        Some(value)
    }

    /// Returns a reference to a live value.
    pub fn get(&self, index: ArenaIndex) -> Option<&T> {
        self.slots
            .get(index.slot())
            .filter(|slot| slot.generation == index.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Returns a mutable reference to a live value.
    pub fn get_mut(&mut self, index: ArenaIndex) -> Option<&mut T> {
        self.slots
            .get_mut(index.slot())
            .filter(|slot| slot.generation == index.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Returns true if `index` still refers to a live value.
    pub fn contains(&self, index: ArenaIndex) -> bool {
        self.get(index).is_some()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over live values with their indices, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ArenaIndex, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    ArenaIndex {
                        idx: idx as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    /// Iterates mutably over live values with their indices, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ArenaIndex, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(idx, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|value| {
                (
                    ArenaIndex {
                        idx: idx as u32,
                        generation,
                    },
                    value,
                )
            })
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<ArenaIndex> for Arena<T> {
    type Output = T;

    fn index(&self, index: ArenaIndex) -> &T {
        self.get(index)
            .unwrap_or_else(|| panic!("stale arena index {index:?}"))
    }
}

impl<T> IndexMut<ArenaIndex> for Arena<T> {
    fn index_mut(&mut self, index: ArenaIndex) -> &mut T {
        self.get_mut(index)
            .unwrap_or_else(|| panic!("stale arena index {index:?}"))
    }
}
