//! The buffer list.
//!
//! Buffers live in a generational arena and are named by [`BufferId`].
//! A separate order vector keeps them most-recently-used first, which is
//! the order `switch-to-buffer` and `kill-buffer` walk.

use std::ops::{Index, IndexMut};

use tern_buffer::{Arena, ArenaIndex, Buffer};

/// Name of the buffer that exists when nothing else does.
pub const SCRATCH: &str = "*scratch*";

/// Handle to a buffer in a [`BufferList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(ArenaIndex);

/// All live buffers, most recently used first.
#[derive(Debug, Default)]
pub struct BufferList {
    arena: Arena<Buffer>,
    order: Vec<BufferId>,
}

impl BufferList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a buffer at the head of the list.
    pub fn insert(&mut self, buffer: Buffer) -> BufferId {
        let id = BufferId(self.arena.insert(buffer));
        self.order.insert(0, id);
        tracing::debug!(buffer = %self.arena[id.0].name(), "buffer created");
        id
    }

    /// Creates an empty buffer named exactly `name` at the head of the list.
    pub fn create(&mut self, name: impl Into<String>) -> BufferId {
        self.insert(Buffer::new(name))
    }

    /// Creates a `*scratch*` buffer: temporary, unnamed on disk, never saved.
    pub fn create_scratch(&mut self) -> BufferId {
        let mut bp = Buffer::new(self.unique_name(SCRATCH));
        let flags = bp.flags_mut();
        flags.needname = true;
        flags.temporary = true;
        flags.nosave = true;
        self.insert(bp)
    }

    /// Finds a buffer by name.
    pub fn find(&self, name: &str) -> Option<BufferId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.arena[id.0].name() == name)
    }

    /// Returns a buffer.
    pub fn get(&self, id: BufferId) -> Option<&Buffer> {
        self.arena.get(id.0)
    }

    /// Returns a buffer mutably.
    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
        self.arena.get_mut(id.0)
    }

    /// Returns true if the buffer is still alive.
    pub fn contains(&self, id: BufferId) -> bool {
        self.arena.contains(id.0)
    }

    /// Makes `id` the most recently used buffer.
    pub fn move_to_head(&mut self, id: BufferId) {
        if let Some(i) = self.position(id) {
            let id = self.order.remove(i);
            self.order.insert(0, id);
        }
    }

    /// Makes `id` the least recently used buffer.
    pub fn move_to_tail(&mut self, id: BufferId) {
        if let Some(i) = self.position(id) {
            let id = self.order.remove(i);
            self.order.push(id);
        }
    }

    /// The buffer that follows `id` in the list, wrapping to the head.
    /// `None` if `id` is the only buffer.
    pub fn next_after(&self, id: BufferId) -> Option<BufferId> {
        let i = self.position(id)?;
        let next = self.order[(i + 1) % self.order.len()];
        (next != id).then_some(next)
    }

    /// Unlinks a buffer and hands it back.
    pub fn remove(&mut self, id: BufferId) -> Option<Buffer> {
        let i = self.position(id)?;
        self.order.remove(i);
        self.arena.remove(id.0)
    }

    /// Buffers in list order.
    pub fn iter(&self) -> impl Iterator<Item = (BufferId, &Buffer)> {
        self.order.iter().map(|&id| (id, &self.arena[id.0]))
    }

    /// Buffer handles in list order.
    pub fn ids(&self) -> &[BufferId] {
        &self.order
    }

    /// Buffer names in list order.
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|(_, bp)| bp.name()).collect()
    }

    /// Returns the number of buffers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if there are no buffers.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `base` if no buffer has that name, else the first free `base<N>`
    /// counting from 2.
    pub fn unique_name(&self, base: &str) -> String {
        if self.find(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|i| format!("{base}<{i}>"))
            .find(|name| self.find(name).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    fn position(&self, id: BufferId) -> Option<usize> {
        self.order.iter().position(|&b| b == id)
    }
}

impl Index<BufferId> for BufferList {
    type Output = Buffer;

    fn index(&self, id: BufferId) -> &Buffer {
        &self.arena[id.0]
    }
}

impl IndexMut<BufferId> for BufferList {
    fn index_mut(&mut self, id: BufferId) -> &mut Buffer {
        &mut self.arena[id.0]
    }
}
