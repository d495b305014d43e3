//! Markers: points that follow the text as it changes.
//!
//! Each buffer owns a [`MarkerTable`]. The table keeps the live markers in
//! registration order (newest first, like the chain hanging off a buffer)
//! and every content mutation walks it through
//! [`Buffer::adjust_markers`](crate::Buffer::adjust_markers).
//!
//! Markers never move between buffers. Code that needs to remember a
//! position in some other buffer holds that buffer's handle together with
//! a [`MarkerId`] from its table.

use crate::arena::{Arena, ArenaIndex};
use crate::point::Point;

/// Handle to a marker in one buffer's [`MarkerTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(ArenaIndex);

/// A registered, auto-updating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pt: Point,
}

impl Marker {
    /// Returns the marker's current point.
    pub fn point(&self) -> Point {
        self.pt
    }
}

/// The markers registered with one buffer.
#[derive(Debug, Clone, Default)]
pub struct MarkerTable {
    arena: Arena<Marker>,
    /// Chain order, newest first.
    chain: Vec<MarkerId>,
}

impl MarkerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a marker at `pt` and chains it at the head.
    pub fn insert(&mut self, pt: Point) -> MarkerId {
        let id = MarkerId(self.arena.insert(Marker { pt }));
        self.chain.insert(0, id);
        id
    }

    /// Unchains and frees a marker. Returns its last point, or `None` for
    /// an id that was already freed.
    pub fn remove(&mut self, id: MarkerId) -> Option<Point> {
        let marker = self.arena.remove(id.0)?;
        self.chain.retain(|&m| m != id);
        Some(marker.pt)
    }

    /// Returns a marker's point.
    pub fn get(&self, id: MarkerId) -> Option<Point> {
        self.arena.get(id.0).map(Marker::point)
    }

    /// Moves a marker to `pt`. Returns false for a freed id.
    pub fn set(&mut self, id: MarkerId, pt: Point) -> bool {
        match self.arena.get_mut(id.0) {
            Some(marker) => {
                marker.pt = pt;
                true
            }
            None => false,
        }
    }

    /// Returns true if `id` is still registered.
    pub fn contains(&self, id: MarkerId) -> bool {
        self.arena.contains(id.0)
    }

    /// Number of registered markers.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns true if no markers are registered.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Marker ids in chain order, newest first.
    pub fn ids(&self) -> &[MarkerId] {
        &self.chain
    }

    /// Mutable access to every marker's point.
    pub(crate) fn points_mut(&mut self) -> impl Iterator<Item = &mut Point> {
        self.arena.iter_mut().map(|(_, marker)| &mut marker.pt)
    }

    /// Frees every marker.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.chain) {
            self.arena.remove(id.0);
        }
    }
}
