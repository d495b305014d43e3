//! The mark ring.
//!
//! Saved marks are markers in their own buffer's table, so they keep
//! tracking the text after being pushed. An entry with no marker records
//! that the buffer had no mark at the time. The ring keeps the newest
//! [`MARK_RING_MAX`] entries; older markers are freed as they fall off.

use std::collections::VecDeque;

use tern_buffer::MarkerId;

use crate::buffers::BufferId;
use crate::editor::Editor;
use crate::CoreResult;

/// Number of saved marks kept.
pub const MARK_RING_MAX: usize = 16;

type Entry = (BufferId, Option<MarkerId>);

/// Saved marks, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MarkRing {
    entries: VecDeque<Entry>,
}

impl MarkRing {
    /// Creates an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a mark. Returns the oldest entry if the ring was full.
    pub fn push(&mut self, buffer: BufferId, marker: Option<MarkerId>) -> Option<Entry> {
        let evicted = if self.entries.len() == MARK_RING_MAX {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back((buffer, marker));
        evicted
    }

    /// Takes the newest saved mark.
    pub fn pop(&mut self) -> Option<Entry> {
        self.entries.pop_back()
    }

    /// Drops every entry for `buffer`.
    pub fn forget(&mut self, buffer: BufferId) {
        self.entries.retain(|(b, _)| *b != buffer);
    }

    /// Returns the number of saved marks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no marks are saved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Editor {
    /// Pushes a copy of the current buffer's mark (or its absence) onto
    /// the mark ring.
    pub fn push_mark(&mut self) {
        let id = self.current;
        let bp = self.current_mut();
        let saved = bp.mark().and_then(|m| bp.copy_marker(m));

        if let Some((old, Some(m))) = self.mark_ring.push(id, saved) {
            if let Some(bp) = self.buffers.get_mut(old) {
                bp.free_marker(m);
            }
        }
    }

    /// Restores the newest saved mark as the mark of the buffer it came
    /// from. Returns false if the ring is empty.
    pub fn pop_mark(&mut self) -> bool {
        let Some((id, saved)) = self.mark_ring.pop() else {
            return false;
        };
        let Some(bp) = self.buffers.get_mut(id) else {
            return false;
        };

        let pt = saved.and_then(|m| {
            let pt = bp.marker_point(m);
            bp.free_marker(m);
            pt
        });
        bp.replace_mark(pt);
        true
    }

    /// Sets and activates the mark `n` words away from the point (behind
    /// it when negative), as far as the buffer allows. The point stays.
    pub fn mark_words(&mut self, n: i64) {
        let bp = self.current_mut();
        let start = bp.pt().position();
        for _ in 0..n.unsigned_abs() {
            let moved = if n > 0 { bp.forward_word() } else { bp.backward_word() };
            if !moved {
                break;
            }
        }
        bp.set_mark();
        bp.activate_mark();
        bp.goto_point(start);
    }

    /// `mark-word`: saves the old mark, then marks `n` words.
    pub fn mark_word(&mut self, n: i64) {
        self.push_mark();
        self.mark_words(n);
    }

    /// Saves the old mark, then sets the mark at the point.
    pub fn set_mark_interactive(&mut self) {
        self.push_mark();
        self.current_mut().set_mark();
    }

    /// `set-mark-command`: sets and activates the mark.
    pub fn set_mark_command(&mut self) {
        self.set_mark_interactive();
        self.current_mut().activate_mark();
        tracing::debug!(pos = %self.current().pt().position(), "mark set");
    }

    /// `exchange-point-and-mark`: swaps point and mark and activates the
    /// mark.
    pub fn exchange_point_and_mark(&mut self) -> CoreResult<()> {
        let bp = self.current_mut();
        bp.exchange_point_and_mark()?;
        bp.activate_mark();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_buffer::{BufferError, Position};

    #[test]
    fn test_push_and_pop_mark() {
        let mut ed = Editor::with_text("t", "abcdef");
        ed.current_mut().goto_point(Position::new(0, 2));
        ed.current_mut().set_mark();

        ed.push_mark();
        assert_eq!(ed.mark_ring().len(), 1);

        ed.current_mut().goto_point(Position::new(0, 5));
        ed.current_mut().set_mark();

        assert!(ed.pop_mark());
        assert_eq!(ed.current().mark_point().unwrap().position(), Position::new(0, 2));
        assert!(ed.mark_ring().is_empty());
        assert!(!ed.pop_mark());
    }

    #[test]
    fn test_saved_mark_tracks_edits() {
        let mut ed = Editor::with_text("t", "abcdef");
        ed.current_mut().goto_point(Position::new(0, 3));
        ed.current_mut().set_mark();
        ed.push_mark();

        ed.current_mut().goto_point(Position::new(0, 0));
        ed.current_mut().insert_string("xy").unwrap();

        ed.pop_mark();
        assert_eq!(ed.current().mark_point().unwrap().position(), Position::new(0, 5));
    }

    #[test]
    fn test_pop_of_missing_mark_clears_mark() {
        let mut ed = Editor::with_text("t", "abc");
        ed.push_mark();
        ed.current_mut().set_mark();

        assert!(ed.pop_mark());
        assert_eq!(ed.current().mark(), None);
    }

    #[test]
    fn test_set_mark_interactive_saves_previous() {
        let mut ed = Editor::with_text("t", "abc");
        ed.set_mark_interactive();
        ed.current_mut().goto_point(Position::new(0, 2));
        ed.set_mark_interactive();

        assert_eq!(ed.mark_ring().len(), 2);
        assert_eq!(ed.current().mark_point().unwrap().position(), Position::new(0, 2));
    }

    #[test]
    fn test_mark_ring_is_capped_and_frees_markers() {
        let mut ed = Editor::with_text("t", "abc");
        ed.current_mut().set_mark();
        let base = ed.current().markers().len();

        for _ in 0..MARK_RING_MAX + 5 {
            ed.push_mark();
        }
        assert_eq!(ed.mark_ring().len(), MARK_RING_MAX);
        assert_eq!(ed.current().markers().len(), base + MARK_RING_MAX);
    }

    #[test]
    fn test_mark_word_leaves_point() {
        let mut ed = Editor::with_text("t", "one two three");
        ed.mark_word(2);

        let bp = ed.current();
        assert_eq!(bp.pt().position(), Position::new(0, 0));
        assert_eq!(bp.mark_point().unwrap().position(), Position::new(0, 7));
        assert!(bp.is_mark_active());
        assert_eq!(ed.mark_ring().len(), 1);

        ed.current_mut().goto_point(Position::new(0, 13));
        ed.mark_words(-1);
        assert_eq!(ed.current().mark_point().unwrap().position(), Position::new(0, 8));
    }

    #[test]
    fn test_exchange_point_and_mark() {
        let mut ed = Editor::with_text("t", "abcdef");
        assert!(matches!(
            ed.exchange_point_and_mark().unwrap_err().as_buffer_error(),
            Some(BufferError::NoMark)
        ));

        ed.current_mut().set_mark();
        ed.current_mut().goto_point(Position::new(0, 4));
        ed.exchange_point_and_mark().unwrap();

        let bp = ed.current();
        assert_eq!(bp.pt().position(), Position::new(0, 0));
        assert_eq!(bp.mark_point().unwrap().position(), Position::new(0, 4));
        assert!(bp.is_mark_active());
    }
}
