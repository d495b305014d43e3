//! The undo log.
//!
//! ## Learning: Undo Is Just Another Edit
//!
//! Every mutating primitive records a [`UndoDelta`] *before* it changes the
//! text: where the change happens, what text is about to disappear and how
//! much text will replace it. Reverting a delta goes back through the same
//! primitives, which record the inverse of what they do. So undoing twice
//! in a row walks further back, while undoing after any other command first
//! undoes the undo (the cursor was reset to the newest delta).
//!
//! ```text
//!   deltas:  [0] [1] [2] ... [last]
//!                        ▲
//!                       next  (moves toward 0 on each `undo`)
//! ```
//!
//! `StartSequence`/`EndSequence` frame a compound edit. Reverting an
//! `EndSequence` reverts everything back to its `StartSequence` in one go
//! and frames the replay in a sequence of its own.

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::point::Position;
use crate::{BufferError, BufferResult};

/// The kind of an undo delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndoKind {
    /// Replace `size` characters at `pos` with the saved text.
    ReplaceBlock,
    /// Opens a compound edit.
    StartSequence,
    /// Closes a compound edit.
    EndSequence,
}

/// One reversible step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoDelta {
    /// What this delta records
    pub kind: UndoKind,
    /// Where the edit happened
    pub pos: Position,
    /// The `osize` characters that were about to be replaced
    pub text: String,
    /// Length of the replaced text
    pub osize: usize,
    /// Length of the text that replaced it
    pub size: usize,
    /// Reverting this delta returns the buffer to its unmodified state
    pub unchanged: bool,
}

/// A buffer's undo history.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    deltas: Vec<UndoDelta>,
    /// Newest delta
    last: Option<usize>,
    /// Delta the next `undo` reverts
    next: Option<usize>,
    /// While set, nothing is recorded
    pub(crate) nosave: bool,
    /// While set, recording leaves `next` alone
    doing_undo: bool,
}

impl UndoLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded deltas.
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// All deltas, oldest first.
    pub fn deltas(&self) -> &[UndoDelta] {
        &self.deltas
    }

    /// The newest delta.
    pub fn last(&self) -> Option<&UndoDelta> {
        self.last.map(|i| &self.deltas[i])
    }

    /// Index of the delta the next `undo` reverts.
    pub fn next_index(&self) -> Option<usize> {
        self.next
    }

    /// Points the next `undo` back at the newest delta.
    pub fn reset_cursor(&mut self) {
        self.next = self.last;
    }

    /// Sets or clears the "unchanged" flag on every delta.
    pub fn set_unchanged_all(&mut self, unchanged: bool) {
        for delta in &mut self.deltas {
            delta.unchanged = unchanged;
        }
    }

    /// Forgets all history.
    pub fn clear(&mut self) {
        self.deltas.clear();
        self.last = None;
        self.next = None;
    }

    fn push(&mut self, delta: UndoDelta) {
        self.deltas.push(delta);
        self.last = Some(self.deltas.len() - 1);
        if !self.doing_undo {
            self.next = self.last;
        }
    }
}

impl Buffer {
    // ==================== Recording ====================

    /// Records a delta for an edit about to happen at `pos`: `osize`
    /// characters there will be replaced by `size` new ones.
    ///
    /// Does nothing when the buffer has undo disabled or recording is
    /// suppressed.
    pub fn undo_save(&mut self, kind: UndoKind, pos: Position, osize: usize, size: usize) {
        if self.flags.noundo || self.undo.nosave {
            return;
        }

        let text = match kind {
            UndoKind::ReplaceBlock => {
                let pt = self.make_point(pos.n, pos.o);
                self.copy_text_block(pt, osize)
            }
            UndoKind::StartSequence | UndoKind::EndSequence => String::new(),
        };

        tracing::trace!(?kind, %pos, osize, size, "undo save");
        let unchanged = !self.flags.modified;
        self.undo.push(UndoDelta {
            kind,
            pos,
            text,
            osize,
            size,
            unchanged,
        });
    }

    /// Opens a compound edit at the point.
    pub fn undo_start_sequence(&mut self) {
        let pos = self.pt.position();
        self.undo_save(UndoKind::StartSequence, pos, 0, 0);
    }

    /// Closes a compound edit at the point.
    pub fn undo_end_sequence(&mut self) {
        let pos = self.pt.position();
        self.undo_save(UndoKind::EndSequence, pos, 0, 0);
    }

    /// Runs `f` inside a compound edit. The sequence is closed even when
    /// `f` fails.
    pub fn undo_sequence<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> BufferResult<R>,
    ) -> BufferResult<R> {
        self.undo_start_sequence();
        let result = f(self);
        self.undo_end_sequence();
        result
    }

    /// Runs `f` with recording suppressed.
    pub(crate) fn without_undo<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.undo.nosave, true);
        let result = f(self);
        self.undo.nosave = saved;
        result
    }

    // ==================== Replay ====================

    /// Reverts delta `i` and returns the next delta to revert.
    fn revert_action(&mut self, i: usize) -> BufferResult<Option<usize>> {
        self.undo.doing_undo = true;
        let result = self.revert_delta(i);
        self.undo.doing_undo = false;
        result
    }

    fn revert_delta(&mut self, i: usize) -> BufferResult<Option<usize>> {
        let delta = self.undo.deltas[i].clone();
        tracing::trace!(index = i, kind = ?delta.kind, pos = %delta.pos, "undo revert");

        let next = match delta.kind {
            UndoKind::EndSequence => {
                self.undo_save(UndoKind::StartSequence, delta.pos, 0, 0);

                let mut cur = i.checked_sub(1);
                while let Some(j) = cur {
                    if self.undo.deltas[j].kind == UndoKind::StartSequence {
                        break;
                    }
                    cur = self.revert_delta(j)?;
                }

                // `cur` now names the matching start, if the log has one.
                let start_pos = cur.map_or(delta.pos, |j| self.undo.deltas[j].pos);
                self.undo_save(UndoKind::EndSequence, start_pos, 0, 0);
                self.goto_point(start_pos);
                cur.and_then(|j| j.checked_sub(1))
            }
            UndoKind::ReplaceBlock => {
                self.goto_point(delta.pos);
                self.undo_save(UndoKind::ReplaceBlock, delta.pos, delta.size, delta.osize);
                self.without_undo(|bp| {
                    for _ in 0..delta.size {
                        bp.delete_char()?;
                    }
                    bp.insert_string(&delta.text)
                })?;
                i.checked_sub(1)
            }
            // A stray start is a no-op step.
            UndoKind::StartSequence => i.checked_sub(1),
        };

        if delta.unchanged {
            self.flags.modified = false;
        }
        Ok(next)
    }

    /// Undoes the next delta (or the next whole sequence).
    pub fn undo(&mut self) -> BufferResult<()> {
        if self.flags.noundo {
            return Err(BufferError::UndoDisabled);
        }
        self.warn_if_readonly()?;

        let Some(next) = self.undo.next else {
            self.undo.reset_cursor();
            return Err(BufferError::NoFurtherUndo);
        };

        let after = self.revert_action(next)?;
        self.undo.next = after;
        tracing::debug!(buffer = %self.name, next = ?after, "undo");
        Ok(())
    }
}
