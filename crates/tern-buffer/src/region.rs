//! The region between point and mark.

use crate::buffer::Buffer;
use crate::point::{Point, Position};
use crate::undo::UndoKind;
use crate::{BufferError, BufferResult};

/// An ordered span of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// The earlier of point and mark
    pub start: Point,
    /// The later of point and mark
    pub end: Point,
    /// Characters between them, one per line break
    pub size: usize,
}

impl Region {
    /// Returns true if `(n, o)` lies inside the region (end exclusive).
    pub fn in_region(&self, n: usize, o: usize) -> bool {
        if n < self.start.n || n > self.end.n {
            false
        } else if self.start.n == self.end.n {
            o >= self.start.o && o < self.end.o
        } else if n == self.start.n {
            o >= self.start.o
        } else if n == self.end.n {
            o < self.end.o
        } else {
            true
        }
    }

    /// Start and end without line handles.
    pub fn positions(&self) -> (Position, Position) {
        (self.start.position(), self.end.position())
    }
}

impl Buffer {
    /// Computes the region between point and mark.
    ///
    /// Fails when no mark is set, or when `transient` (Transient Mark
    /// mode) is on and the mark is inactive.
    pub fn calculate_region(&self, transient: bool) -> BufferResult<Region> {
        let mark = self.mark_point().ok_or(BufferError::NoMark)?;
        if transient && !self.flags.mark_active {
            return Err(BufferError::MarkInactive);
        }

        let (start, end) = if self.pt <= mark {
            (self.pt, mark)
        } else {
            (mark, self.pt)
        };
        Ok(Region {
            start,
            end,
            size: self.point_distance(start, end),
        })
    }

    /// Up to `size` characters starting at `pt`, line breaks as `\n`.
    pub fn copy_text_block(&self, pt: Point, size: usize) -> String {
        let mut out = String::new();
        let mut remaining = size;
        let mut line = pt.line;
        let mut o = pt.o;

        while remaining > 0 {
            let before = out.len();
            out.extend(self.lines.text(line).chars().skip(o).take(remaining));
            remaining -= out[before..].chars().count();

            let next = self.lines.next(line);
            if remaining == 0 || next == self.lines.limit() {
                break;
            }
            out.push('\n');
            remaining -= 1;
            line = next;
            o = 0;
        }
        out
    }

    /// The text of a region.
    pub fn copy_region(&self, region: &Region) -> String {
        self.copy_text_block(region.start, region.size)
    }

    /// Deletes a region as one undoable step. The point keeps its place
    /// relative to the surrounding text.
    pub fn delete_region(&mut self, region: &Region) -> BufferResult<()> {
        self.warn_if_readonly()?;

        let m = self.point_marker();
        self.pt = region.start;
        self.undo_save(UndoKind::ReplaceBlock, region.start.position(), region.size, 0);

        let result = self.without_undo(|bp| {
            for _ in 0..region.size {
                bp.delete_char()?;
            }
            Ok(())
        });

        self.restore_point_marker(m);
        tracing::trace!(size = region.size, "region deleted");
        result
    }
}
