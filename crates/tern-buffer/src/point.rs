//! Cursor coordinates.
//!
//! A [`Point`] names a line by handle *and* carries its line number, so
//! that line-relative motion is O(1) and ordering never needs to walk the
//! list. Undo deltas cannot hold line handles (the lines they describe may
//! be destroyed and rebuilt before the delta is replayed), so they store a
//! [`Position`] instead.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::line::LineId;

/// A cursor position: line handle, line number and character offset.
///
/// Points are plain values; copying one never copies the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// The line this point is on. Weak: never keeps the line alive.
    pub line: LineId,
    /// Line number, counted from 0.
    pub n: usize,
    /// Character offset into the line.
    pub o: usize,
}

impl Point {
    /// Creates a point.
    pub fn new(line: LineId, n: usize, o: usize) -> Self {
        Self { line, n, o }
    }

    /// Returns the line-reference-free coordinates of this point.
    pub fn position(&self) -> Position {
        Position {
            n: self.n,
            o: self.o,
        }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.n, self.o).cmp(&(other.n, other.o))
    }
}

/// Lexicographic comparison on `(line number, offset)`, returning -1, 0
/// or +1.
pub fn cmp_point(a: &Point, b: &Point) -> i32 {
    match a.cmp(b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Line number and offset, without a line handle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (0-indexed)
    pub n: usize,
    /// Character offset (0-indexed)
    pub o: usize,
}

impl Position {
    /// Creates a position.
    pub fn new(n: usize, o: usize) -> Self {
        Self { n, o }
    }

    /// The start of the buffer.
    pub const ZERO: Position = Position { n: 0, o: 0 };
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 1-indexed for user-facing output
        write!(f, "{}:{}", self.n + 1, self.o + 1)
    }
}
