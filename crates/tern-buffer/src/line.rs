//! The circular line list.
//!
//! ## Layout
//!
//! ```text
//!   limit ─▶ line 0 ─▶ line 1 ─▶ … ─▶ line N ─┐
//!     ▲                                       │
//!     └───────────────────────────────────────┘
//! ```
//!
//! `limit` is a sentinel: it holds no text and is never part of the
//! visible document. `limit.next` is the first line and `limit.prev` the
//! last one, so walking in either direction stops when it reaches the
//! sentinel and no end needs a special case.
//!
//! Links are arena indices, never references, so a `Point` may name a
//! line without owning it.

use std::ops::Index;

use crate::arena::{Arena, ArenaIndex};

/// Handle to a line inside one buffer's line list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(ArenaIndex);

/// A single line of text. The newline is implicit.
#[derive(Debug, Clone)]
pub struct Line {
    text: String,
    prev: LineId,
    next: LineId,
}

impl Line {
    /// Returns the text of the line.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the line in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns true if the line has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the character at offset `o`, if any.
    pub fn char_at(&self, o: usize) -> Option<char> {
        self.text.chars().nth(o)
    }

    /// Converts a character offset into a byte offset, clamping at the end.
    pub fn byte_offset(&self, o: usize) -> usize {
        byte_offset(&self.text, o)
    }

    /// Consumes the line, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Returns the previous line (the sentinel for the first line).
    pub fn prev(&self) -> LineId {
        self.prev
    }

    /// Returns the next line (the sentinel for the last line).
    pub fn next(&self) -> LineId {
        self.next
    }
}

/// Converts a character offset into a byte offset in `s`, clamping at the end.
pub(crate) fn byte_offset(s: &str, o: usize) -> usize {
    s.char_indices().nth(o).map_or(s.len(), |(i, _)| i)
}

/// Splits `s` at every line terminator (`\r\n`, `\n` or `\r`), so no
/// piece holds a line break. Always yields at least one piece.
pub(crate) fn split_lines(s: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = s;
    while let Some(i) = rest.find(['\n', '\r']) {
        pieces.push(&rest[..i]);
        let width = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[i + width..];
    }
    pieces.push(rest);
    pieces
}

/// A circular doubly-linked list of lines with a sentinel.
#[derive(Debug, Clone)]
pub struct LineList {
    arena: Arena<Line>,
    limit: LineId,
}

impl LineList {
    /// Creates a list holding the sentinel and one empty line.
    pub fn new() -> Self {
        Self::from_texts(std::iter::empty::<String>())
    }

    /// Creates a list from line texts. An empty iterator still yields
    /// one empty line.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arena = Arena::new();

        // The sentinel links to itself until the first line arrives.
        let placeholder = LineId(ArenaIndex::DANGLING);
        let limit = LineId(arena.insert(Line {
            text: String::new(),
            prev: placeholder,
            next: placeholder,
        }));
        arena[limit.0].prev = limit;
        arena[limit.0].next = limit;

        let mut list = Self { arena, limit };
        let mut last = limit;
        for text in texts {
            last = list.insert_after(last, text.into());
        }
        if last == limit {
            list.insert_after(limit, String::new());
        }
        list
    }

    /// Returns the sentinel.
    pub fn limit(&self) -> LineId {
        self.limit
    }

    /// Returns the first real line.
    pub fn first(&self) -> LineId {
        self.arena[self.limit.0].next
    }

    /// Returns the last real line.
    pub fn last(&self) -> LineId {
        self.arena[self.limit.0].prev
    }

    /// Returns the line after `id`.
    pub fn next(&self, id: LineId) -> LineId {
        self.arena[id.0].next
    }

    /// Returns the line before `id`.
    pub fn prev(&self, id: LineId) -> LineId {
        self.arena[id.0].prev
    }

    /// Returns the text of `id`.
    pub fn text(&self, id: LineId) -> &str {
        &self.arena[id.0].text
    }

    /// Replaces the text of `id`.
    pub fn set_text(&mut self, id: LineId, text: String) {
        self.arena[id.0].text = text;
    }

    /// Returns true if `id` is still in this list.
    pub fn contains(&self, id: LineId) -> bool {
        self.arena.contains(id.0)
    }

    /// Returns the text of `id` for in-place editing.
    pub(crate) fn text_mut(&mut self, id: LineId) -> &mut String {
        &mut self.arena[id.0].text
    }

    /// Splices a new line holding `text` after `id` and returns it.
    pub fn insert_after(&mut self, id: LineId, text: String) -> LineId {
        let next = self.arena[id.0].next;
        let new = LineId(self.arena.insert(Line {
            text,
            prev: id,
            next,
        }));
        self.arena[id.0].next = new;
        self.arena[next.0].prev = new;
        new
    }

    /// Unlinks and frees `id`, returning the removed line.
    ///
    /// # Panics
    ///
    /// Panics when asked to remove the sentinel or a stale line.
    pub fn remove(&mut self, id: LineId) -> Line {
        assert_ne!(id, self.limit, "the sentinel line cannot be removed");

        let (prev, next) = {
            let line = &self.arena[id.0];
            (line.prev, line.next)
        };
        self.arena[prev.0].next = next;
        self.arena[next.0].prev = prev;

        self.arena
            .remove(id.0)
            .unwrap_or_else(|| panic!("line {id:?} vanished while unlinking"))
    }

    /// Returns the `n`th real line (0-based), if it exists.
    pub fn nth(&self, n: usize) -> Option<LineId> {
        self.iter().nth(n)
    }

    /// Number of real lines.
    pub fn len(&self) -> usize {
        self.arena.len() - 1
    }

    /// The list always holds at least one line.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over the real lines, first to last.
    pub fn iter(&self) -> Lines<'_> {
        Lines {
            list: self,
            cur: self.first(),
        }
    }
}

impl Default for LineList {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<LineId> for LineList {
    type Output = Line;

    fn index(&self, id: LineId) -> &Line {
        &self.arena[id.0]
    }
}

/// Iterator over the real lines of a [`LineList`].
#[derive(Debug)]
pub struct Lines<'a> {
    list: &'a LineList,
    cur: LineId,
}

impl<'a> Iterator for Lines<'a> {
    type Item = LineId;

    fn next(&mut self) -> Option<LineId> {
        if self.cur == self.list.limit {
            return None;
        }
        let id = self.cur;
        self.cur = self.list.next(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &LineList) -> Vec<&str> {
        list.iter().map(|id| list.text(id)).collect()
    }

    #[test]
    fn test_split_lines_handles_every_terminator() {
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("x\r\n"), vec!["x", ""]);
        assert_eq!(split_lines("\r\r\n"), vec!["", "", ""]);
    }

    #[test]
    fn test_new_has_one_empty_line() {
        let list = LineList::new();
        assert_eq!(list.len(), 1);
        assert_eq!(list.first(), list.last());
        assert_eq!(texts(&list), vec![""]);
        assert_eq!(list.next(list.last()), list.limit());
        assert_eq!(list.prev(list.first()), list.limit());
    }

    #[test]
    fn test_insert_and_remove_keep_ring() {
        let mut list = LineList::from_texts(["a", "c"]);
        let a = list.first();
        let b = list.insert_after(a, "b".to_string());
        assert_eq!(texts(&list), vec!["a", "b", "c"]);
        assert_eq!(list.prev(list.next(b)), b);

        let removed = list.remove(b);
        assert_eq!(removed.text(), "b");
        assert_eq!(texts(&list), vec!["a", "c"]);
        assert_eq!(list.next(a), list.last());
        assert_eq!(list.prev(list.last()), a);
        assert!(!list.contains(b));
    }

    #[test]
    fn test_byte_offset_multibyte() {
        let list = LineList::from_texts(["héllo"]);
        let line = &list[list.first()];
        assert_eq!(line.len(), 5);
        assert_eq!(line.byte_offset(2), 3);
        assert_eq!(line.byte_offset(99), "héllo".len());
    }

    #[test]
    #[should_panic(expected = "sentinel")]
    fn test_cannot_remove_limit() {
        let mut list = LineList::new();
        let limit = list.limit();
        list.remove(limit);
    }
}
