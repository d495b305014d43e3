//! The line-editing engine.
//!
//! Every primitive here follows the same order:
//!
//! 1. refuse if the buffer is read-only,
//! 2. record an undo delta describing the change,
//! 3. change the line list,
//! 4. call [`Buffer::adjust_markers`] so the point and every marker still
//!    name a live line with an offset inside it.
//!
//! ## Learning: Adjusting Markers
//!
//! A split at offset 3 of `abcdef` moves everything past offset 3 onto the
//! new line and shifts it left by 3. A join of `abc` + `def` moves everything
//! on `def` onto `abc` and shifts it right by 3. Points on later lines only
//! change their line number. The decision "is this a later line?" is made
//! against the point's line number *before* the point itself is adjusted;
//! adjusting the point first would move it past markers on the next line
//! and corrupt them.

use std::borrow::Cow;

use crate::buffer::Buffer;
use crate::line::{LineId, byte_offset, split_lines};
use crate::point::Point;
use crate::undo::UndoKind;
use crate::vars::{CASE_REPLACE, INDENT_TABS_MODE, TAB_ALWAYS_INDENT, VarTable};
use crate::{BufferError, BufferResult};

/// How a mutation changed the line structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Two lines were joined; the old line was removed.
    Join,
    /// A line was edited in place.
    Edit,
    /// A line was split; the new line follows the old one.
    Split,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Join => -1,
            Direction::Edit => 0,
            Direction::Split => 1,
        }
    }
}

/// Letter case of a replaced span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// Every character is uppercase.
    Upper,
    /// Only the first character is uppercase.
    Capitalized,
}

/// Classifies `s`: all-uppercase, capitalized, or neither.
pub fn check_case(s: &str) -> Option<Case> {
    let mut chars = s.chars();
    if !chars.next().is_some_and(char::is_uppercase) {
        return None;
    }
    if chars.all(char::is_uppercase) {
        Some(Case::Upper)
    } else {
        Some(Case::Capitalized)
    }
}

/// Re-cases `s` to `case`. For [`Case::Capitalized`] only the first
/// character changes.
pub fn recase(s: &str, case: Case) -> String {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut out: String = first.to_uppercase().collect();
    match case {
        Case::Upper => out.extend(chars.flat_map(char::to_uppercase)),
        Case::Capitalized => out.extend(chars),
    }
    out
}

impl Buffer {
    // ==================== Marker adjustment ====================

    /// Keeps the point and every marker consistent after a mutation.
    ///
    /// - `Join`: `old` was appended to `new` at `offset` and removed.
    /// - `Split`: text after `offset` on `old` moved onto `new`.
    /// - `Edit`: `old == new`; `delta` characters were inserted (or
    ///   removed, when negative) at `offset`.
    pub fn adjust_markers(
        &mut self,
        new: LineId,
        old: LineId,
        offset: usize,
        dir: Direction,
        delta: isize,
    ) {
        // Captured before the point itself moves.
        let reference = self.pt.n;
        let step = dir.step();

        let adjust = |p: &mut Point| {
            if p.line == old && (dir == Direction::Join || p.o > offset) {
                p.line = new;
                let o = p.o as isize + delta - offset as isize * step;
                // A point inside a deleted span collapses to its start.
                p.o = o.max(if dir == Direction::Edit { offset as isize } else { 0 }) as usize;
                p.n = p.n.saturating_add_signed(step);
            } else if p.n > reference {
                p.n = p.n.saturating_add_signed(step);
            }
        };

        for p in self.markers.points_mut() {
            adjust(p);
        }
        adjust(&mut self.pt);

        tracing::trace!(?dir, offset, delta, markers = self.markers.len(), "markers adjusted");
    }

    // ==================== In-line replacement ====================

    /// Replaces `old_len` characters of `line` at `offset` with `new_text`.
    ///
    /// With `replace_case` set and `case-replace` on, `new_text` is first
    /// re-cased to match the span it replaces. Does not record undo.
    pub fn line_replace_text(
        &mut self,
        line: LineId,
        offset: usize,
        old_len: usize,
        new_text: &str,
        replace_case: bool,
        globals: &VarTable,
    ) {
        let case_replace = replace_case && self.scope(globals).get_bool(CASE_REPLACE);

        let text = self.lines.text_mut(line);
        let start = byte_offset(text, offset);
        let end = start + byte_offset(&text[start..], old_len);
        let removed = text[start..end].chars().count();

        let replacement = match case_replace.then(|| check_case(&text[start..end])).flatten() {
            Some(case) => Cow::Owned(recase(new_text, case)),
            None => Cow::Borrowed(new_text),
        };
        text.replace_range(start..end, &replacement);

        let delta = replacement.chars().count() as isize - removed as isize;
        self.flags.modified = true;
        self.adjust_markers(line, line, offset, Direction::Edit, delta);
    }

    // ==================== Insertion ====================

    /// Inserts `c` at the point, or replaces the following character in
    /// overwrite mode. A newline or carriage return splits the line.
    pub fn insert_char(&mut self, c: char, globals: &VarTable) -> BufferResult<()> {
        if c == '\n' || c == '\r' {
            return self.insert_newline();
        }
        self.warn_if_readonly()?;

        let mut buf = [0; 4];
        let s = c.encode_utf8(&mut buf);
        let pos = self.pt.position();

        // Overwrite, except on a TAB that still covers more columns.
        let overwrite = self.flags.overwrite
            && !self.eolp()
            && (self.following_char() != Some('\t') || {
                let t = self.scope(globals).tab_width();
                (self.goal_column(globals) + 1) % t == 0
            });

        if overwrite {
            self.undo_save(UndoKind::ReplaceBlock, pos, 1, 1);
            self.line_replace_text(self.pt.line, self.pt.o, 1, s, false, globals);
        } else {
            self.undo_save(UndoKind::ReplaceBlock, pos, 0, 1);
            self.line_replace_text(self.pt.line, self.pt.o, 0, s, false, globals);
        }
        self.pt.o += 1;
        Ok(())
    }

    /// Inserts `s` at the point as one undoable step. Any line terminator
    /// splits the line and counts as one character. Overwrite mode does
    /// not apply.
    pub fn insert_string(&mut self, s: &str) -> BufferResult<()> {
        self.warn_if_readonly()?;

        let segments = split_lines(s);
        let size = segments.iter().map(|seg| seg.chars().count()).sum::<usize>()
            + segments.len()
            - 1;
        let pos = self.pt.position();
        self.undo_save(UndoKind::ReplaceBlock, pos, 0, size);

        self.without_undo(|bp| {
            for (i, segment) in segments.into_iter().enumerate() {
                if i > 0 {
                    bp.insert_newline()?;
                }
                if !segment.is_empty() {
                    bp.insert_segment(segment);
                }
            }
            Ok(())
        })
    }

    /// Splices newline-free text at the point and steps over it.
    fn insert_segment(&mut self, segment: &str) {
        let line = self.pt.line;
        let o = self.pt.o;
        let len = segment.chars().count();

        let text = self.lines.text_mut(line);
        let at = byte_offset(text, o);
        text.insert_str(at, segment);

        self.flags.modified = true;
        self.adjust_markers(line, line, o, Direction::Edit, len as isize);
        self.pt.o += len;
    }

    /// Splits the line at the point. The point stays before the break.
    pub fn intercalate_newline(&mut self) -> BufferResult<()> {
        self.warn_if_readonly()?;

        let pos = self.pt.position();
        self.undo_save(UndoKind::ReplaceBlock, pos, 0, 1);

        let old = self.pt.line;
        let o = self.pt.o;
        let text = self.lines.text_mut(old);
        let at = byte_offset(text, o);
        let tail = text.split_off(at);
        let new = self.lines.insert_after(old, tail);

        self.adjust_markers(new, old, o, Direction::Split, 0);
        self.last_line += 1;
        self.flags.modified = true;
        Ok(())
    }

    /// Splits the line at the point and moves to the start of the new line.
    pub fn insert_newline(&mut self) -> BufferResult<()> {
        self.intercalate_newline()?;
        self.forward_char();
        Ok(())
    }

    /// Inserts a TAB, or spaces up to the next tab stop when
    /// `indent-tabs-mode` is off.
    pub fn insert_tab(&mut self, globals: &VarTable) -> BufferResult<()> {
        self.warn_if_readonly()?;

        let scope = self.scope(globals);
        if scope.get_bool(INDENT_TABS_MODE) {
            return self.insert_char('\t', globals);
        }

        let t = scope.tab_width();
        let col = self.goal_column(globals);
        let spaces = " ".repeat(t - col % t);
        self.insert_string(&spaces)
    }

    // ==================== Deletion ====================

    /// Deletes the character after the point, joining lines at end of line.
    pub fn delete_char(&mut self) -> BufferResult<()> {
        self.deactivate_mark();

        if self.eobp() {
            return Err(BufferError::EndOfBuffer);
        }
        self.warn_if_readonly()?;

        let pos = self.pt.position();
        self.undo_save(UndoKind::ReplaceBlock, pos, 1, 0);

        let cur = self.pt.line;
        if self.eolp() {
            let old_len = self.lines[cur].len();
            let next = self.lines.next(cur);
            let removed = self.lines.remove(next);
            self.lines.text_mut(cur).push_str(removed.text());

            self.adjust_markers(cur, next, old_len, Direction::Join, 0);
            self.last_line -= 1;
        } else {
            let o = self.pt.o;
            let text = self.lines.text_mut(cur);
            let at = byte_offset(text, o);
            text.remove(at);
            self.adjust_markers(cur, cur, o, Direction::Edit, -1);
        }

        self.flags.modified = true;
        Ok(())
    }

    /// Deletes the character before the point.
    pub fn backward_delete_char(&mut self) -> BufferResult<()> {
        self.deactivate_mark();

        if !self.backward_char() {
            return Err(BufferError::BeginningOfBuffer);
        }
        self.delete_char()
    }

    /// Deletes all spaces and tabs around the point.
    pub fn delete_horizontal_space(&mut self) -> BufferResult<()> {
        self.undo_sequence(|bp| {
            while !bp.eolp() && bp.following_char().is_some_and(char::is_whitespace) {
                bp.delete_char()?;
            }
            while !bp.bolp() && bp.preceding_char().is_some_and(char::is_whitespace) {
                bp.backward_delete_char()?;
            }
            Ok(())
        })
    }

    /// Deletes all spaces and tabs around the point, leaving one space.
    pub fn just_one_space(&mut self, globals: &VarTable) -> BufferResult<()> {
        self.undo_sequence(|bp| {
            bp.delete_horizontal_space()?;
            bp.insert_char(' ', globals)
        })
    }

    // ==================== Auto fill ====================

    /// Inserts a newline, breaking the line first when Auto Fill mode is
    /// on and the point is past the fill column.
    pub fn newline(&mut self, globals: &VarTable) -> BufferResult<()> {
        if self.flags.autofill && self.goal_column(globals) > self.scope(globals).fill_column() {
            self.fill_break_line(globals)?;
        }
        self.insert_newline()
    }

    /// Inserts a typed character.
    pub fn self_insert_char(&mut self, c: char, globals: &VarTable) -> BufferResult<()> {
        match c {
            '\t' => self.insert_tab(globals),
            '\n' | '\r' => self.newline(globals),
            _ => {
                if c.is_whitespace()
                    && self.flags.autofill
                    && self.goal_column(globals) > self.scope(globals).fill_column()
                {
                    self.fill_break_line(globals)?;
                }
                self.insert_char(c, globals)
            }
        }
    }

    /// Breaks the current line at whitespace so that text before the point
    /// fits in `fill-column`.
    ///
    /// Prefers the rightmost whitespace at or before the fill column and
    /// falls back to the leftmost one after it. Returns whether a break was
    /// made; a line without whitespace is left alone.
    pub fn fill_break_line(&mut self, globals: &VarTable) -> BufferResult<bool> {
        let scope = self.scope(globals);
        let fillcol = scope.fill_column();
        let t = scope.tab_width();

        if self.column_at(self.pt, t) <= fillcol {
            return Ok(false);
        }

        let m = self.point_marker();

        // Move back to the fill column.
        while self.pt.o > 0 && self.column_at(self.pt, t) > fillcol + 1 {
            self.pt.o -= 1;
        }

        let chars: Vec<char> = self.lines.text(self.pt.line).chars().collect();
        let o = self.pt.o;
        let break_col = (1..=o)
            .rev()
            .find(|&i| chars[i - 1].is_whitespace())
            .or_else(|| (o + 1..chars.len()).find(|&i| chars[i - 1].is_whitespace()));

        let result = match break_col {
            Some(col) => {
                tracing::trace!(col, fillcol, "fill break");
                self.pt.o = col;
                self.delete_horizontal_space()
                    .and_then(|()| self.insert_newline())
                    .map(|()| true)
            }
            None => Ok(false),
        };

        self.restore_point_marker(m);
        result
    }

    // ==================== Indentation ====================

    /// Moves to the closest non-blank line above, at the point's column or
    /// as near as that line allows.
    fn previous_nonblank_goalc(&mut self, globals: &VarTable) {
        let goal = self.goal_column(globals);
        while self.pt.n > 0 {
            self.pt = self.make_point(self.pt.n - 1, 0);
            if !self.is_blank_line() {
                break;
            }
        }
        while !self.eolp() && self.goal_column(globals) < goal {
            self.forward_char();
        }
    }

    /// Indentation column of the line above (of this line on the first).
    fn previous_line_indent(&self, globals: &VarTable) -> usize {
        let start = self.make_point(self.pt.n.saturating_sub(1), 0);
        let o = self
            .lines
            .text(start.line)
            .chars()
            .take_while(|c| c.is_whitespace())
            .count();
        self.column_at(Point::new(start.line, start.n, o), self.scope(globals).tab_width())
    }

    fn following_is_space(&self) -> bool {
        !self.eolp() && self.following_char().is_some_and(char::is_whitespace)
    }

    /// Spaces out to the next indent point of the previous non-blank line:
    /// a non-whitespace character following whitespace. Inserts a tab when
    /// there is no such point. One undoable step.
    pub fn indent_relative(&mut self, globals: &VarTable) -> BufferResult<()> {
        self.warn_if_readonly()?;
        self.deactivate_mark();

        let cur = self.goal_column(globals);
        let t = self.scope(globals).tab_width();

        let target = if self.pt.n == 0 {
            0
        } else {
            let saved = self.pt;
            self.previous_nonblank_goalc(globals);

            if !(self.preceding_char() == Some('\t') && self.goal_column(globals) > cur) {
                while !self.eolp() && !self.following_is_space() {
                    self.forward_char();
                }
            }
            while self.following_is_space() {
                self.forward_char();
            }

            let target = if self.eolp() { 0 } else { self.goal_column(globals) };
            self.pt = saved;
            target
        };

        self.undo_sequence(|bp| {
            let mut col = bp.goal_column(globals);
            if target == 0 || col >= target {
                return bp.insert_tab(globals);
            }
            while col < target {
                if col % t == 0 && col + t <= target {
                    bp.insert_tab(globals)?;
                } else {
                    bp.insert_string(" ")?;
                }
                col = bp.goal_column(globals);
            }
            Ok(())
        })
    }

    /// Inserts a tab when `tab-always-indent` is set; otherwise indents
    /// relative to the previous line if the point is left of its
    /// indentation.
    pub fn indent_for_tab_command(&mut self, globals: &VarTable) -> BufferResult<()> {
        if self.scope(globals).get_bool(TAB_ALWAYS_INDENT) {
            self.insert_tab(globals)
        } else if self.goal_column(globals) < self.previous_line_indent(globals) {
            self.indent_relative(globals)
        } else {
            Ok(())
        }
    }

    /// Inserts a newline, then indents when the previous non-blank line is
    /// indented. One undoable step.
    pub fn newline_and_indent(&mut self, globals: &VarTable) -> BufferResult<()> {
        self.warn_if_readonly()?;
        self.deactivate_mark();

        self.undo_sequence(|bp| {
            bp.insert_newline()?;

            let saved = bp.pt;
            bp.previous_nonblank_goalc(globals);
            let indent = bp.goal_column(globals) > 0 || bp.following_is_space();
            bp.pt = saved;

            if indent {
                bp.indent_for_tab_command(globals)?;
            }
            Ok(())
        })
    }
}
