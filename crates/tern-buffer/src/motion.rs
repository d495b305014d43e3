//! Point motion and goal-column tracking.
//!
//! Vertical motion aims at the *goal column*: the display column the point
//! was on when a run of line motions started. Columns count a TAB as
//! reaching the next tab stop and other characters by their display width.

use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::point::Point;
use crate::vars::VarTable;

/// The column reached after displaying `c` starting at `col`.
pub fn advance_column(col: usize, c: char, tab_width: usize) -> usize {
    if c == '\t' {
        col + tab_width - col % tab_width
    } else {
        col + c.width().unwrap_or(1)
    }
}

/// Returns true for characters that make up words.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '$'
}

impl Buffer {
    // ==================== Columns ====================

    /// Display column of `pt`.
    pub fn column_at(&self, pt: Point, tab_width: usize) -> usize {
        self.lines
            .text(pt.line)
            .chars()
            .take(pt.o)
            .fold(0, |col, c| advance_column(col, c, tab_width))
    }

    /// Display column of the point.
    pub fn goal_column(&self, globals: &VarTable) -> usize {
        self.column_at(self.pt, self.scope(globals).tab_width())
    }

    /// Makes the point's current column the goal column.
    pub fn update_goalc(&mut self, globals: &VarTable) {
        self.goalc = self.goal_column(globals);
    }

    /// Moves the point along its line to the goal column, or as close as
    /// the line allows.
    pub fn goto_goalc(&mut self, globals: &VarTable) {
        let t = self.scope(globals).tab_width();
        let goal = self.goalc;

        let mut col = 0;
        let mut o = 0;
        for c in self.lines.text(self.pt.line).chars() {
            if col >= goal {
                break;
            }
            col = advance_column(col, c, t);
            o += 1;
        }
        self.pt.o = o;
    }

    // ==================== Lines ====================

    /// Moves `n` lines down (up when negative), landing on the goal column.
    /// Returns false if the motion was cut short by a buffer boundary.
    pub fn move_line(&mut self, n: isize, globals: &VarTable) -> bool {
        let mut ok = true;
        let mut count = n.unsigned_abs();

        if n > 0 {
            let room = self.last_line - self.pt.n;
            if count > room {
                ok = false;
                count = room;
            }
            for _ in 0..count {
                self.pt.line = self.lines.next(self.pt.line);
                self.pt.n += 1;
            }
        } else if n < 0 {
            if count > self.pt.n {
                ok = false;
                count = self.pt.n;
            }
            for _ in 0..count {
                self.pt.line = self.lines.prev(self.pt.line);
                self.pt.n -= 1;
            }
        }

        self.goto_goalc(globals);
        ok
    }

    /// Moves one line down.
    pub fn next_line(&mut self, globals: &VarTable) -> bool {
        self.move_line(1, globals)
    }

    /// Moves one line up.
    pub fn previous_line(&mut self, globals: &VarTable) -> bool {
        self.move_line(-1, globals)
    }

    /// Moves to the start of line `n` (0-based). Returns false if `n` is
    /// past the last line, in which case the point goes to the last line.
    pub fn goto_line(&mut self, n: usize) -> bool {
        self.pt = self.make_point(n, 0);
        self.goalc = 0;
        n <= self.last_line
    }

    // ==================== Characters ====================

    /// Moves `n` characters forward (backward when negative), crossing
    /// line breaks. Returns false at a buffer boundary.
    pub fn move_char(&mut self, n: isize) -> bool {
        for _ in 0..n.unsigned_abs() {
            if n > 0 {
                if !self.eolp() {
                    self.pt.o += 1;
                } else if !self.eobp() {
                    self.pt.line = self.lines.next(self.pt.line);
                    self.pt.n += 1;
                    self.beginning_of_line();
                } else {
                    return false;
                }
            } else if !self.bolp() {
                self.pt.o -= 1;
            } else if !self.bobp() {
                self.pt.line = self.lines.prev(self.pt.line);
                self.pt.n -= 1;
                self.end_of_line();
            } else {
                return false;
            }
        }
        true
    }

    /// Moves one character forward.
    pub fn forward_char(&mut self) -> bool {
        self.move_char(1)
    }

    /// Moves one character backward.
    pub fn backward_char(&mut self) -> bool {
        self.move_char(-1)
    }

    /// Moves to character offset `offset` from the start of the buffer,
    /// counting one per line break. Returns false if the buffer is shorter.
    pub fn goto_char(&mut self, offset: usize) -> bool {
        self.gotobob();
        self.move_char(offset as isize)
    }

    // ==================== Words ====================

    /// Skips any non-word characters, then the word after them. Returns
    /// false if the buffer ends before a word is found.
    fn move_word(&mut self, forward: bool) -> bool {
        let step = if forward { 1 } else { -1 };
        let mut in_word = false;
        loop {
            let c = if forward { self.following_char() } else { self.preceding_char() };
            match c {
                None => return in_word,
                Some(c) if is_word_char(c) => in_word = true,
                Some(_) if in_word => return true,
                Some(_) => {}
            }
            self.move_char(step);
        }
    }

    /// Moves to the end of the next word.
    pub fn forward_word(&mut self) -> bool {
        self.move_word(true)
    }

    /// Moves to the start of the previous word.
    pub fn backward_word(&mut self) -> bool {
        self.move_word(false)
    }

    /// Moves to the start of the line.
    pub fn beginning_of_line(&mut self) {
        self.pt = self.line_beginning_position(1);
        self.goalc = 0;
    }

    /// Moves to the end of the line. The goal column sticks to line ends.
    pub fn end_of_line(&mut self) {
        self.pt = self.line_end_position(1);
        self.goalc = usize::MAX;
    }

    /// Moves to the start of the buffer.
    pub fn gotobob(&mut self) {
        self.pt = self.point_min();
        self.goalc = 0;
    }

    /// Moves to the end of the buffer.
    pub fn gotoeob(&mut self) {
        self.pt = self.point_max();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Position;

    fn globals() -> VarTable {
        [("tab-width", "4")].into_iter().collect()
    }

    #[test]
    fn test_column_expands_tabs_and_wide_chars() {
        let bp = Buffer::from_text("t", "a\tb世x");
        let line = bp.lines().first();
        assert_eq!(bp.column_at(Point::new(line, 0, 1), 4), 1);
        assert_eq!(bp.column_at(Point::new(line, 0, 2), 4), 4);
        assert_eq!(bp.column_at(Point::new(line, 0, 4), 4), 7);
    }

    #[test]
    fn test_move_line_keeps_goal_column() {
        let g = globals();
        let mut bp = Buffer::from_text("t", "abcdef\nab\nabcdef");
        bp.goto_point(Position::new(0, 5));
        bp.update_goalc(&g);

        assert!(bp.next_line(&g));
        assert_eq!((bp.pt().n, bp.pt().o), (1, 2));
        assert!(bp.next_line(&g));
        assert_eq!((bp.pt().n, bp.pt().o), (2, 5));
    }

    #[test]
    fn test_move_line_clamps() {
        let g = globals();
        let mut bp = Buffer::from_text("t", "a\nb\nc");
        bp.goto_point(Position::new(1, 0));

        assert!(!bp.move_line(5, &g));
        assert_eq!(bp.pt().n, 2);
        assert!(!bp.move_line(-5, &g));
        assert_eq!(bp.pt().n, 0);
    }

    #[test]
    fn test_goto_goalc_lands_after_tab() {
        let g = globals();
        let mut bp = Buffer::from_text("t", "abcdef\n\tx");
        bp.goto_point(Position::new(0, 2));
        bp.update_goalc(&g);
        bp.next_line(&g);
        assert_eq!(bp.pt().o, 1);
    }

    #[test]
    fn test_move_char_crosses_lines() {
        let mut bp = Buffer::from_text("t", "ab\ncd");
        bp.goto_point(Position::new(0, 2));

        assert!(bp.forward_char());
        assert_eq!((bp.pt().n, bp.pt().o), (1, 0));
        assert!(bp.backward_char());
        assert_eq!((bp.pt().n, bp.pt().o), (0, 2));

        bp.gotobob();
        assert!(!bp.backward_char());
        bp.gotoeob();
        assert!(!bp.forward_char());
        assert_eq!((bp.pt().n, bp.pt().o), (1, 2));
    }

    #[test]
    fn test_goto_char_and_goto_line() {
        let mut bp = Buffer::from_text("t", "ab\ncd\nef");
        assert!(bp.goto_char(4));
        assert_eq!((bp.pt().n, bp.pt().o), (1, 1));
        assert!(!bp.goto_char(100));
        assert!(bp.eobp());

        assert!(bp.goto_line(1));
        assert_eq!((bp.pt().n, bp.pt().o), (1, 0));
        assert!(!bp.goto_line(9));
        assert_eq!(bp.pt().n, 2);
    }

    #[test]
    fn test_word_motion_crosses_punctuation_and_lines() {
        let mut bp = Buffer::from_text("t", "foo, bar\n  baz");

        assert!(bp.forward_word());
        assert_eq!((bp.pt().n, bp.pt().o), (0, 3));
        assert!(bp.forward_word());
        assert_eq!((bp.pt().n, bp.pt().o), (0, 8));
        assert!(bp.forward_word());
        assert_eq!((bp.pt().n, bp.pt().o), (1, 5));
        assert!(!bp.forward_word());
        assert!(bp.eobp());

        assert!(bp.backward_word());
        assert_eq!((bp.pt().n, bp.pt().o), (1, 2));
        assert!(bp.backward_word());
        assert_eq!((bp.pt().n, bp.pt().o), (0, 5));

        bp.gotobob();
        assert!(!bp.backward_word());
    }

    #[test]
    fn test_end_of_line_sticks_to_line_ends() {
        let g = globals();
        let mut bp = Buffer::from_text("t", "abc\nabcdefg");
        bp.end_of_line();
        bp.next_line(&g);
        assert_eq!(bp.pt().o, 7);
    }
}
