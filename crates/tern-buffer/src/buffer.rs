//! The buffer: a line list plus everything that points into it.
//!
//! ## Ownership
//!
//! ```text
//! Buffer ─┬─ LineList   (owns every Line, including the sentinel)
//!         ├─ pt         (Point: weak LineId + line number + offset)
//!         ├─ markers    (MarkerTable: owns every Marker)
//!         ├─ mark       (Option<MarkerId> into `markers`)
//!         └─ undo       (UndoLog: owns every delta)
//! ```
//!
//! Points and markers only hold `LineId`s. Every mutation that removes a
//! line retargets them first (see `adjust_markers` in the editing engine),
//! so no tracked position ever names a line outside `lines`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::line::{Line, LineId, LineList, split_lines};
use crate::marker::{MarkerId, MarkerTable};
use crate::point::{Point, Position};
use crate::undo::UndoLog;
use crate::vars::{Scope, VarTable};
use crate::{BufferError, BufferResult};

/// Line ending style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix-style: \n
    #[default]
    Lf,
    /// Windows-style: \r\n
    CrLf,
    /// Classic Mac: \r
    Cr,
}

impl LineEnding {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    /// Detects line ending from text.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else if text.contains('\r') {
            LineEnding::Cr
        } else {
            LineEnding::Lf
        }
    }
}

/// Boolean buffer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferFlags {
    /// The text differs from what was last loaded or saved.
    pub modified: bool,
    /// The buffer need not be saved.
    pub nosave: bool,
    /// On save, ask for a file name.
    pub needname: bool,
    /// The buffer is a temporary buffer.
    pub temporary: bool,
    /// The buffer cannot be modified.
    pub readonly: bool,
    /// Typed characters replace instead of insert.
    pub overwrite: bool,
    /// The old file has already been backed up.
    pub backup: bool,
    /// Do not record undo information.
    pub noundo: bool,
    /// Auto Fill mode.
    pub autofill: bool,
    /// The buffer is inside an incremental search loop.
    pub isearch: bool,
    /// The mark is active.
    pub mark_active: bool,
}

/// An editable buffer.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub(crate) name: String,
    pub(crate) filename: Option<PathBuf>,
    pub(crate) eol: LineEnding,
    pub(crate) lines: LineList,
    /// Number of the last line.
    pub(crate) last_line: usize,
    /// Goal column for vertical motion.
    pub(crate) goalc: usize,
    pub(crate) pt: Point,
    pub(crate) mark: Option<MarkerId>,
    pub(crate) markers: MarkerTable,
    pub(crate) undo: UndoLog,
    pub(crate) vars: VarTable,
    pub(crate) flags: BufferFlags,
}

impl Buffer {
    /// Creates a buffer with one empty line.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_lines(name.into(), LineList::new(), LineEnding::default())
    }

    /// Creates a buffer from text, detecting the line ending.
    ///
    /// Lines break at every terminator, whatever its style; the detected
    /// style is only used when joining lines back up. A trailing line
    /// ending yields a final empty line, so `contents()` reproduces text
    /// with uniform line endings exactly.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let eol = LineEnding::detect(text);
        let lines = LineList::from_texts(split_lines(text));
        Self::with_lines(name.into(), lines, eol)
    }

    fn with_lines(name: String, lines: LineList, eol: LineEnding) -> Self {
        let first = lines.first();
        let last_line = lines.len() - 1;
        tracing::debug!(buffer = %name, lines = last_line + 1, "buffer created");
        Self {
            name,
            filename: None,
            eol,
            lines,
            last_line,
            goalc: 0,
            pt: Point::new(first, 0, 0),
            mark: None,
            markers: MarkerTable::new(),
            undo: UndoLog::new(),
            vars: VarTable::new(),
            flags: BufferFlags::default(),
        }
    }

    // ==================== Identity ====================

    /// Returns the buffer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the buffer.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the associated file, if any.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Associates a file with the buffer.
    pub fn set_filename(&mut self, path: Option<PathBuf>) {
        self.filename = path;
    }

    /// The file name when set, otherwise the buffer name.
    pub fn filename_or_name(&self) -> String {
        match &self.filename {
            Some(path) => path.display().to_string(),
            None => self.name.clone(),
        }
    }

    /// Returns the line ending used when joining lines.
    pub fn eol(&self) -> LineEnding {
        self.eol
    }

    /// Sets the line ending.
    pub fn set_eol(&mut self, eol: LineEnding) {
        self.eol = eol;
    }

    // ==================== Flags & variables ====================

    /// Returns the buffer flags.
    pub fn flags(&self) -> &BufferFlags {
        &self.flags
    }

    /// Returns the buffer flags for modification.
    pub fn flags_mut(&mut self) -> &mut BufferFlags {
        &mut self.flags
    }

    /// Returns true if the text changed since it was loaded or saved.
    pub fn is_modified(&self) -> bool {
        self.flags.modified
    }

    /// Sets the modified flag. Clearing it also clears the "unchanged"
    /// marks in the undo log, since undoing can no longer reach the
    /// on-disk state.
    pub fn set_modified(&mut self, modified: bool) {
        if !modified && self.flags.modified {
            self.undo.set_unchanged_all(false);
        }
        self.flags.modified = modified;
    }

    /// Returns true if the buffer is read-only.
    pub fn is_readonly(&self) -> bool {
        self.flags.readonly
    }

    /// Sets the read-only flag.
    pub fn set_readonly(&mut self, readonly: bool) {
        self.flags.readonly = readonly;
    }

    /// Fails with [`BufferError::ReadOnly`] if the buffer is read-only.
    pub fn warn_if_readonly(&self) -> BufferResult<()> {
        if self.flags.readonly {
            return Err(BufferError::ReadOnly {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Marks the buffer temporary (and therefore not worth saving).
    pub fn set_temporary(&mut self, temporary: bool) {
        self.flags.temporary = temporary;
    }

    /// Buffer-local variable overrides.
    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    /// Buffer-local variable overrides, for modification.
    pub fn vars_mut(&mut self) -> &mut VarTable {
        &mut self.vars
    }

    /// Variable lookup: local overrides, then `globals`.
    pub fn scope<'a>(&'a self, globals: &'a VarTable) -> Scope<'a> {
        Scope::new(&self.vars, globals)
    }

    /// Columns per tab stop; never zero.
    pub fn tab_width(&self, globals: &VarTable) -> usize {
        self.scope(globals).tab_width()
    }

    // ==================== Lines ====================

    /// Returns the line list.
    pub fn lines(&self) -> &LineList {
        &self.lines
    }

    /// Returns a line.
    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id]
    }

    /// Number of the last line.
    pub fn last_line(&self) -> usize {
        self.last_line
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.last_line + 1
    }

    /// Text of line `n`.
    pub fn line_text(&self, n: usize) -> BufferResult<&str> {
        self.lines
            .nth(n)
            .map(|id| self.lines.text(id))
            .ok_or(BufferError::LineOutOfRange {
                line: n,
                last: self.last_line,
            })
    }

    /// All line texts, first to last.
    pub fn line_texts(&self) -> Vec<&str> {
        self.lines.iter().map(|id| self.lines.text(id)).collect()
    }

    /// The whole text, lines joined with the buffer's line ending.
    pub fn contents(&self) -> String {
        self.line_texts().join(self.eol.as_str())
    }

    /// Number of characters, counting one per line break.
    pub fn calculate_buffer_size(&self) -> usize {
        let chars: usize = self.lines.iter().map(|id| self.lines[id].len()).sum();
        chars + self.last_line
    }

    // ==================== Point ====================

    /// Returns the point.
    pub fn pt(&self) -> Point {
        self.pt
    }

    /// Moves the point.
    ///
    /// The point must name a line of this buffer, with an offset inside it.
    pub fn set_pt(&mut self, pt: Point) {
        debug_assert!(self.lines.contains(pt.line), "point on a foreign line");
        debug_assert!(pt.o <= self.lines[pt.line].len(), "point past end of line");
        self.pt = pt;
    }

    /// Goal column for vertical motion.
    pub fn goalc(&self) -> usize {
        self.goalc
    }

    /// Sets the goal column.
    pub fn set_goalc(&mut self, goalc: usize) {
        self.goalc = goalc;
    }

    /// The first position in the buffer.
    pub fn point_min(&self) -> Point {
        Point::new(self.lines.first(), 0, 0)
    }

    /// The last position in the buffer.
    pub fn point_max(&self) -> Point {
        let last = self.lines.last();
        Point::new(last, self.last_line, self.lines[last].len())
    }

    /// A point at line `n`, offset `o`, both clamped into the buffer.
    pub fn make_point(&self, n: usize, o: usize) -> Point {
        let n = n.min(self.last_line);
        let line = self.lines.nth(n).unwrap_or_else(|| self.lines.last());
        Point::new(line, n, o.min(self.lines[line].len()))
    }

    /// Moves the point to a recorded position (clamped).
    pub fn goto_point(&mut self, pos: Position) {
        self.pt = self.make_point(pos.n, pos.o);
    }

    /// Start of the line `count - 1` lines away from the point, stopping at
    /// the buffer boundaries.
    pub fn line_beginning_position(&self, count: i64) -> Point {
        let mut pt = self.pt;
        pt.o = 0;

        let mut count = count - 1;
        while count < 0 && self.lines.prev(pt.line) != self.lines.limit() {
            pt.line = self.lines.prev(pt.line);
            pt.n -= 1;
            count += 1;
        }
        while count > 0 && self.lines.next(pt.line) != self.lines.limit() {
            pt.line = self.lines.next(pt.line);
            pt.n += 1;
            count -= 1;
        }
        pt
    }

    /// End of the line `count - 1` lines away from the point.
    pub fn line_end_position(&self, count: i64) -> Point {
        let mut pt = self.line_beginning_position(count);
        pt.o = self.lines[pt.line].len();
        pt
    }

    /// Number of characters between two points, counting a line break as
    /// one character. Order does not matter.
    pub fn point_distance(&self, a: Point, b: Point) -> usize {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let mut size = end.o;
        let mut line = start.line;
        while line != end.line && line != self.lines.limit() {
            size += self.lines[line].len() + 1;
            line = self.lines.next(line);
        }
        size - start.o
    }

    /// True at the very start of the buffer.
    pub fn bobp(&self) -> bool {
        self.lines.prev(self.pt.line) == self.lines.limit() && self.pt.o == 0
    }

    /// True at the very end of the buffer.
    pub fn eobp(&self) -> bool {
        self.lines.next(self.pt.line) == self.lines.limit() && self.eolp()
    }

    /// True at the start of a line.
    pub fn bolp(&self) -> bool {
        self.pt.o == 0
    }

    /// True at the end of a line.
    pub fn eolp(&self) -> bool {
        self.pt.o == self.lines[self.pt.line].len()
    }

    /// The character after the point; `\n` at end of line, `None` at end
    /// of buffer.
    pub fn following_char(&self) -> Option<char> {
        if self.eobp() {
            None
        } else if self.eolp() {
            Some('\n')
        } else {
            self.lines[self.pt.line].char_at(self.pt.o)
        }
    }

    /// The character before the point; `\n` at start of line, `None` at
    /// start of buffer.
    pub fn preceding_char(&self) -> Option<char> {
        if self.bobp() {
            None
        } else if self.bolp() {
            Some('\n')
        } else {
            self.lines[self.pt.line].char_at(self.pt.o - 1)
        }
    }

    /// True if the point's line is empty.
    pub fn is_empty_line(&self) -> bool {
        self.lines[self.pt.line].is_empty()
    }

    /// True if the point's line holds only whitespace.
    pub fn is_blank_line(&self) -> bool {
        self.lines
            .text(self.pt.line)
            .chars()
            .all(char::is_whitespace)
    }

    // ==================== Markers ====================

    /// Registers a marker at `pt`.
    pub fn marker_new(&mut self, pt: Point) -> MarkerId {
        self.markers.insert(pt)
    }

    /// Registers a marker at the point.
    pub fn point_marker(&mut self) -> MarkerId {
        self.markers.insert(self.pt)
    }

    /// Unregisters a marker. Freeing the mark clears the mark as well.
    pub fn free_marker(&mut self, id: MarkerId) {
        if self.mark == Some(id) {
            self.mark = None;
        }
        self.markers.remove(id);
    }

    /// Moves a marker. Returns false if the marker was already freed.
    pub fn move_marker(&mut self, id: MarkerId, pt: Point) -> bool {
        self.markers.set(id, pt)
    }

    /// Registers a new marker at the same place as `id`.
    pub fn copy_marker(&mut self, id: MarkerId) -> Option<MarkerId> {
        let pt = self.markers.get(id)?;
        Some(self.markers.insert(pt))
    }

    /// Returns a marker's point.
    pub fn marker_point(&self, id: MarkerId) -> Option<Point> {
        self.markers.get(id)
    }

    /// Returns the marker table.
    pub fn markers(&self) -> &MarkerTable {
        &self.markers
    }

    /// Moves the point to a marker and frees the marker.
    pub(crate) fn restore_point_marker(&mut self, id: MarkerId) {
        if let Some(pt) = self.markers.remove(id) {
            self.pt = pt;
        }
    }

    // ==================== Mark ====================

    /// Returns the mark, if set.
    pub fn mark(&self) -> Option<MarkerId> {
        self.mark
    }

    /// Returns the mark's point, if set.
    pub fn mark_point(&self) -> Option<Point> {
        self.mark.and_then(|m| self.markers.get(m))
    }

    /// Sets the mark at the point.
    pub fn set_mark(&mut self) {
        let pt = self.pt;
        self.set_mark_at(pt);
    }

    /// Sets the mark at `pt`, reusing the mark's marker when there is one.
    pub fn set_mark_at(&mut self, pt: Point) {
        match self.mark {
            Some(m) if self.markers.set(m, pt) => {}
            _ => self.mark = Some(self.markers.insert(pt)),
        }
    }

    /// Replaces the mark: frees the old one and, if `pt` is given, sets a
    /// new one there.
    pub fn replace_mark(&mut self, pt: Option<Point>) {
        if let Some(old) = self.mark.take() {
            self.markers.remove(old);
        }
        self.mark = pt.map(|pt| self.markers.insert(pt));
    }

    /// Swaps point and mark.
    pub fn exchange_point_and_mark(&mut self) -> BufferResult<()> {
        let mark = self.mark.ok_or(BufferError::NoMark)?;
        let mark_pt = self.markers.get(mark).ok_or(BufferError::NoMark)?;
        self.markers.set(mark, self.pt);
        self.pt = mark_pt;
        Ok(())
    }

    /// Activates the mark.
    pub fn activate_mark(&mut self) {
        self.flags.mark_active = true;
    }

    /// Deactivates the mark.
    pub fn deactivate_mark(&mut self) {
        self.flags.mark_active = false;
    }

    /// Returns true if the mark is active.
    pub fn is_mark_active(&self) -> bool {
        self.flags.mark_active
    }

    // ==================== Undo ====================

    /// Returns the undo log.
    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    /// Points the next `undo` back at the newest delta.
    pub fn reset_undo_cursor(&mut self) {
        self.undo.reset_cursor();
    }

    // ==================== Teardown ====================

    /// Frees markers and undo history. Called when the buffer is killed.
    pub fn release(&mut self) {
        tracing::debug!(buffer = %self.name, markers = self.markers.len(), "buffer released");
        self.mark = None;
        self.markers.clear();
        self.undo.clear();
    }
}
