//! The kill ring.
//!
//! A single slot of killed text. Consecutive kills append to it; any
//! other command in between starts it afresh. A command counts as a kill
//! when it leaves `this_command` set to [`KILL_REGION`].

use tern_buffer::vars::{KILL_WHOLE_LINE, TRANSIENT_MARK_MODE};
use tern_buffer::{BufferError, Point, Region};

use crate::command::execute_with_uniarg;
use crate::editor::Editor;
use crate::CoreResult;

/// The command name every kill reports as `this_command`.
pub const KILL_REGION: &str = "kill-region";

/// Killed text waiting to be yanked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KillRing {
    text: Option<String>,
}

impl KillRing {
    /// Creates an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `s` to the killed text.
    pub fn push(&mut self, s: &str) {
        self.text.get_or_insert_with(String::new).push_str(s);
    }

    /// Empties the ring.
    pub fn clear(&mut self) {
        self.text = None;
    }

    /// The killed text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns true if nothing has been killed.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }
}

impl Editor {
    /// True while a run of kills is in progress, either carried over from
    /// the previous command or started earlier in this one.
    fn kill_in_progress(&self) -> bool {
        self.last_command() == KILL_REGION || self.this_command() == KILL_REGION
    }

    fn begin_kill(&mut self) {
        if !self.kill_in_progress() {
            self.kill_ring.clear();
        }
    }

    /// Copies `region` to the kill ring and, when `kill` is set, deletes it.
    ///
    /// On a read-only buffer the text is still copied and then
    /// `ReadOnly` is returned.
    pub fn copy_or_kill_region(&mut self, kill: bool, region: &Region) -> CoreResult<()> {
        let text = self.current().copy_region(region);
        self.begin_kill();
        self.kill_ring.push(&text);

        let result = if kill {
            let bp = self.current_mut();
            bp.warn_if_readonly().and_then(|()| bp.delete_region(region))
        } else {
            Ok(())
        };

        self.set_this_command(KILL_REGION);
        self.current_mut().deactivate_mark();
        tracing::debug!(chars = region.size, kill, "region saved to kill ring");
        Ok(result?)
    }

    fn the_region(&self) -> CoreResult<Region> {
        let transient = self.variable_bool(TRANSIENT_MARK_MODE);
        Ok(self.current().calculate_region(transient)?)
    }

    /// Kills the text between point and mark.
    pub fn kill_region(&mut self) -> CoreResult<()> {
        let region = self.the_region()?;
        self.copy_or_kill_region(true, &region)
    }

    /// Saves the text between point and mark as if killed.
    pub fn copy_region_as_kill(&mut self) -> CoreResult<()> {
        let region = self.the_region()?;
        self.copy_or_kill_region(false, &region)
    }

    /// Kills from the start of the line to the point.
    pub fn kill_to_bol(&mut self) -> CoreResult<()> {
        let bp = self.current();
        if bp.bolp() {
            return Ok(());
        }

        let end = bp.pt();
        let region = Region {
            start: bp.make_point(end.n, 0),
            end,
            size: end.o,
        };
        self.copy_or_kill_region(true, &region)
    }

    /// Kills the rest of the line. The line break goes too when
    /// `whole_line` is set or only blanks follow the point.
    fn kill_line_at(&mut self, whole_line: bool) -> CoreResult<()> {
        let bp = self.current();
        let pt = bp.pt();
        let rest: String = bp.line(pt.line).text().chars().skip(pt.o).collect();
        let only_blanks = rest.chars().all(|c| c == ' ' || c == '\t');

        if bp.eobp() {
            return Err(BufferError::EndOfBuffer.into());
        }

        self.current_mut().undo_start_sequence();
        let result = self.kill_line_body(pt, rest.chars().count(), whole_line || only_blanks);
        self.current_mut().undo_end_sequence();
        result
    }

    fn kill_line_body(
        &mut self,
        pt: Point,
        rest: usize,
        through_newline: bool,
    ) -> CoreResult<()> {
        if rest > 0 {
            let region = Region {
                start: pt,
                end: self.current().make_point(pt.n, pt.o + rest),
                size: rest,
            };
            self.copy_or_kill_region(true, &region)?;
        }

        if through_newline && !self.current().eobp() {
            self.current_mut().delete_char()?;
            self.begin_kill();
            self.kill_ring.push("\n");
            self.set_this_command(KILL_REGION);
        }
        Ok(())
    }

    fn kill_whole_line(&mut self) -> CoreResult<()> {
        self.kill_line_at(true)
    }

    fn kill_line_backward(&mut self) -> CoreResult<()> {
        let (bp, globals) = self.current_with_globals();
        if !bp.previous_line(globals) {
            return Err(BufferError::BeginningOfBuffer.into());
        }
        self.kill_whole_line()
    }

    /// `kill-line`: kills the rest of the line, or through the newline if
    /// only blanks remain.
    ///
    /// With an argument, kills that many whole lines forward (backward
    /// when negative); zero or a negative argument first kills back to the
    /// start of the line. Without one, at the start of a line and with
    /// `kill-whole-line` set, the whole line goes.
    pub fn kill_line(&mut self, arg: Option<i64>) -> CoreResult<()> {
        self.begin_kill();

        let result = match arg {
            None => {
                let whole = self.current().bolp() && self.variable_bool(KILL_WHOLE_LINE);
                self.kill_line_at(whole)
            }
            Some(arg) => {
                self.current_mut().undo_start_sequence();
                let mut result = Ok(());
                if arg <= 0 {
                    result = self.kill_to_bol();
                }
                if arg != 0 && result.is_ok() {
                    result = execute_with_uniarg(
                        self,
                        true,
                        arg,
                        Self::kill_whole_line,
                        Some(Self::kill_line_backward),
                    );
                }
                self.current_mut().undo_end_sequence();
                result
            }
        };

        self.current_mut().deactivate_mark();
        result
    }

    /// Kills `n` words forward (backward when negative) as one undoable
    /// step. The mark is put back the way it was.
    pub fn kill_words(&mut self, n: i64) -> CoreResult<()> {
        self.begin_kill();
        self.current().warn_if_readonly()?;

        self.push_mark();
        self.current_mut().undo_start_sequence();
        self.mark_words(n);
        let result = self.kill_region();
        self.current_mut().undo_end_sequence();
        self.pop_mark();

        self.set_this_command(KILL_REGION);
        result
    }

    /// Reinserts the killed text at the point, leaving the mark before it.
    /// The insertion is one undoable step.
    pub fn yank(&mut self) -> CoreResult<()> {
        let text = self
            .kill_ring
            .text()
            .ok_or(BufferError::KillRingEmpty)?
            .to_string();
        self.current().warn_if_readonly()?;

        self.set_mark_interactive();
        let bp = self.current_mut();
        let result = bp.insert_string(&text);
        bp.deactivate_mark();
        Ok(result?)
    }
}
