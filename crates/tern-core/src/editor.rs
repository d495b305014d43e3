//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade over the buffer list, the rings and the
//! command registry. A front end (the `tern` binary, a test) drives
//! everything through [`Editor::execute`] and reads state back through
//! the accessors.

use tern_buffer::vars::{AUTO_FILL_MODE, is_local};
use tern_buffer::{Buffer, VarTable};

use crate::buffers::{BufferId, BufferList};
use crate::command::{CommandContext, CommandRegistry};
use crate::commands::register_builtins;
use crate::config::Config;
use crate::killring::KillRing;
use crate::mark::MarkRing;
use crate::{CoreError, CoreResult};

/// The state of one editing session.
///
/// There is always a current buffer: killing the last one recreates
/// `*scratch*`.
pub struct Editor {
    pub(crate) buffers: BufferList,

    /// The buffer commands act on
    pub(crate) current: BufferId,

    /// Variables every buffer falls back to
    globals: VarTable,

    /// Editor configuration
    config: Config,

    pub(crate) kill_ring: KillRing,
    pub(crate) mark_ring: MarkRing,

    /// Name of the previous command, as it reported itself
    last_command: String,

    /// Name of the running command; kills overwrite it
    this_command: String,

    /// Command registry
    registry: CommandRegistry,
}

impl Editor {
    /// Creates an editor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an editor with custom configuration. The session starts in
    /// `*scratch*`.
    pub fn with_config(config: Config) -> Self {
        let mut buffers = BufferList::new();
        let current = buffers.create_scratch();

        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry);

        let mut editor = Self {
            buffers,
            current,
            globals: config.variables(),
            config,
            kill_ring: KillRing::new(),
            mark_ring: MarkRing::new(),
            last_command: String::new(),
            this_command: String::new(),
            registry,
        };
        editor.init_buffer(current);
        editor
    }

    /// Creates an editor whose current buffer holds `text`.
    pub fn with_text(name: &str, text: &str) -> Self {
        let mut editor = Self::new();
        let id = editor.create_buffer_from_text(name, text);
        editor.current = id;
        editor
    }

    // ==================== Buffer Operations ====================

    /// Applies configuration defaults to a fresh buffer.
    fn init_buffer(&mut self, id: BufferId) {
        let autofill = self.buffers[id].scope(&self.globals).get_bool(AUTO_FILL_MODE);
        let noundo = !self.config.editor.undo_enabled;
        let flags = self.buffers[id].flags_mut();
        flags.autofill = autofill;
        flags.noundo = noundo;
    }

    /// Creates an empty buffer at the head of the list. The name is made
    /// unique with a `<N>` suffix if needed.
    pub fn create_buffer(&mut self, name: &str) -> BufferId {
        let mut bp = Buffer::new(self.buffers.unique_name(name));
        bp.set_eol(self.config.files.line_ending);
        let id = self.buffers.insert(bp);
        self.init_buffer(id);
        id
    }

    /// Creates a buffer holding `text`. The line ending is detected from
    /// the text.
    pub fn create_buffer_from_text(&mut self, name: &str, text: &str) -> BufferId {
        let bp = Buffer::from_text(self.buffers.unique_name(name), text);
        let id = self.buffers.insert(bp);
        self.init_buffer(id);
        id
    }

    /// Creates a fresh `*scratch*` buffer.
    pub fn create_scratch(&mut self) -> BufferId {
        let id = self.buffers.create_scratch();
        self.init_buffer(id);
        id
    }

    /// Finds a buffer by name.
    pub fn find_buffer(&self, name: &str) -> Option<BufferId> {
        self.buffers.find(name)
    }

    /// Makes `id` the current buffer. A temporary buffer being left drops
    /// to the end of the list.
    pub fn switch_to_buffer(&mut self, id: BufferId) -> CoreResult<()> {
        if !self.buffers.contains(id) {
            return Err(CoreError::StaleBuffer);
        }

        let old = self.current;
        if old != id && self.buffers[old].flags().temporary {
            self.buffers.move_to_tail(old);
        }
        self.buffers.move_to_head(id);
        self.current = id;
        tracing::debug!(buffer = %self.buffers[id].name(), "switched buffer");
        Ok(())
    }

    /// Kills a buffer. If it was current, the next buffer in the list
    /// takes over; if it was the last one, a new `*scratch*` does.
    pub fn kill_buffer(&mut self, id: BufferId) -> CoreResult<()> {
        let next = self.buffers.next_after(id);
        let mut bp = self.buffers.remove(id).ok_or(CoreError::StaleBuffer)?;
        bp.release();
        self.mark_ring.forget(id);
        tracing::debug!(buffer = %bp.name(), "buffer killed");

        if self.current == id {
            self.current = match next {
                Some(next) => next,
                None => self.create_scratch(),
            };
            self.buffers.move_to_head(self.current);
        }
        Ok(())
    }

    /// Buffer names, most recently used first.
    pub fn list_buffers(&self) -> Vec<&str> {
        self.buffers.names()
    }

    /// Names of modified buffers that would need saving.
    pub fn unsaved_buffers(&self) -> Vec<&str> {
        self.buffers
            .iter()
            .filter(|(_, bp)| bp.is_modified() && !bp.flags().nosave)
            .map(|(_, bp)| bp.name())
            .collect()
    }

    /// Returns the buffer list.
    pub fn buffers(&self) -> &BufferList {
        &self.buffers
    }

    /// Returns a buffer by handle.
    pub fn buffer(&self, id: BufferId) -> Option<&Buffer> {
        self.buffers.get(id)
    }

    /// Returns a buffer mutably by handle.
    pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
        self.buffers.get_mut(id)
    }

    /// Returns the current buffer's handle.
    pub fn current_id(&self) -> BufferId {
        self.current
    }

    /// Returns the current buffer.
    pub fn current(&self) -> &Buffer {
        &self.buffers[self.current]
    }

    /// Returns the current buffer mutably.
    pub fn current_mut(&mut self) -> &mut Buffer {
        &mut self.buffers[self.current]
    }

    /// The current buffer together with the global variables, for buffer
    /// operations that read variables.
    pub fn current_with_globals(&mut self) -> (&mut Buffer, &VarTable) {
        (&mut self.buffers[self.current], &self.globals)
    }

    // ==================== Variables ====================

    /// Returns the global variables.
    pub fn globals(&self) -> &VarTable {
        &self.globals
    }

    /// Returns the global variables mutably.
    pub fn globals_mut(&mut self) -> &mut VarTable {
        &mut self.globals
    }

    /// Looks a variable up in the current buffer, then globally.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.current().scope(&self.globals).get(name)
    }

    /// A variable's truth value as seen from the current buffer.
    pub fn variable_bool(&self, name: &str) -> bool {
        self.current().scope(&self.globals).get_bool(name)
    }

    /// Sets a variable in the current buffer when `local`, else globally.
    pub fn set_variable(&mut self, name: &str, value: &str, local: bool) {
        tracing::debug!(name, value, local, "set variable");
        if local {
            self.current_mut().vars_mut().set(name, value);
        } else {
            self.globals.set(name, value);
        }
    }

    /// Sets a variable where `set-variable` would: buffer-locally for the
    /// per-buffer variables, globally for the rest.
    pub fn set_variable_default(&mut self, name: &str, value: &str) {
        self.set_variable(name, value, is_local(name));
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Commands ====================

    /// Name of the previous command.
    pub fn last_command(&self) -> &str {
        &self.last_command
    }

    /// Name of the running command.
    pub fn this_command(&self) -> &str {
        &self.this_command
    }

    /// Renames the running command, as kills do.
    pub fn set_this_command(&mut self, name: &str) {
        self.this_command = name.to_string();
    }

    /// Returns the kill ring.
    pub fn kill_ring(&self) -> &KillRing {
        &self.kill_ring
    }

    /// Returns the mark ring.
    pub fn mark_ring(&self) -> &MarkRing {
        &self.mark_ring
    }

    /// Returns the command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Returns the command registry mutably.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Runs the command `name` with an optional numeric argument.
    ///
    /// Whatever the outcome, the command becomes `last_command`, and
    /// unless it was `undo` the next `undo` starts again from the newest
    /// change.
    pub fn execute(&mut self, name: &str, arg: Option<i64>, args: &[String]) -> CoreResult<()> {
        let handler = self
            .registry
            .get(name)
            .ok_or_else(|| CoreError::CommandNotFound(name.to_string()))?;

        self.this_command = name.to_string();
        tracing::debug!(command = name, ?arg, ?args, "execute");

        let result = handler.execute(&mut CommandContext { editor: self, arg }, args);
        if let Err(e) = &result {
            tracing::warn!(command = name, "{}", e);
        }

        if name != "undo" {
            self.current_mut().reset_undo_cursor();
        }
        self.last_command = std::mem::take(&mut self.this_command);
        result
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::SCRATCH;
    use tern_buffer::vars::{FILL_COLUMN, TAB_WIDTH};

    #[test]
    fn test_editor_starts_in_scratch() {
        let ed = Editor::new();
        assert_eq!(ed.current().name(), SCRATCH);
        assert_eq!(ed.list_buffers(), vec![SCRATCH]);
        assert!(ed.current().flags().nosave);
        assert_eq!(ed.globals().get(TAB_WIDTH), Some("8"));
    }

    #[test]
    fn test_create_buffer_unique_names() {
        let mut ed = Editor::new();
        let a = ed.create_buffer("notes");
        let b = ed.create_buffer("notes");

        assert_eq!(ed.buffer(a).unwrap().name(), "notes");
        assert_eq!(ed.buffer(b).unwrap().name(), "notes<2>");
        assert_eq!(ed.find_buffer("notes<2>"), Some(b));
    }

    #[test]
    fn test_config_flows_into_buffers() {
        let mut config = Config::default();
        config.editor.auto_fill_mode = true;
        config.editor.undo_enabled = false;

        let mut ed = Editor::with_config(config);
        let id = ed.create_buffer("a");
        let flags = ed.buffer(id).unwrap().flags();
        assert!(flags.autofill);
        assert!(flags.noundo);
    }

    #[test]
    fn test_switch_moves_temporary_to_tail() {
        let mut ed = Editor::new();
        let scratch = ed.current_id();
        let a = ed.create_buffer("a");
        let b = ed.create_buffer("b");
        ed.switch_to_buffer(scratch).unwrap();
        assert_eq!(ed.list_buffers(), vec![SCRATCH, "b", "a"]);

        ed.switch_to_buffer(a).unwrap();
        assert_eq!(ed.current_id(), a);
        assert_eq!(ed.list_buffers(), vec!["a", "b", SCRATCH]);

        ed.switch_to_buffer(b).unwrap();
        assert_eq!(ed.list_buffers(), vec!["b", "a", SCRATCH]);
    }

    #[test]
    fn test_kill_current_buffer_selects_next() {
        let mut ed = Editor::new();
        let a = ed.create_buffer("a");
        ed.switch_to_buffer(a).unwrap();

        ed.kill_buffer(a).unwrap();
        assert_eq!(ed.current().name(), SCRATCH);
        assert!(ed.buffer(a).is_none());
        assert!(matches!(ed.kill_buffer(a), Err(CoreError::StaleBuffer)));
    }

    #[test]
    fn test_kill_last_buffer_recreates_scratch() {
        let mut ed = Editor::new();
        let scratch = ed.current_id();
        ed.current_mut().insert_string("gone").unwrap();

        ed.kill_buffer(scratch).unwrap();
        assert_eq!(ed.list_buffers(), vec![SCRATCH]);
        assert_ne!(ed.current_id(), scratch);
        assert_eq!(ed.current().contents(), "");
    }

    #[test]
    fn test_kill_buffer_purges_mark_ring() {
        let mut ed = Editor::new();
        let a = ed.create_buffer("a");
        ed.switch_to_buffer(a).unwrap();
        ed.set_mark_interactive();
        assert_eq!(ed.mark_ring().len(), 1);

        ed.kill_buffer(a).unwrap();
        assert!(ed.mark_ring().is_empty());
    }

    #[test]
    fn test_local_and_global_variables() {
        let mut ed = Editor::new();
        let other = ed.create_buffer("other");

        ed.set_variable_default(FILL_COLUMN, "20");
        ed.set_variable_default("case-replace", "nil");

        assert_eq!(ed.variable(FILL_COLUMN), Some("20"));
        assert_eq!(ed.globals().get(FILL_COLUMN), Some("70"));
        assert_eq!(ed.globals().get("case-replace"), Some("nil"));

        ed.switch_to_buffer(other).unwrap();
        assert_eq!(ed.variable(FILL_COLUMN), Some("70"));
        assert!(!ed.variable_bool("case-replace"));
    }

    #[test]
    fn test_execute_records_last_command() {
        let mut ed = Editor::with_text("t", "abc");
        ed.execute("forward-char", None, &[]).unwrap();
        assert_eq!(ed.last_command(), "forward-char");
        assert_eq!(ed.this_command(), "");

        let err = ed.execute("no-such-command", None, &[]).unwrap_err();
        assert!(matches!(err, CoreError::CommandNotFound(_)));
        assert_eq!(ed.last_command(), "forward-char");
    }

    #[test]
    fn test_undo_cursor_resets_after_other_commands() {
        let mut ed = Editor::with_text("t", "");
        ed.execute("insert", None, &["ab".to_string()]).unwrap();
        ed.execute("undo", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "");

        // A further undo would find nothing left...
        assert!(ed.current().undo_log().next_index().is_none());

        // ...but after another command the undo itself is undoable.
        ed.execute("beginning-of-line", None, &[]).unwrap();
        ed.execute("undo", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "ab");
    }
}
