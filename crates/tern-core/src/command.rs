//! Named commands.
//!
//! ## Learning: The Command Pattern
//!
//! Every editing action is reachable by name (`forward-char`, `yank`,
//! ...), which is what lets a script replay a session:
//! - Handlers are trait objects keyed by name in a [`CommandRegistry`]
//! - A numeric argument rides along in the [`CommandContext`]
//! - [`execute_with_uniarg`] turns "do it once" into "do it N times"

use std::collections::HashMap;
use std::sync::Arc;

use crate::editor::Editor;
use crate::CoreResult;

/// Context passed to command execution.
pub struct CommandContext<'a> {
    pub editor: &'a mut Editor,
    /// The numeric argument, if one was given
    pub arg: Option<i64>,
}

impl CommandContext<'_> {
    /// The numeric argument, defaulting to 1.
    pub fn uniarg(&self) -> i64 {
        self.arg.unwrap_or(1)
    }
}

/// Trait for command handlers.
///
/// ## Learning: Trait Objects
///
/// `dyn CommandHandler` allows storing different types that
/// implement this trait in the same collection. The `Send + Sync`
/// bounds ensure thread safety.
pub trait CommandHandler: Send + Sync {
    /// Returns the command name.
    fn name(&self) -> &str;

    /// Executes the command.
    fn execute(&self, ctx: &mut CommandContext, args: &[String]) -> CoreResult<()>;

    /// Returns a one-line description.
    fn description(&self) -> &str {
        self.name()
    }
}

/// A command backed by a function or closure.
pub struct FnCommand<F> {
    name: String,
    description: String,
    f: F,
}

impl<F> FnCommand<F>
where
    F: Fn(&mut CommandContext<'_>, &[String]) -> CoreResult<()> + Send + Sync,
{
    /// Wraps `f` as the command `name`.
    pub fn new(name: impl Into<String>, description: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            f,
        }
    }
}

impl<F> CommandHandler for FnCommand<F>
where
    F: Fn(&mut CommandContext<'_>, &[String]) -> CoreResult<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &mut CommandContext, args: &[String]) -> CoreResult<()> {
        (self.f)(ctx, args)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Registry for commands.
///
/// ## Learning: Shared Ownership
///
/// Handlers sit behind `Arc` so the editor can clone one out of the
/// registry and then lend itself mutably to it; a `Box` would keep the
/// registry (and with it the editor) borrowed for the whole call.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any previous one with the same name.
    pub fn register(&mut self, handler: impl CommandHandler + 'static) {
        let name = handler.name().to_string();
        if self.handlers.insert(name.clone(), Arc::new(handler)).is_some() {
            tracing::debug!(command = %name, "command replaced");
        }
    }

    /// Looks a handler up by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns all registered command names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// One step of a repeatable command.
pub type CommandFn = fn(&mut Editor) -> CoreResult<()>;

/// Runs `forward` `uniarg` times, or `backward` `-uniarg` times when the
/// argument is negative. Stops at the first failure.
///
/// With `undo`, the repetitions are recorded as one undo sequence in the
/// current buffer. A negative argument with no `backward` does nothing.
pub fn execute_with_uniarg(
    editor: &mut Editor,
    undo: bool,
    uniarg: i64,
    forward: CommandFn,
    backward: Option<CommandFn>,
) -> CoreResult<()> {
    let (step, count) = if uniarg < 0 {
        match backward {
            Some(backward) => (backward, uniarg.unsigned_abs()),
            None => return Ok(()),
        }
    } else {
        (forward, uniarg.unsigned_abs())
    };

    if undo {
        editor.current_mut().undo_start_sequence();
    }

    let mut result = Ok(());
    for _ in 0..count {
        if let Err(e) = step(editor) {
            result = Err(e);
            break;
        }
    }

    if undo {
        editor.current_mut().undo_end_sequence();
    }
    result
}
