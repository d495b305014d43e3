//! Built-in commands.
//!
//! Each command is a plain function registered under its Emacs name.
//! Repeatable ones are built from a single step plus
//! [`execute_with_uniarg`], which supplies the repetition, the reverse
//! direction for negative arguments and, for edits, the undo sequence.

use tern_buffer::BufferError;

use crate::command::{CommandContext, CommandFn, CommandRegistry, FnCommand, execute_with_uniarg};
use crate::editor::Editor;
use crate::{CoreError, CoreResult};

type Handler = fn(&mut CommandContext<'_>, &[String]) -> CoreResult<()>;

const BUILTINS: &[(&str, &str, Handler)] = &[
    // Motion
    ("forward-char", "Move point right N characters (left if N is negative)", forward_char),
    ("backward-char", "Move point left N characters (right if N is negative)", backward_char),
    ("next-line", "Move point down N lines, keeping the goal column", next_line),
    ("previous-line", "Move point up N lines, keeping the goal column", previous_line),
    ("beginning-of-line", "Move point to the beginning of the line", beginning_of_line),
    ("end-of-line", "Move point to the end of the line", end_of_line),
    ("beginning-of-buffer", "Move point to the beginning of the buffer, leaving the mark", beginning_of_buffer),
    ("end-of-buffer", "Move point to the end of the buffer, leaving the mark", end_of_buffer),
    ("goto-line", "Go to line N, counting from 1", goto_line),
    ("goto-char", "Go to character N, counting from 1", goto_char),
    ("forward-word", "Move point forward N words (backward if N is negative)", forward_word),
    ("backward-word", "Move point backward N words (forward if N is negative)", backward_word),
    // Insertion and deletion
    ("insert", "Insert the arguments at point", insert),
    ("self-insert", "Insert a character N times", self_insert),
    ("newline", "Insert N newlines", newline),
    ("open-line", "Insert N newlines, leaving point before them", open_line),
    ("delete-char", "Delete the following N characters (previous if N is negative)", delete_char),
    ("backward-delete-char", "Delete the previous N characters (following if N is negative)", backward_delete_char),
    ("delete-horizontal-space", "Delete all spaces and tabs around point", delete_horizontal_space),
    ("just-one-space", "Delete all spaces and tabs around point, leaving one space", just_one_space),
    ("tab-to-tab-stop", "Indent to the next tab stop N times", tab_to_tab_stop),
    ("indent-relative", "Space out to under the next indent point in the previous nonblank line", indent_relative),
    ("indent-for-tab-command", "Indent line or insert a tab", indent_for_tab_command),
    ("newline-and-indent", "Insert a newline, then indent", newline_and_indent),
    // Mark, region and kill ring
    ("set-mark-command", "Set the mark at point and activate it", set_mark_command),
    ("exchange-point-and-mark", "Put the mark where point is and point where the mark was", exchange_point_and_mark),
    ("kill-region", "Kill between point and mark", kill_region),
    ("copy-region-as-kill", "Save the region as if killed, but don't kill it", copy_region_as_kill),
    ("mark-word", "Set the mark N words away from point", mark_word),
    ("kill-word", "Kill characters forward until the end of a word, N times", kill_word),
    ("backward-kill-word", "Kill characters backward until the start of a word, N times", backward_kill_word),
    ("kill-line", "Kill the rest of the line, or N lines", kill_line),
    ("yank", "Reinsert the last stretch of killed text", yank),
    // Undo
    ("undo", "Undo some previous changes", undo),
    // Modes and variables
    ("toggle-read-only", "Change whether this buffer is read-only", toggle_read_only),
    ("overwrite-mode", "Toggle Overwrite mode; a positive N turns it on", overwrite_mode),
    ("auto-fill-mode", "Toggle Auto Fill mode; a positive N turns it on", auto_fill_mode),
    ("set-variable", "Set VARIABLE to VALUE", set_variable),
    // Buffers
    ("switch-to-buffer", "Select buffer NAME, creating it if needed", switch_to_buffer),
    ("kill-buffer", "Kill buffer NAME, or the current buffer", kill_buffer),
];

/// Registers every built-in command.
pub fn register_builtins(registry: &mut CommandRegistry) {
    for &(name, description, handler) in BUILTINS {
        registry.register(FnCommand::new(name, description, handler));
    }
    tracing::trace!(count = BUILTINS.len(), "built-in commands registered");
}

// ==================== Argument Helpers ====================

/// A number from the first argument, else the numeric argument.
fn number_arg(ctx: &CommandContext<'_>, args: &[String]) -> CoreResult<i64> {
    match args.first() {
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidArgument(format!("not a number: {s}"))),
        None => ctx
            .arg
            .ok_or_else(|| CoreError::InvalidArgument("expected a number".into())),
    }
}

/// A character from a key name (`SPC`, `TAB`, `RET`) or a one-character
/// string.
fn char_arg(s: &str) -> CoreResult<char> {
    match s {
        "SPC" => Ok(' '),
        "TAB" => Ok('\t'),
        "RET" => Ok('\n'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(CoreError::InvalidArgument(format!("not a character: {s}"))),
            }
        }
    }
}

/// A mode switch: no argument toggles, a positive one turns on.
fn mode_arg(arg: Option<i64>, current: bool) -> bool {
    arg.map_or(!current, |n| n > 0)
}

fn check(ok: bool, err: BufferError) -> CoreResult<()> {
    if ok { Ok(()) } else { Err(err.into()) }
}

// ==================== Steps ====================

fn step_forward_char(ed: &mut Editor) -> CoreResult<()> {
    check(ed.current_mut().forward_char(), BufferError::EndOfBuffer)
}

fn step_backward_char(ed: &mut Editor) -> CoreResult<()> {
    check(ed.current_mut().backward_char(), BufferError::BeginningOfBuffer)
}

fn step_forward_word(ed: &mut Editor) -> CoreResult<()> {
    check(ed.current_mut().forward_word(), BufferError::EndOfBuffer)
}

fn step_backward_word(ed: &mut Editor) -> CoreResult<()> {
    check(ed.current_mut().backward_word(), BufferError::BeginningOfBuffer)
}

fn step_next_line(ed: &mut Editor) -> CoreResult<()> {
    let (bp, globals) = ed.current_with_globals();
    check(bp.next_line(globals), BufferError::EndOfBuffer)
}

fn step_previous_line(ed: &mut Editor) -> CoreResult<()> {
    let (bp, globals) = ed.current_with_globals();
    check(bp.previous_line(globals), BufferError::BeginningOfBuffer)
}

fn step_newline(ed: &mut Editor) -> CoreResult<()> {
    let (bp, globals) = ed.current_with_globals();
    Ok(bp.newline(globals)?)
}

fn step_open_line(ed: &mut Editor) -> CoreResult<()> {
    Ok(ed.current_mut().intercalate_newline()?)
}

fn step_delete_char(ed: &mut Editor) -> CoreResult<()> {
    Ok(ed.current_mut().delete_char()?)
}

fn step_backward_delete_char(ed: &mut Editor) -> CoreResult<()> {
    Ok(ed.current_mut().backward_delete_char()?)
}

fn step_insert_tab(ed: &mut Editor) -> CoreResult<()> {
    let (bp, globals) = ed.current_with_globals();
    Ok(bp.insert_tab(globals)?)
}

fn step_undo(ed: &mut Editor) -> CoreResult<()> {
    Ok(ed.current_mut().undo()?)
}

fn repeat(ctx: &mut CommandContext<'_>, undo: bool, forward: CommandFn, backward: Option<CommandFn>) -> CoreResult<()> {
    let n = ctx.uniarg();
    execute_with_uniarg(ctx.editor, undo, n, forward, backward)
}

// ==================== Motion ====================

fn forward_char(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, false, step_forward_char, Some(step_backward_char))
}

fn backward_char(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, false, step_backward_char, Some(step_forward_char))
}

fn forward_word(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, false, step_forward_word, Some(step_backward_word))
}

fn backward_word(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, false, step_backward_word, Some(step_forward_word))
}

/// Vertical motion keeps the column it started from across a run of
/// line motions.
fn keep_goal_column(ed: &mut Editor) {
    if !matches!(ed.last_command(), "next-line" | "previous-line") {
        let (bp, globals) = ed.current_with_globals();
        bp.update_goalc(globals);
    }
}

fn next_line(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    keep_goal_column(ctx.editor);
    let result = repeat(ctx, false, step_next_line, Some(step_previous_line));
    if result.is_err() {
        ctx.editor.current_mut().end_of_line();
    }
    result
}

fn previous_line(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    keep_goal_column(ctx.editor);
    let result = repeat(ctx, false, step_previous_line, Some(step_next_line));
    if result.is_err() {
        ctx.editor.current_mut().beginning_of_line();
    }
    result
}

fn beginning_of_line(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.current_mut().beginning_of_line();
    Ok(())
}

fn end_of_line(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.current_mut().end_of_line();
    Ok(())
}

fn beginning_of_buffer(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.set_mark_interactive();
    ctx.editor.current_mut().gotobob();
    Ok(())
}

fn end_of_buffer(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.set_mark_interactive();
    ctx.editor.current_mut().gotoeob();
    Ok(())
}

fn goto_line(ctx: &mut CommandContext<'_>, args: &[String]) -> CoreResult<()> {
    let n = number_arg(ctx, args)?;
    let line = usize::try_from(n.max(1) - 1).unwrap_or(usize::MAX);
    ctx.editor.current_mut().goto_line(line);
    Ok(())
}

fn goto_char(ctx: &mut CommandContext<'_>, args: &[String]) -> CoreResult<()> {
    let n = number_arg(ctx, args)?;
    let offset = usize::try_from(n.max(1) - 1).unwrap_or(usize::MAX);
    ctx.editor.current_mut().goto_char(offset);
    Ok(())
}

// ==================== Insertion and Deletion ====================

fn insert(ctx: &mut CommandContext<'_>, args: &[String]) -> CoreResult<()> {
    Ok(ctx.editor.current_mut().insert_string(&args.join(" "))?)
}

fn self_insert(ctx: &mut CommandContext<'_>, args: &[String]) -> CoreResult<()> {
    let key = args
        .first()
        .ok_or_else(|| CoreError::InvalidArgument("expected a character".into()))?;
    let c = char_arg(key)?;
    let n = ctx.uniarg();

    let (bp, globals) = ctx.editor.current_with_globals();
    bp.undo_sequence(|bp| {
        for _ in 0..n.max(0) {
            bp.self_insert_char(c, globals)?;
        }
        Ok(())
    })?;
    Ok(())
}

fn newline(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, true, step_newline, None)
}

fn open_line(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, true, step_open_line, None)
}

fn delete_char(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, true, step_delete_char, Some(step_backward_delete_char))
}

fn backward_delete_char(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, true, step_backward_delete_char, Some(step_delete_char))
}

fn delete_horizontal_space(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    Ok(ctx.editor.current_mut().delete_horizontal_space()?)
}

fn just_one_space(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let (bp, globals) = ctx.editor.current_with_globals();
    Ok(bp.just_one_space(globals)?)
}

fn tab_to_tab_stop(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, true, step_insert_tab, None)
}

fn indent_relative(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let (bp, globals) = ctx.editor.current_with_globals();
    Ok(bp.indent_relative(globals)?)
}

fn indent_for_tab_command(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let (bp, globals) = ctx.editor.current_with_globals();
    Ok(bp.indent_for_tab_command(globals)?)
}

fn newline_and_indent(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let (bp, globals) = ctx.editor.current_with_globals();
    Ok(bp.newline_and_indent(globals)?)
}

// ==================== Mark, Region and Kill Ring ====================

fn set_mark_command(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.set_mark_command();
    Ok(())
}

fn exchange_point_and_mark(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.exchange_point_and_mark()
}

fn kill_region(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.kill_region()
}

fn copy_region_as_kill(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.copy_region_as_kill()
}

fn mark_word(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let n = ctx.uniarg();
    ctx.editor.mark_word(n);
    Ok(())
}

fn kill_word(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let n = ctx.uniarg();
    ctx.editor.kill_words(n)
}

fn backward_kill_word(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let n = ctx.uniarg();
    ctx.editor.kill_words(-n)
}

fn kill_line(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let arg = ctx.arg;
    ctx.editor.kill_line(arg)
}

fn yank(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    ctx.editor.yank()
}

fn undo(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    repeat(ctx, false, step_undo, None)
}

// ==================== Modes and Variables ====================

fn toggle_read_only(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let bp = ctx.editor.current_mut();
    let readonly = mode_arg(ctx.arg, bp.is_readonly());
    bp.set_readonly(readonly);
    Ok(())
}

fn overwrite_mode(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let arg = ctx.arg;
    let flags = ctx.editor.current_mut().flags_mut();
    flags.overwrite = mode_arg(arg, flags.overwrite);
    Ok(())
}

fn auto_fill_mode(ctx: &mut CommandContext<'_>, _: &[String]) -> CoreResult<()> {
    let arg = ctx.arg;
    let flags = ctx.editor.current_mut().flags_mut();
    flags.autofill = mode_arg(arg, flags.autofill);
    Ok(())
}

fn set_variable(ctx: &mut CommandContext<'_>, args: &[String]) -> CoreResult<()> {
    let (name, value) = match args {
        [name, value @ ..] if !value.is_empty() => (name, value.join(" ")),
        _ => {
            return Err(CoreError::InvalidArgument(
                "usage: set-variable VARIABLE VALUE".into(),
            ));
        }
    };
    ctx.editor.set_variable_default(name, &value);
    Ok(())
}

// ==================== Buffers ====================

fn switch_to_buffer(ctx: &mut CommandContext<'_>, args: &[String]) -> CoreResult<()> {
    let ed = &mut *ctx.editor;
    let id = match args.first() {
        Some(name) => match ed.find_buffer(name) {
            Some(id) => id,
            None => ed.create_buffer(name),
        },
        None => match ed.buffers().next_after(ed.current_id()) {
            Some(id) => id,
            None => return Ok(()),
        },
    };
    ed.switch_to_buffer(id)
}

fn kill_buffer(ctx: &mut CommandContext<'_>, args: &[String]) -> CoreResult<()> {
    let ed = &mut *ctx.editor;
    let id = match args.first() {
        Some(name) => ed
            .find_buffer(name)
            .ok_or_else(|| CoreError::BufferNotFound(name.clone()))?,
        None => ed.current_id(),
    };
    ed.kill_buffer(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_buffer::Position;
    use tern_buffer::vars::FILL_COLUMN;

    fn run(ed: &mut Editor, name: &str, arg: Option<i64>, args: &[&str]) -> CoreResult<()> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        ed.execute(name, arg, &args)
    }

    fn pos(ed: &Editor) -> Position {
        ed.current().pt().position()
    }

    #[test]
    fn test_all_builtins_registered() {
        let ed = Editor::new();
        for (name, _, _) in BUILTINS {
            assert!(ed.registry().contains(name), "{name} missing");
        }
        assert_eq!(ed.registry().len(), BUILTINS.len());
    }

    #[test]
    fn test_char_arg() {
        assert_eq!(char_arg("SPC").unwrap(), ' ');
        assert_eq!(char_arg("RET").unwrap(), '\n');
        assert_eq!(char_arg("é").unwrap(), 'é');
        assert!(char_arg("ab").is_err());
        assert!(char_arg("").is_err());
    }

    #[test]
    fn test_forward_char_errors_at_end() {
        let mut ed = Editor::with_text("t", "ab\ncd");
        run(&mut ed, "forward-char", Some(4), &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(1, 1));

        let err = run(&mut ed, "forward-char", Some(5), &[]).unwrap_err();
        assert_eq!(err.as_buffer_error(), Some(&BufferError::EndOfBuffer));
        assert_eq!(pos(&ed), Position::new(1, 2));

        run(&mut ed, "backward-char", Some(-1), &[]).unwrap_err();
        run(&mut ed, "forward-char", Some(-2), &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(1, 0));
    }

    #[test]
    fn test_line_motion_keeps_goal_column() {
        let mut ed = Editor::with_text("t", "abcdef\nab\nabcdef");
        ed.current_mut().goto_point(Position::new(0, 4));

        run(&mut ed, "next-line", None, &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(1, 2));
        run(&mut ed, "next-line", None, &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(2, 4));
        run(&mut ed, "previous-line", Some(2), &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(0, 4));
    }

    #[test]
    fn test_next_line_at_end_goes_to_line_end() {
        let mut ed = Editor::with_text("t", "ab\ncd");
        ed.current_mut().goto_point(Position::new(1, 0));

        assert!(run(&mut ed, "next-line", None, &[]).is_err());
        assert_eq!(pos(&ed), Position::new(1, 2));
    }

    #[test]
    fn test_goto_line_and_char() {
        let mut ed = Editor::with_text("t", "one\ntwo\nthree");

        run(&mut ed, "goto-line", None, &["3"]).unwrap();
        assert_eq!(pos(&ed), Position::new(2, 0));
        run(&mut ed, "goto-line", Some(0), &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(0, 0));
        run(&mut ed, "goto-line", None, &["99"]).unwrap();
        assert_eq!(pos(&ed), Position::new(2, 0));

        run(&mut ed, "goto-char", None, &["6"]).unwrap();
        assert_eq!(pos(&ed), Position::new(1, 1));

        assert!(matches!(
            run(&mut ed, "goto-char", None, &["six"]),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(run(&mut ed, "goto-line", None, &[]).is_err());
    }

    #[test]
    fn test_beginning_and_end_of_buffer_push_mark() {
        let mut ed = Editor::with_text("t", "ab\ncd");
        ed.current_mut().goto_point(Position::new(0, 1));

        run(&mut ed, "end-of-buffer", None, &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(1, 2));
        assert_eq!(ed.current().mark_point().unwrap().position(), Position::new(0, 1));

        run(&mut ed, "beginning-of-buffer", None, &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(0, 0));
        assert_eq!(ed.mark_ring().len(), 2);
    }

    #[test]
    fn test_word_motion_commands() {
        let mut ed = Editor::with_text("t", "one two\nthree");

        run(&mut ed, "forward-word", Some(2), &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(0, 7));
        run(&mut ed, "backward-word", None, &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(0, 4));
        run(&mut ed, "backward-word", Some(-2), &[]).unwrap();
        assert_eq!(pos(&ed), Position::new(1, 5));

        let err = run(&mut ed, "forward-word", None, &[]).unwrap_err();
        assert_eq!(err.as_buffer_error(), Some(&BufferError::EndOfBuffer));
    }

    #[test]
    fn test_mark_word_then_kill_region() {
        let mut ed = Editor::with_text("t", "one two three");
        run(&mut ed, "mark-word", Some(2), &[]).unwrap();
        run(&mut ed, "kill-region", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), " three");
    }

    #[test]
    fn test_indentation_commands() {
        let mut ed = Editor::with_text("t", "    if x");
        run(&mut ed, "set-variable", None, &["indent-tabs-mode", "nil"]).unwrap();
        run(&mut ed, "set-variable", None, &["tab-always-indent", "nil"]).unwrap();
        ed.current_mut().end_of_line();

        run(&mut ed, "newline-and-indent", None, &[]).unwrap();
        assert_eq!(ed.current().line_texts(), vec!["    if x", "    "]);

        run(&mut ed, "indent-relative", None, &[]).unwrap();
        assert_eq!(ed.current().line_texts()[1], "       ");

        run(&mut ed, "undo", None, &[]).unwrap();
        run(&mut ed, "undo", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "    if x");

        run(&mut ed, "set-variable", None, &["tab-always-indent", "t"]).unwrap();
        ed.current_mut().beginning_of_line();
        run(&mut ed, "indent-for-tab-command", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "            if x");
    }

    #[test]
    fn test_insert_and_self_insert() {
        let mut ed = Editor::with_text("t", "");
        run(&mut ed, "insert", None, &["hello", "world"]).unwrap();
        run(&mut ed, "self-insert", Some(3), &["!"]).unwrap();
        run(&mut ed, "self-insert", None, &["RET"]).unwrap();
        run(&mut ed, "self-insert", None, &["SPC"]).unwrap();
        assert_eq!(ed.current().contents(), "hello world!!!\n ");

        run(&mut ed, "undo", None, &[]).unwrap();
        run(&mut ed, "undo", None, &[]).unwrap();
        run(&mut ed, "undo", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "hello world");
    }

    #[test]
    fn test_newline_and_open_line() {
        let mut ed = Editor::with_text("t", "abcd");
        ed.current_mut().goto_point(Position::new(0, 2));

        run(&mut ed, "open-line", Some(2), &[]).unwrap();
        assert_eq!(ed.current().line_texts(), vec!["ab", "", "cd"]);
        assert_eq!(pos(&ed), Position::new(0, 2));

        run(&mut ed, "newline", None, &[]).unwrap();
        assert_eq!(ed.current().line_texts(), vec!["ab", "", "", "cd"]);
        assert_eq!(pos(&ed), Position::new(1, 0));

        run(&mut ed, "undo", None, &[]).unwrap();
        run(&mut ed, "undo", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "abcd");
    }

    #[test]
    fn test_delete_char_counts() {
        let mut ed = Editor::with_text("t", "abcdef");
        ed.current_mut().goto_point(Position::new(0, 3));

        run(&mut ed, "delete-char", Some(2), &[]).unwrap();
        assert_eq!(ed.current().contents(), "abcf");
        run(&mut ed, "delete-char", Some(-2), &[]).unwrap();
        assert_eq!(ed.current().contents(), "af");
        run(&mut ed, "backward-delete-char", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "f");

        let err = run(&mut ed, "backward-delete-char", None, &[]).unwrap_err();
        assert_eq!(err.as_buffer_error(), Some(&BufferError::BeginningOfBuffer));
    }

    #[test]
    fn test_whitespace_commands() {
        let mut ed = Editor::with_text("t", "a  \t b");
        ed.current_mut().goto_point(Position::new(0, 3));

        run(&mut ed, "just-one-space", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "a b");
        run(&mut ed, "delete-horizontal-space", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "ab");
    }

    #[test]
    fn test_tab_to_tab_stop() {
        let mut ed = Editor::with_text("t", "ab");
        ed.current_mut().goto_point(Position::new(0, 2));
        run(&mut ed, "set-variable", None, &["indent-tabs-mode", "nil"]).unwrap();
        run(&mut ed, "set-variable", None, &["tab-width", "4"]).unwrap();

        run(&mut ed, "tab-to-tab-stop", Some(2), &[]).unwrap();
        assert_eq!(ed.current().contents(), "ab      ");
    }

    #[test]
    fn test_mode_toggles() {
        let mut ed = Editor::with_text("t", "abc");

        run(&mut ed, "toggle-read-only", None, &[]).unwrap();
        assert!(ed.current().is_readonly());
        let err = run(&mut ed, "insert", None, &["x"]).unwrap_err();
        assert!(matches!(err.as_buffer_error(), Some(BufferError::ReadOnly { .. })));
        run(&mut ed, "toggle-read-only", None, &[]).unwrap();

        run(&mut ed, "overwrite-mode", None, &[]).unwrap();
        run(&mut ed, "self-insert", None, &["X"]).unwrap();
        assert_eq!(ed.current().contents(), "Xbc");

        run(&mut ed, "overwrite-mode", Some(0), &[]).unwrap();
        assert!(!ed.current().flags().overwrite);

        run(&mut ed, "auto-fill-mode", Some(1), &[]).unwrap();
        assert!(ed.current().flags().autofill);
    }

    #[test]
    fn test_auto_fill_breaks_long_lines() {
        let mut ed = Editor::with_text("t", "");
        run(&mut ed, "set-variable", None, &[FILL_COLUMN, "10"]).unwrap();
        run(&mut ed, "auto-fill-mode", None, &[]).unwrap();

        run(&mut ed, "insert", None, &["aaaa bbbb cccc"]).unwrap();
        run(&mut ed, "self-insert", None, &["SPC"]).unwrap();
        assert_eq!(ed.current().line_texts(), vec!["aaaa bbbb", "cccc "]);
    }

    #[test]
    fn test_set_variable_usage() {
        let mut ed = Editor::new();
        assert!(matches!(
            run(&mut ed, "set-variable", None, &["fill-column"]),
            Err(CoreError::InvalidArgument(_))
        ));

        run(&mut ed, "set-variable", None, &["case-replace", "nil"]).unwrap();
        assert_eq!(ed.globals().get("case-replace"), Some("nil"));
    }

    #[test]
    fn test_switch_and_kill_buffer_commands() {
        let mut ed = Editor::new();
        run(&mut ed, "switch-to-buffer", None, &["notes"]).unwrap();
        assert_eq!(ed.current().name(), "notes");
        run(&mut ed, "insert", None, &["text"]).unwrap();

        run(&mut ed, "switch-to-buffer", None, &["*scratch*"]).unwrap();
        run(&mut ed, "switch-to-buffer", None, &[]).unwrap();
        assert_eq!(ed.current().name(), "notes");
        assert_eq!(ed.current().contents(), "text");

        run(&mut ed, "kill-buffer", None, &[]).unwrap();
        assert_eq!(ed.list_buffers(), vec!["*scratch*"]);

        assert!(matches!(
            run(&mut ed, "kill-buffer", None, &["notes"]),
            Err(CoreError::BufferNotFound(_))
        ));
    }

    #[test]
    fn test_undo_of_undo_redoes() {
        let mut ed = Editor::with_text("t", "");
        run(&mut ed, "insert", None, &["one"]).unwrap();
        run(&mut ed, "insert", None, &["two"]).unwrap();

        run(&mut ed, "undo", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "one");
        run(&mut ed, "undo", None, &[]).unwrap();
        assert_eq!(ed.current().contents(), "");

        run(&mut ed, "forward-char", Some(0), &[]).unwrap();
        run(&mut ed, "undo", Some(2), &[]).unwrap();
        assert_eq!(ed.current().contents(), "onetwo");
    }
}
