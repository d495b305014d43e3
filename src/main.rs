//! # Tern - An Emacs-style editing engine
//!
//! Loads a file into a buffer, replays a script of editing commands
//! against it and writes the result.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print a file back unchanged
//! cargo run -- notes.txt
//!
//! # Replay a script and write the result
//! cargo run -- notes.txt --script edits.tern --output out.txt
//!
//! # Dump the final buffer state, undo log included
//! cargo run -- notes.txt --script edits.tern --json
//! ```
//!
//! A script holds one command per line: `[C-u [N]] name [args...]`. A
//! leading `C-u N` gives the command a numeric argument (`C-u` alone
//! means 4); everything after the name is passed as arguments. Blank
//! lines and lines starting with `#` are skipped.
//!
//! ```text
//! # swap the first two lines
//! C-u 1 kill-line
//! next-line
//! yank
//! ```

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tern_buffer::{Buffer, Position, UndoDelta};
use tern_core::{Config, Editor};

/// Tern - replay editing commands against a text buffer
#[derive(Parser, Debug)]
#[command(name = "tern")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to edit
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Script of commands to run
    #[arg(short, long, value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Open the file read-only
    #[arg(short, long)]
    readonly: bool,

    /// Print the final buffer state as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScriptLine {
    name: String,
    arg: Option<i64>,
    args: Vec<String>,
}

/// The final state of a buffer, for `--json`.
#[derive(Serialize)]
struct Snapshot<'a> {
    buffer: &'a str,
    text: String,
    point: Position,
    modified: bool,
    undo: &'a [UndoDelta],
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("Starting Tern v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load(),
    };
    let mut editor = Editor::with_config(config);

    if let Some(path) = &args.file {
        open_file(&mut editor, path, args.readonly)?;
    }

    if let Some(path) = &args.script {
        let script = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let failed = run_script(&mut editor, &script);
        if failed > 0 {
            tracing::warn!(failed, "some commands failed");
        }
    }

    let rendered = if args.json {
        serde_json::to_string_pretty(&snapshot(editor.current()))?
    } else {
        buffer_text(editor.current())
    };

    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{rendered}"),
    }

    for name in editor.unsaved_buffers() {
        tracing::info!(buffer = name, "buffer left modified");
    }
    Ok(())
}

/// Logs to stderr so the buffer text owns stdout. `RUST_LOG` overrides
/// the verbosity flags.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();
}

/// Loads `path` into a new current buffer. A missing file gives an empty
/// buffer that will be written there.
fn open_file(editor: &mut Editor, path: &Path, readonly: bool) -> anyhow::Result<()> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "new file");
            String::new()
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let id = editor.create_buffer_from_text(&name, &text);
    editor.switch_to_buffer(id)?;

    let bp = editor.current_mut();
    bp.set_filename(Some(path.to_path_buf()));
    bp.set_readonly(readonly);
    Ok(())
}

/// The prefix that introduces a numeric argument.
const UNIVERSAL_ARGUMENT: &str = "C-u";

/// Parses `[C-u [N]] name [args...]`. Returns `Ok(None)` for blank and
/// comment lines.
fn parse_line(line: &str) -> anyhow::Result<Option<ScriptLine>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace().peekable();
    let mut arg = None;
    if words.next_if_eq(&UNIVERSAL_ARGUMENT).is_some() {
        let n = match words.peek().map(|w| w.parse::<i64>()) {
            Some(Ok(n)) => {
                words.next();
                n
            }
            _ => 4,
        };
        arg = Some(n);
    }

    let name = words
        .next()
        .with_context(|| format!("{UNIVERSAL_ARGUMENT} without a command"))?
        .to_string();

    Ok(Some(ScriptLine {
        name,
        arg,
        args: words.map(str::to_string).collect(),
    }))
}

/// Runs every command in `script`, carrying on past failures. Returns how
/// many commands failed.
fn run_script(editor: &mut Editor, script: &str) -> usize {
    let mut failed = 0;
    for (lineno, line) in script.lines().enumerate() {
        let cmd = match parse_line(line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                tracing::error!(line = lineno + 1, "{:#}", e);
                failed += 1;
                continue;
            }
        };
        if let Err(e) = editor.execute(&cmd.name, cmd.arg, &cmd.args) {
            tracing::error!(line = lineno + 1, command = %cmd.name, "{}", e);
            failed += 1;
        }
    }
    failed
}

/// The buffer's text with its own line endings.
fn buffer_text(bp: &Buffer) -> String {
    bp.line_texts().join(bp.eol().as_str())
}

fn snapshot(bp: &Buffer) -> Snapshot<'_> {
    Snapshot {
        buffer: bp.name(),
        text: bp.contents(),
        point: bp.pt().position(),
        modified: bp.is_modified(),
        undo: bp.undo_log().deltas(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["tern"]);
        assert!(args.file.is_none());
        assert!(!args.readonly);
        assert!(!args.json);
    }

    #[test]
    fn test_args_with_file_and_script() {
        let args = Args::parse_from(["tern", "notes.txt", "-s", "edits.tern", "-o", "out.txt", "-vv"]);
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(args.script, Some(PathBuf::from("edits.tern")));
        assert_eq!(args.output, Some(PathBuf::from("out.txt")));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# comment").unwrap(), None);
        assert_eq!(
            parse_line("C-u 3 forward-char").unwrap(),
            Some(ScriptLine {
                name: "forward-char".into(),
                arg: Some(3),
                args: vec![],
            })
        );
        assert_eq!(
            parse_line("insert hello world").unwrap(),
            Some(ScriptLine {
                name: "insert".into(),
                arg: None,
                args: vec!["hello".into(), "world".into()],
            })
        );
        assert_eq!(parse_line("C-u -1 kill-line").unwrap().unwrap().arg, Some(-1));
        assert_eq!(parse_line("C-u kill-line").unwrap().unwrap().arg, Some(4));
        assert!(parse_line("C-u 2").is_err());
    }

    #[test]
    fn test_numbers_after_the_name_are_arguments() {
        let cmd = parse_line("insert 2024").unwrap().unwrap();
        assert_eq!(cmd.arg, None);
        assert_eq!(cmd.args, vec!["2024".to_string()]);

        let mut editor = Editor::with_text("t", "");
        let failed = run_script(&mut editor, "insert 2024\ngoto-line 1\nC-u 2 insert x y\n");
        assert_eq!(failed, 0);
        assert_eq!(editor.current().contents(), "x y2024");
    }

    #[test]
    fn test_run_script() {
        let mut editor = Editor::with_text("t", "one\ntwo\nthree");
        let script = "\
            # swap the first two lines\n\
            C-u 1 kill-line\n\
            next-line\n\
            yank\n\
            no-such-command\n\
            C-u\n";

        let failed = run_script(&mut editor, script);
        assert_eq!(failed, 2);
        assert_eq!(editor.current().contents(), "two\none\nthree");
    }

    #[test]
    fn test_file_round_trip_keeps_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        std::fs::write(&path, "a\r\nb\r\n").unwrap();

        let mut editor = Editor::new();
        open_file(&mut editor, &path, false).unwrap();
        assert_eq!(editor.current().name(), "dos.txt");
        assert_eq!(editor.current().filename(), Some(path.as_path()));

        run_script(&mut editor, "end-of-line\ninsert !\n");
        assert_eq!(buffer_text(editor.current()), "a!\r\nb\r\n");
    }

    #[test]
    fn test_missing_file_opens_empty_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");

        let mut editor = Editor::new();
        open_file(&mut editor, &path, true).unwrap();
        assert_eq!(editor.current().contents(), "");
        assert!(editor.current().is_readonly());
    }

    #[test]
    fn test_snapshot_json() {
        let mut editor = Editor::with_text("t", "ab");
        run_script(&mut editor, "end-of-line\ninsert c\n");

        let json = serde_json::to_value(snapshot(editor.current())).unwrap();
        assert_eq!(json["text"], "abc");
        assert_eq!(json["modified"], true);
        assert_eq!(json["undo"].as_array().unwrap().len(), 1);
    }
}
