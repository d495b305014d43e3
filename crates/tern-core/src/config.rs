//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[serde(default)]` fills missing fields from `Default::default()`, so a
//! config file only needs the settings it changes:
//!
//! ```toml
//! [editor]
//! fill_column = 72
//!
//! [variables]
//! kill-whole-line = "t"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tern_buffer::vars::{
    AUTO_FILL_MODE, CASE_REPLACE, FILL_COLUMN, INDENT_TABS_MODE, KILL_WHOLE_LINE,
    TAB_ALWAYS_INDENT, TAB_WIDTH, TRANSIENT_MARK_MODE,
};
use tern_buffer::{LineEnding, VarTable};

/// Main editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing behaviour
    pub editor: EditorConfig,

    /// File handling settings
    pub files: FileConfig,

    /// Free-form variable overrides, applied last
    pub variables: BTreeMap<String, String>,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parses config from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tern").join("config.toml"))
    }

    /// Saves the config to a file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The global variable table every buffer falls back to.
    pub fn variables(&self) -> VarTable {
        let e = &self.editor;
        let mut vars: VarTable = [
            (TAB_WIDTH, e.tab_width.to_string()),
            (FILL_COLUMN, e.fill_column.to_string()),
            (CASE_REPLACE, lisp_bool(e.case_replace)),
            (KILL_WHOLE_LINE, lisp_bool(e.kill_whole_line)),
            (AUTO_FILL_MODE, lisp_bool(e.auto_fill_mode)),
            (TRANSIENT_MARK_MODE, lisp_bool(e.transient_mark_mode)),
            (INDENT_TABS_MODE, lisp_bool(e.indent_tabs_mode)),
            (TAB_ALWAYS_INDENT, lisp_bool(e.tab_always_indent)),
        ]
        .into_iter()
        .collect();

        for (name, value) in &self.variables {
            vars.set(name.as_str(), value.as_str());
        }
        vars
    }
}

fn lisp_bool(b: bool) -> String {
    String::from(if b { "t" } else { "nil" })
}

/// Editing behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Columns per tab stop
    pub tab_width: usize,

    /// Column beyond which Auto Fill mode breaks lines
    pub fill_column: usize,

    /// Re-case replacement text to match what it replaces
    pub case_replace: bool,

    /// `kill-line` at the start of a line also kills the newline
    pub kill_whole_line: bool,

    /// New buffers start in Auto Fill mode
    pub auto_fill_mode: bool,

    /// Region commands need an active mark
    pub transient_mark_mode: bool,

    /// Indentation may use TAB characters
    pub indent_tabs_mode: bool,

    /// TAB always inserts a tab instead of indenting relative to the
    /// previous line
    pub tab_always_indent: bool,

    /// Record undo information in new buffers
    pub undo_enabled: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 8,
            fill_column: 70,
            case_replace: true,
            kill_whole_line: false,
            auto_fill_mode: false,
            transient_mark_mode: true,
            indent_tabs_mode: true,
            tab_always_indent: true,
            undo_enabled: true,
        }
    }
}

/// File handling configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Line ending for new buffers
    pub line_ending: LineEnding,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
