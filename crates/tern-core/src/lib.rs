//! # Tern Core
//!
//! The editing session: the buffer list, the kill and mark rings, editor
//! variables and the named commands that drive them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Editor                             │
//! │  ┌─────────────┐ ┌─────────────┐ ┌──────────────────────┐ │
//! │  │   Config    │ │  Globals    │ │  Command Registry    │ │
//! │  └─────────────┘ └─────────────┘ └──────────────────────┘ │
//! │  ┌─────────────┐ ┌─────────────┐                          │
//! │  │  Kill Ring  │ │  Mark Ring  │                          │
//! │  └─────────────┘ └─────────────┘                          │
//! │         │                                                 │
//! │  ┌──────┴───────────────────────────────────┐             │
//! │  │               Buffer List                 │             │
//! │  │  ┌─────────┐ ┌─────────┐ ┌───────────┐    │             │
//! │  │  │  Buf 1  │ │  Buf 2  │ │ *scratch* │    │             │
//! │  │  └─────────┘ └─────────┘ └───────────┘    │             │
//! │  └───────────────────────────────────────────┘             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs
//! - `impl Editor` blocks may live in several modules; each one adds the
//!   methods for its own concern (kill ring, mark ring)

pub mod buffers;
pub mod command;
pub mod commands;
pub mod config;
pub mod editor;
pub mod killring;
pub mod mark;

pub use buffers::{BufferId, BufferList};
pub use command::{
    CommandContext, CommandFn, CommandHandler, CommandRegistry, FnCommand, execute_with_uniarg,
};
pub use config::{Config, ConfigError};
pub use editor::Editor;
pub use killring::KillRing;
pub use mark::MarkRing;

use tern_buffer::BufferError;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Buffer `{0}' not found")]
    BufferNotFound(String),

    #[error("Buffer handle is stale")]
    StaleBuffer,

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// The underlying buffer error, if this is one.
    pub fn as_buffer_error(&self) -> Option<&BufferError> {
        match self {
            CoreError::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_errors_pass_through() {
        let err: CoreError = BufferError::EndOfBuffer.into();
        assert_eq!(err.to_string(), "End of buffer");
        assert_eq!(err.as_buffer_error(), Some(&BufferError::EndOfBuffer));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::BufferNotFound("notes".into()).to_string(),
            "Buffer `notes' not found"
        );
        assert!(CoreError::StaleBuffer.as_buffer_error().is_none());
    }
}
