//! # Tern Buffer
//!
//! The editing core: a circular list of lines, a point and markers that
//! follow the text as it changes, and an undo log.
//!
//! ## Key Concepts for Learning Rust
//!
//! ### Indices Instead of Pointers
//! - Lines link to each other through generational arena indices
//! - A `Point` names its line by `LineId`; it never owns the line
//! - A stale `LineId` panics on use, exactly like an out-of-range slice
//!   index, instead of reading freed memory
//!
//! ### One Owner
//! - `Buffer` owns its lines, its markers and its undo log
//! - Every mutation takes `&mut Buffer`, so no marker can be observed
//!   half-adjusted
//!
//! ### Explicit Context
//! - Behaviour that depends on editor variables takes the session's
//!   global `VarTable`; buffer-local overrides live on the buffer

mod arena;
mod buffer;
mod edit;
mod line;
mod marker;
mod motion;
mod point;
mod region;
mod undo;
pub mod vars;

pub use arena::{Arena, ArenaIndex};
pub use buffer::{Buffer, BufferFlags, LineEnding};
pub use edit::{Case, Direction, check_case, recase};
pub use line::{Line, LineId, LineList, Lines};
pub use marker::{Marker, MarkerId, MarkerTable};
pub use motion::{advance_column, is_word_char};
pub use point::{Point, Position, cmp_point};
pub use region::Region;
pub use undo::{UndoDelta, UndoKind, UndoLog};
pub use vars::{Scope, VarTable};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("End of buffer")]
    EndOfBuffer,

    #[error("Beginning of buffer")]
    BeginningOfBuffer,

    #[error("Buffer is readonly: {name}")]
    ReadOnly { name: String },

    #[error("The mark is not set now")]
    NoMark,

    #[error("The mark is not active now")]
    MarkInactive,

    #[error("No further undo information")]
    NoFurtherUndo,

    #[error("Undo disabled in this buffer")]
    UndoDisabled,

    #[error("Line {line} is out of range (last line is {last})")]
    LineOutOfRange { line: usize, last: usize },

    #[error("Kill ring is empty")]
    KillRingEmpty,
}
