//! textedit - atomic, undoable edit trees for text buffers
//!
//! This crate applies a tree of text edits to a buffer in one step. The tree
//! is checked for structural soundness before anything is touched, applied
//! right to left so pending offsets stay valid, and can hand back an exact
//! undo plus the post-edit region of every edit.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod edit;
pub mod error;
pub mod processor;
pub mod script;
pub mod tracing;
pub mod undo;

// Re-export commonly used types
pub use buffer::{BufferError, RopeBuffer, StringBuffer, TextBuffer, TextBufferMut};
pub use config::EditConfig;
pub use edit::{EditKind, EditPath, EditRange, Region, TextEdit};
pub use error::{ApplyFault, EditError, FaultReason, StructuralFault};
pub use processor::{EditProcessor, EditRoot, EditStyle};
pub use undo::{UndoEdit, UndoStep};
