//! Vim-style editing primitives for the query editor.
//!
//! # Architecture
//!
//! - `VimMode`: the current editing mode (Normal, Insert, Visual)
//! - `Motion` / `EditorCommand`: what a key or key sequence asks for
//! - `motion`: pure boundary scans over the editor buffer
//!
//! The editor itself lives in `ui::editor` and owns the buffer these
//! functions operate on.

mod command;
mod mode;
pub mod motion;

pub use command::{EditorCommand, Motion, EDITOR_SEQUENCES};
pub use mode::VimMode;
