pub mod input;
pub mod key_sequence;

mod editor;
mod editor_view;
mod grid;
mod grid_view;
mod highlight;
mod host_form;
mod list;
mod list_view;
mod status_line;

pub use editor::{EditorAction, QueryEditor};
pub use editor_view::EditorView;
pub use grid::{display_cell, DataGrid, GridAction, GridError};
pub use grid_view::{fit_to_width, GridView};
pub use highlight::{HighlightError, SqlHighlighter};
pub use host_form::{FormField, HostForm, HostFormAction};
pub use input::{Input, InputEvent, Key, Pointer, PointerKind};
pub use key_sequence::{KeySequenceHandler, PendingKeys, SequenceStep};
pub use list::{filter_matches, ListAction, ListItem, SelectableList};
pub use list_view::ListView;
pub use status_line::{Priority, StatusLine, StatusMessage, StatusSegment};
