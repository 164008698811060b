//! Editing modes of the query editor.

use ratatui::style::Color;

/// The current editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VimMode {
    /// Navigation and commands.
    #[default]
    Normal,
    /// Text input.
    Insert,
    /// Character-wise selection.
    Visual,
}

impl VimMode {
    pub fn is_insert(&self) -> bool {
        matches!(self, VimMode::Insert)
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, VimMode::Normal)
    }

    pub fn is_visual(&self) -> bool {
        matches!(self, VimMode::Visual)
    }

    /// Mode name shown in the editor title.
    pub fn label(&self) -> &'static str {
        match self {
            VimMode::Normal => "Normal",
            VimMode::Insert => "Insert",
            VimMode::Visual => "Visual",
        }
    }

    /// Short key reminder shown next to the mode name.
    pub fn hint(&self) -> &'static str {
        match self {
            VimMode::Normal => "i insert, v visual, Enter run, u/Ctrl-r undo/redo",
            VimMode::Insert => "Esc to normal, Ctrl-w delete word",
            VimMode::Visual => "x cut, c change, y yank, Esc cancel",
        }
    }

    /// Border color of the focused editor in this mode.
    pub fn border_color(&self) -> Color {
        match self {
            VimMode::Normal => Color::Cyan,
            VimMode::Insert => Color::Green,
            VimMode::Visual => Color::Yellow,
        }
    }
}
