//! Backend-independent input events consumed by the editor, lists and grid.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

/// A named key or a typed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// A control-letter combination, always lowercase.
    Ctrl(char),
    Up,
    Down,
    Left,
    Right,
    /// Shift-Left, a word motion in the editor.
    ShiftLeft,
    ShiftRight,
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    BackTab,
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Click,
    ScrollUp,
    ScrollDown,
}

/// A mouse event at terminal cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    pub kind: PointerKind,
    pub column: u16,
    pub row: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(Key),
    Pointer(Pointer),
}

/// An input together with the time it was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub input: Input,
    pub at: Instant,
}

impl InputEvent {
    pub fn key(key: Key, at: Instant) -> Self {
        Self {
            input: Input::Key(key),
            at,
        }
    }

    pub fn char(c: char, at: Instant) -> Self {
        Self::key(Key::Char(c), at)
    }

    pub fn pointer(kind: PointerKind, column: u16, row: u16, at: Instant) -> Self {
        Self {
            input: Input::Pointer(Pointer { kind, column, row }),
            at,
        }
    }

    pub fn as_key(&self) -> Option<Key> {
        match self.input {
            Input::Key(key) => Some(key),
            Input::Pointer(_) => None,
        }
    }

    /// Converts a crossterm key event. Returns `None` for keys no component
    /// uses, including Alt combinations.
    pub fn from_key_event(key: KeyEvent, at: Instant) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::ALT) {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let key = match key.code {
            KeyCode::Char(c) if ctrl => Key::Ctrl(c.to_ascii_lowercase()),
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left if shift => Key::ShiftLeft,
            KeyCode::Right if shift => Key::ShiftRight,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            _ => return None,
        };
        Some(Self::key(key, at))
    }

    /// Converts a crossterm mouse event. Only left clicks and wheel moves are kept.
    pub fn from_mouse_event(mouse: MouseEvent, at: Instant) -> Option<Self> {
        let kind = match mouse.kind {
            MouseEventKind::Down(crossterm::event::MouseButton::Left) => PointerKind::Click,
            MouseEventKind::ScrollUp => PointerKind::ScrollUp,
            MouseEventKind::ScrollDown => PointerKind::ScrollDown,
            _ => return None,
        };
        Some(Self::pointer(kind, mouse.column, mouse.row, at))
    }
}
