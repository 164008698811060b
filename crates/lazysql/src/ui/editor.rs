//! Modal query editor.
//!
//! The buffer is a vector of chars and the cursor is a char offset in
//! `0..=len`. Keys are interpreted according to [`VimMode`]; effects the
//! host must act on (running the query, copying text, moving focus) are
//! returned as [`EditorAction`] values.
//!
//! Undo history is linear. Each Insert session is a single undo step,
//! committed when Insert mode is left (Esc or focus loss). Every other
//! mutation records the pre-mutation state immediately.

use std::ops::Range;
use std::time::Duration;

use crate::ui::input::{Input, InputEvent, Key, PointerKind};
use crate::ui::key_sequence::{KeySequenceHandler, SequenceStep, DEFAULT_SEQUENCE_TIMEOUT};
use crate::vim::{motion, EditorCommand, Motion, VimMode, EDITOR_SEQUENCES};

/// What the host should do after the editor handled an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    None,
    /// Run the buffer as a query (Enter in Normal mode).
    Execute(String),
    /// Put the text on the clipboard (Visual `y` and `x`).
    Yank(String),
    /// Esc in Normal mode with nothing pending: move focus elsewhere.
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    buffer: Vec<char>,
    cursor: usize,
}

pub struct QueryEditor {
    buffer: Vec<char>,
    cursor: usize,
    mode: VimMode,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    visual_anchor: usize,
    visual_start: usize,
    visual_end: usize,
    /// State at the start of the current Insert session.
    insert_origin: Option<Snapshot>,
    /// Column kept across consecutive vertical moves.
    preferred_col: Option<usize>,
    sequences: KeySequenceHandler<EditorCommand>,
    tab_size: usize,
    scroll_top: usize,
}

impl Default for QueryEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEditor {
    pub fn new() -> Self {
        Self::with_settings(4, DEFAULT_SEQUENCE_TIMEOUT)
    }

    pub fn with_settings(tab_size: usize, sequence_timeout: Duration) -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            mode: VimMode::Normal,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            visual_anchor: 0,
            visual_start: 0,
            visual_end: 0,
            insert_origin: None,
            preferred_col: None,
            sequences: KeySequenceHandler::new(EDITOR_SEQUENCES, sequence_timeout),
            tab_size,
            scroll_top: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // State accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> VimMode {
        self.mode
    }

    /// Zero-based `(line, column)` of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        motion::line_col(&self.buffer, self.cursor)
    }

    /// Raw `(start, end)` of the Visual selection. `end` may be one past the
    /// buffer when the cursor sits at the end.
    pub fn visual_range(&self) -> Option<(usize, usize)> {
        self.mode
            .is_visual()
            .then_some((self.visual_start, self.visual_end))
    }

    /// The Visual selection clamped to the buffer.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.visual_range().map(|(start, end)| {
            let len = self.buffer.len();
            start.min(len)..end.min(len)
        })
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection()
            .map(|range| self.buffer[range].iter().collect())
    }

    /// Keys typed so far in an unfinished multi-key command.
    pub fn pending_keys(&self) -> &str {
        self.sequences.pending()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.insert_changed()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// First visible line, maintained by [`QueryEditor::scroll_to_cursor`].
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    // ─────────────────────────────────────────────────────────────────────
    // Host operations
    // ─────────────────────────────────────────────────────────────────────

    /// Loads a fresh buffer. Undo and redo history are discarded.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.chars().collect();
        self.cursor = self.buffer.len();
        self.mode = VimMode::Normal;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.insert_origin = None;
        self.preferred_col = None;
        self.sequences.cancel();
        self.scroll_top = 0;
    }

    /// Focus moved away: back to Normal, committing any Insert session.
    pub fn blur(&mut self) {
        self.sequences.cancel();
        match self.mode {
            VimMode::Insert => self.leave_insert(),
            VimMode::Visual => self.mode = VimMode::Normal,
            VimMode::Normal => {}
        }
    }

    pub fn undo(&mut self) {
        self.settle_for_history();
        if let Some(prev) = self.undo_stack.pop() {
            let current = self.snapshot();
            self.redo_stack.push(current);
            self.restore(prev);
        }
    }

    pub fn redo(&mut self) {
        self.settle_for_history();
        if let Some(next) = self.redo_stack.pop() {
            let current = self.snapshot();
            self.undo_stack.push(current);
            self.restore(next);
        }
    }

    /// Moves the cursor to a clicked `(line, column)`, clamped to the text.
    pub fn click(&mut self, line: usize, col: usize) {
        self.sequences.cancel();
        self.preferred_col = None;
        self.cursor = motion::offset_at(&self.buffer, line, col);
        if self.mode.is_visual() {
            self.update_selection();
        }
    }

    /// Adjusts the first visible line so the cursor line fits in `height` lines.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        let (line, _) = self.cursor_line_col();
        if line < self.scroll_top {
            self.scroll_top = line;
        } else if line >= self.scroll_top + height {
            self.scroll_top = line + 1 - height;
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> EditorAction {
        let key = match event.input {
            Input::Key(key) => key,
            Input::Pointer(pointer) => {
                match pointer.kind {
                    PointerKind::ScrollUp => self.apply_motion(Motion::Up),
                    PointerKind::ScrollDown => self.apply_motion(Motion::Down),
                    // Clicks need layout information; the host calls `click`.
                    PointerKind::Click => {}
                }
                return EditorAction::None;
            }
        };

        match self.mode {
            VimMode::Normal => self.handle_normal(key, event),
            VimMode::Insert => {
                self.handle_insert(key);
                EditorAction::None
            }
            VimMode::Visual => self.handle_visual(key),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Normal mode
    // ─────────────────────────────────────────────────────────────────────

    fn handle_normal(&mut self, key: Key, event: &InputEvent) -> EditorAction {
        if let Key::Char(c) = key {
            match self.sequences.feed(c, event.at) {
                SequenceStep::Matched(cmd) => {
                    self.run_command(cmd);
                    return EditorAction::None;
                }
                SequenceStep::Pending | SequenceStep::Rejected => return EditorAction::None,
                SequenceStep::Unhandled => {}
            }
        } else if self.sequences.has_pending() {
            self.sequences.cancel();
            if key == Key::Esc {
                return EditorAction::None;
            }
        }

        match key {
            Key::Enter => return EditorAction::Execute(self.text()),
            Key::Esc => return EditorAction::Leave,
            Key::Char('i') => self.begin_insert(),
            Key::Char('I') => {
                self.cursor = motion::line_start(&self.buffer, self.cursor);
                self.begin_insert();
            }
            Key::Char('a') => {
                self.cursor = (self.cursor + 1).min(self.buffer.len());
                self.begin_insert();
            }
            Key::Char('A') => {
                self.cursor = motion::line_end(&self.buffer, self.cursor);
                self.begin_insert();
            }
            Key::Char('o') => self.open_line_below(),
            Key::Char('v') => self.enter_visual(),
            Key::Char('x') | Key::Delete => {
                if self.cursor < self.buffer.len() {
                    self.delete_range(self.cursor..self.cursor + 1);
                }
            }
            Key::Char('u') => self.undo(),
            Key::Ctrl('r') => self.redo(),
            other => {
                if let Some(m) = motion_for(other, true) {
                    self.apply_motion(m);
                }
            }
        }

        EditorAction::None
    }

    fn run_command(&mut self, cmd: EditorCommand) {
        match cmd {
            EditorCommand::DeleteLine => self.delete_line(),
            EditorCommand::ChangeLine => {
                let start = motion::line_start(&self.buffer, self.cursor);
                let end = motion::line_end(&self.buffer, self.cursor);
                self.delete_range(start..end);
                self.cursor = start;
                self.begin_insert();
            }
            EditorCommand::ChangeInnerWord => {
                let range = motion::word_range(&self.buffer, self.cursor);
                let start = range.start;
                self.delete_range(range);
                self.cursor = start;
                self.begin_insert();
            }
            EditorCommand::ReselectVisual => self.enter_visual(),
        }
    }

    /// Removes the cursor line with its trailing newline. On the last line
    /// the preceding newline stays, leaving an empty last line.
    fn delete_line(&mut self) {
        let start = motion::line_start(&self.buffer, self.cursor);
        let end = motion::line_end(&self.buffer, self.cursor);
        let end = if end < self.buffer.len() { end + 1 } else { end };
        self.delete_range(start..end);
        self.cursor = start.min(self.buffer.len());
    }

    fn open_line_below(&mut self) {
        let origin = self.snapshot();
        let end = motion::line_end(&self.buffer, self.cursor);
        self.buffer.insert(end, '\n');
        self.cursor = end + 1;
        self.mode = VimMode::Insert;
        self.preferred_col = None;
        self.insert_origin = Some(origin);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Insert mode
    // ─────────────────────────────────────────────────────────────────────

    fn begin_insert(&mut self) {
        self.insert_origin = Some(self.snapshot());
        self.mode = VimMode::Insert;
        self.preferred_col = None;
    }

    fn leave_insert(&mut self) {
        self.mode = VimMode::Normal;
        self.commit_insert();
    }

    fn commit_insert(&mut self) {
        if let Some(origin) = self.insert_origin.take() {
            if origin.buffer != self.buffer {
                self.undo_stack.push(origin);
                self.redo_stack.clear();
            }
        }
    }

    fn insert_changed(&self) -> bool {
        self.insert_origin
            .as_ref()
            .is_some_and(|origin| origin.buffer != self.buffer)
    }

    fn handle_insert(&mut self, key: Key) {
        match key {
            Key::Esc => self.leave_insert(),
            Key::Char(c) => self.insert_char(c),
            Key::Enter => self.insert_char('\n'),
            Key::Tab => {
                for _ in 0..self.tab_size.max(1) {
                    self.insert_char(' ');
                }
            }
            Key::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.buffer.remove(self.cursor);
                    self.preferred_col = None;
                }
            }
            Key::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                    self.preferred_col = None;
                }
            }
            Key::Ctrl('w') => {
                let start = motion::prev_word_start(&self.buffer, self.cursor);
                self.buffer.drain(start..self.cursor);
                self.cursor = start;
                self.preferred_col = None;
            }
            other => {
                if let Some(m) = motion_for(other, false) {
                    self.apply_motion(m);
                }
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
        self.preferred_col = None;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Visual mode
    // ─────────────────────────────────────────────────────────────────────

    fn enter_visual(&mut self) {
        self.mode = VimMode::Visual;
        self.preferred_col = None;
        self.visual_anchor = self.cursor;
        self.visual_start = self.cursor;
        self.visual_end = self.cursor + 1;
    }

    fn update_selection(&mut self) {
        self.visual_start = self.visual_anchor.min(self.cursor);
        self.visual_end = self.visual_anchor.max(self.cursor) + 1;
    }

    fn handle_visual(&mut self, key: Key) -> EditorAction {
        match key {
            Key::Esc => self.mode = VimMode::Normal,
            Key::Char('x') | Key::Delete => {
                let range = self.selection().unwrap_or(self.cursor..self.cursor);
                let start = range.start;
                let cut = self.delete_range(range);
                self.cursor = start;
                self.mode = VimMode::Normal;
                if !cut.is_empty() {
                    return EditorAction::Yank(cut);
                }
            }
            Key::Char('c') => {
                let range = self.selection().unwrap_or(self.cursor..self.cursor);
                let start = range.start;
                self.delete_range(range);
                self.cursor = start;
                self.begin_insert();
            }
            Key::Char('y') => {
                let text = self.selected_text().unwrap_or_default();
                self.cursor = self.visual_start.min(self.buffer.len());
                self.mode = VimMode::Normal;
                if !text.is_empty() {
                    return EditorAction::Yank(text);
                }
            }
            other => {
                if let Some(m) = motion_for(other, true) {
                    self.apply_motion(m);
                }
            }
        }
        EditorAction::None
    }

    // ─────────────────────────────────────────────────────────────────────
    // Shared helpers
    // ─────────────────────────────────────────────────────────────────────

    fn apply_motion(&mut self, m: Motion) {
        let len = self.buffer.len();
        let target = match m {
            Motion::Left => self.cursor.saturating_sub(1),
            Motion::Right => (self.cursor + 1).min(len),
            Motion::Up | Motion::Down => self.vertical_target(m),
            Motion::WordForward => motion::next_word_start(&self.buffer, self.cursor),
            Motion::WordBack => motion::prev_word_start(&self.buffer, self.cursor),
            Motion::WordEnd => motion::next_word_end(&self.buffer, self.cursor),
            Motion::LineStart => motion::line_start(&self.buffer, self.cursor),
            Motion::LineEnd => motion::line_end(&self.buffer, self.cursor),
        };
        if !m.is_vertical() {
            self.preferred_col = None;
        }
        self.cursor = target.min(len);
        if self.mode.is_visual() {
            self.update_selection();
        }
    }

    fn vertical_target(&mut self, m: Motion) -> usize {
        let (line, col) = self.cursor_line_col();
        let col = *self.preferred_col.get_or_insert(col);
        let target_line = match m {
            Motion::Up if line > 0 => line - 1,
            Motion::Down if line + 1 < motion::line_count(&self.buffer) => line + 1,
            _ => return self.cursor,
        };
        motion::offset_at(&self.buffer, target_line, col)
    }

    /// Deletes `range`, recording an undo step when something was removed.
    /// Inside an Insert session the session snapshot covers the change.
    fn delete_range(&mut self, range: Range<usize>) -> String {
        let len = self.buffer.len();
        let range = range.start.min(len)..range.end.min(len);
        if range.is_empty() {
            return String::new();
        }
        if self.insert_origin.is_none() {
            self.push_undo();
        }
        self.preferred_col = None;
        let removed: String = self.buffer.drain(range.clone()).collect();
        if self.cursor > range.start {
            self.cursor = self.cursor.saturating_sub(range.len()).max(range.start);
        }
        removed
    }

    fn push_undo(&mut self) {
        let current = self.snapshot();
        self.undo_stack.push(current);
        self.redo_stack.clear();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            buffer: self.buffer.clone(),
            cursor: self.cursor,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.buffer = snapshot.buffer;
        self.cursor = snapshot.cursor.min(self.buffer.len());
        self.preferred_col = None;
    }

    /// Undo/redo only operate on Normal mode state.
    fn settle_for_history(&mut self) {
        self.sequences.cancel();
        match self.mode {
            VimMode::Insert => self.leave_insert(),
            VimMode::Visual => self.mode = VimMode::Normal,
            VimMode::Normal => {}
        }
    }
}

/// Maps a key to a motion. Letter motions only apply outside Insert mode.
fn motion_for(key: Key, letters: bool) -> Option<Motion> {
    match key {
        Key::Left => Some(Motion::Left),
        Key::Right => Some(Motion::Right),
        Key::ShiftLeft => Some(Motion::WordBack),
        Key::ShiftRight => Some(Motion::WordForward),
        Key::Up => Some(Motion::Up),
        Key::Down => Some(Motion::Down),
        Key::Home => Some(Motion::LineStart),
        Key::End => Some(Motion::LineEnd),
        Key::Backspace if letters => Some(Motion::Left),
        Key::Char(c) if letters => Motion::from_char(c),
        _ => None,
    }
}
