//! Scrollable result grid.
//!
//! Cells are stored verbatim; only rendering normalizes line breaks. Column
//! widths are uniform and derived from the viewport:
//!
//! ```text
//! width   = max(min_width, (W - gutter - (C - 1)) / C)
//! visible = (W - gutter - (C - 1)) / width
//! ```
//!
//! where `W` is the viewport width, `C` the column count and `gutter` the
//! row-number column plus its separator.

use std::borrow::Cow;
use std::time::Duration;

use thiserror::Error;

use crate::ui::input::{Input, InputEvent, Key, PointerKind};
use crate::ui::key_sequence::{KeySequenceHandler, SequenceStep, DEFAULT_SEQUENCE_TIMEOUT};

/// Digits reserved for row numbers.
pub const ROW_NUMBER_WIDTH: usize = 4;
/// Header line plus the rule under it.
pub const HEADER_ROWS: usize = 2;
pub const MIN_COLUMN_WIDTH: usize = 12;
pub const NEWLINE_MARKER: &str = "⏎";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("row {row} has {found} cells but the result has {expected} columns")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    None,
    /// Raw value of the cell under the cursor.
    CopyCell(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridCommand {
    Top,
}

const GRID_SEQUENCES: &[(&str, GridCommand)] = &[("gg", GridCommand::Top)];

/// Single-line rendering of a cell: carriage returns dropped, newlines
/// replaced by `marker`.
pub fn display_cell<'a>(value: &'a str, marker: &str) -> Cow<'a, str> {
    if !value.contains(['\r', '\n']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.replace('\r', "").replace('\n', marker))
}

pub struct DataGrid {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    cursor_row: usize,
    cursor_col: usize,
    row_offset: usize,
    col_offset: usize,
    viewport_width: usize,
    viewport_height: usize,
    row_number_width: usize,
    min_column_width: usize,
    newline_marker: String,
    loading: bool,
    sequences: KeySequenceHandler<GridCommand>,
}

impl Default for DataGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl DataGrid {
    pub fn new() -> Self {
        Self::with_settings(
            ROW_NUMBER_WIDTH,
            MIN_COLUMN_WIDTH,
            NEWLINE_MARKER,
            DEFAULT_SEQUENCE_TIMEOUT,
        )
    }

    pub fn with_settings(
        row_number_width: usize,
        min_column_width: usize,
        newline_marker: &str,
        sequence_timeout: Duration,
    ) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            cursor_row: 0,
            cursor_col: 0,
            row_offset: 0,
            col_offset: 0,
            viewport_width: 0,
            viewport_height: 0,
            row_number_width,
            min_column_width: min_column_width.max(1),
            newline_marker: newline_marker.to_string(),
            loading: false,
            sequences: KeySequenceHandler::new(GRID_SEQUENCES, sequence_timeout),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────

    /// Replaces the content. Fails without touching the grid if any row
    /// does not have one cell per column.
    pub fn set_content(
        &mut self,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<(), GridError> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.len())
        {
            return Err(GridError::RowLength {
                row,
                expected: columns.len(),
                found: cells.len(),
            });
        }

        self.columns = columns;
        self.rows = rows;
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.row_offset = 0;
        self.col_offset = 0;
        self.loading = false;
        self.sequences.cancel();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.row_offset = 0;
        self.col_offset = 0;
        self.loading = false;
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// `(column, row)` of the cursor.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_col, self.cursor_row)
    }

    /// `(column_offset, row_offset)` of the visible window.
    pub fn offsets(&self) -> (usize, usize) {
        (self.col_offset, self.row_offset)
    }

    pub fn current_cell(&self) -> Option<&str> {
        self.rows
            .get(self.cursor_row)
            .and_then(|row| row.get(self.cursor_col))
            .map(String::as_str)
    }

    /// Normalized text of a stored cell value.
    pub fn display_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        display_cell(value, &self.newline_marker)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────

    /// Sets the inner size of the grid area and re-clamps the cursor.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.ensure_cursor_visible();
    }

    pub fn viewport(&self) -> (usize, usize) {
        (self.viewport_width, self.viewport_height)
    }

    /// Row-number column plus its separator.
    pub fn gutter_width(&self) -> usize {
        self.row_number_width + 1
    }

    /// Width left for cells and the separators between them.
    fn cell_area_width(&self) -> usize {
        let separators = self.columns.len().saturating_sub(1);
        self.viewport_width
            .saturating_sub(self.gutter_width())
            .saturating_sub(separators)
    }

    pub fn column_width(&self) -> usize {
        let count = self.columns.len();
        if count == 0 {
            return self.min_column_width;
        }
        (self.cell_area_width() / count).max(self.min_column_width)
    }

    /// Columns that fit side by side. At least one while there are columns.
    pub fn visible_column_count(&self) -> usize {
        if self.columns.is_empty() {
            return 0;
        }
        (self.cell_area_width() / self.column_width()).clamp(1, self.columns.len())
    }

    /// Data rows that fit under the header.
    pub fn body_height(&self) -> usize {
        self.viewport_height.saturating_sub(HEADER_ROWS)
    }

    /// Range of column indices currently drawn.
    pub fn visible_columns(&self) -> std::ops::Range<usize> {
        let end = (self.col_offset + self.visible_column_count()).min(self.columns.len());
        self.col_offset..end
    }

    /// Range of row indices currently drawn.
    pub fn visible_rows(&self) -> std::ops::Range<usize> {
        let end = (self.row_offset + self.body_height()).min(self.rows.len());
        self.row_offset.min(end)..end
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cursor
    // ─────────────────────────────────────────────────────────────────────

    pub fn move_to(&mut self, column: usize, row: usize) {
        self.cursor_col = column;
        self.cursor_row = row;
        self.ensure_cursor_visible();
    }

    pub fn move_rows(&mut self, delta: isize) {
        let row = self.cursor_row.saturating_add_signed(delta);
        self.move_to(self.cursor_col, row);
    }

    pub fn move_columns(&mut self, delta: isize) {
        let col = self.cursor_col.saturating_add_signed(delta);
        self.move_to(col, self.cursor_row);
    }

    fn half_page(&self) -> isize {
        (self.body_height() / 2).max(1) as isize
    }

    /// Clamps the cursor into the content and slides each offset by the
    /// minimal amount that keeps the cursor visible.
    pub fn ensure_cursor_visible(&mut self) {
        if self.rows.is_empty() {
            self.cursor_row = 0;
            self.row_offset = 0;
        } else {
            self.cursor_row = self.cursor_row.min(self.rows.len() - 1);
            self.row_offset = slide(self.row_offset, self.cursor_row, self.body_height().max(1));
        }

        if self.columns.is_empty() {
            self.cursor_col = 0;
            self.col_offset = 0;
        } else {
            self.cursor_col = self.cursor_col.min(self.columns.len() - 1);
            self.col_offset = slide(
                self.col_offset,
                self.cursor_col,
                self.visible_column_count().max(1),
            );
        }
    }

    /// Moves the cursor to the cell at `(x, y)` relative to the grid's inner
    /// area. Clicks on the header or gutter only change the row or column.
    pub fn click(&mut self, x: usize, y: usize) {
        let mut column = self.cursor_col;
        if x >= self.gutter_width() {
            let slot = (x - self.gutter_width()) / (self.column_width() + 1);
            if slot < self.visible_column_count() {
                column = self.col_offset + slot;
            }
        }
        let mut row = self.cursor_row;
        if y >= HEADER_ROWS {
            row = self.row_offset + (y - HEADER_ROWS);
            if row >= self.rows.len() {
                return;
            }
        }
        self.move_to(column, row);
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> GridAction {
        let key = match event.input {
            Input::Key(key) => key,
            Input::Pointer(pointer) => {
                match pointer.kind {
                    PointerKind::ScrollUp => self.move_rows(-1),
                    PointerKind::ScrollDown => self.move_rows(1),
                    PointerKind::Click => {}
                }
                return GridAction::None;
            }
        };

        if let Key::Char(c) = key {
            match self.sequences.feed(c, event.at) {
                SequenceStep::Matched(GridCommand::Top) => {
                    self.move_to(self.cursor_col, 0);
                    return GridAction::None;
                }
                SequenceStep::Pending | SequenceStep::Rejected => return GridAction::None,
                SequenceStep::Unhandled => {}
            }
        } else {
            self.sequences.cancel();
        }

        match key {
            Key::Up | Key::Char('k') => self.move_rows(-1),
            Key::Down | Key::Char('j') => self.move_rows(1),
            Key::Left | Key::Char('h') => self.move_columns(-1),
            Key::Right | Key::Char('l') => self.move_columns(1),
            Key::PageDown | Key::Ctrl('d') => self.move_rows(self.half_page()),
            Key::PageUp | Key::Ctrl('u') => self.move_rows(-self.half_page()),
            Key::Char('G') => self.move_to(self.cursor_col, self.rows.len().saturating_sub(1)),
            Key::Home | Key::Char('0') => self.move_to(0, self.cursor_row),
            Key::End | Key::Char('$') => {
                self.move_to(self.columns.len().saturating_sub(1), self.cursor_row)
            }
            Key::Char(' ') | Key::Char('y') => {
                if let Some(value) = self.current_cell() {
                    return GridAction::CopyCell(value.to_string());
                }
            }
            _ => {}
        }
        GridAction::None
    }
}

/// New offset keeping `cursor` inside `[offset, offset + window)`.
fn slide(offset: usize, cursor: usize, window: usize) -> usize {
    if cursor < offset {
        cursor
    } else if cursor >= offset + window {
        cursor + 1 - window
    } else {
        offset
    }
}
