use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use unicode_width::UnicodeWidthChar;

use super::editor::QueryEditor;

/// Renders a [`QueryEditor`] starting at its scroll line.
pub struct EditorView<'a> {
    pub editor: &'a QueryEditor,
    /// Syntax style per buffer character; plain text when the lengths differ.
    pub highlights: &'a [Style],
    pub focused: bool,
}

impl<'a> EditorView<'a> {
    pub fn inner_area(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(area)
    }

    /// Terminal position of the editor cursor, if it is on screen.
    pub fn cursor_position(&self, area: Rect) -> Option<Position> {
        let inner = Self::inner_area(area);
        let (line, col) = self.editor.cursor_line_col();
        let row = line.checked_sub(self.editor.scroll_top())?;
        if row >= inner.height as usize {
            return None;
        }
        let text = self.editor.text();
        let width: usize = text
            .split('\n')
            .nth(line)
            .unwrap_or("")
            .chars()
            .take(col)
            .map(|c| c.width().unwrap_or(0))
            .sum();
        let x = inner.x as usize + width.min(inner.width.saturating_sub(1) as usize);
        Some(Position::new(x as u16, inner.y + row as u16))
    }

    fn title(&self) -> String {
        let mode = self.editor.mode();
        let mut title = format!("Query ({})", mode.label());
        let pending = self.editor.pending_keys();
        if !pending.is_empty() {
            title.push_str(&format!(" {pending}"));
        }
        if self.focused {
            title.push_str(&format!(" - {}", mode.hint()));
        }
        title
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let chars: Vec<char> = self.editor.text().chars().collect();
        let selection = self.editor.selection();
        let selected_style = Style::default().bg(Color::Blue).fg(Color::White);
        let highlights = (self.highlights.len() == chars.len()).then_some(self.highlights);

        let style_at = |i: usize| -> Style {
            if selection.as_ref().is_some_and(|sel| sel.contains(&i)) {
                return selected_style;
            }
            highlights
                .and_then(|h| h.get(i).copied())
                .unwrap_or_default()
        };

        let mut lines = Vec::new();
        let mut offset = 0usize;
        for raw in chars.split(|c| *c == '\n') {
            let mut spans = Vec::new();
            let mut run = String::new();
            let mut run_style = Style::default();
            for (i, c) in raw.iter().enumerate() {
                let style = style_at(offset + i);
                if style != run_style && !run.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut run), run_style));
                }
                run_style = style;
                run.push(*c);
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, run_style));
            }
            lines.push(Line::from(spans));
            offset += raw.len() + 1;
        }
        lines
    }
}

impl<'a> Widget for EditorView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(self.editor.mode().border_color())
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .border_style(border_style);

        let lines = self.lines();
        if self.editor.is_empty() && !self.focused {
            Paragraph::new(Line::from(Span::styled(
                "Select a table or press c to write a query",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )))
            .block(block)
            .render(area, buf);
            return;
        }

        Paragraph::new(lines)
            .block(block)
            .scroll((self.editor.scroll_top() as u16, 0))
            .render(area, buf);
    }
}
