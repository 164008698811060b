use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use throbber_widgets_tui::{Throbber, ThrobberState};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::grid::{DataGrid, HEADER_ROWS};

/// Renders a [`DataGrid`]. The grid's viewport must already match the
/// inner area (see [`GridView::inner_area`]).
pub struct GridView<'a> {
    pub grid: &'a DataGrid,
    pub throbber: &'a ThrobberState,
    pub focused: bool,
}

impl<'a> GridView<'a> {
    fn block(&self) -> Block<'static> {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let title = if self.grid.row_count() > 0 {
            let (col, row) = self.grid.cursor();
            format!(
                "Results [{}/{} rows, col {}/{}]",
                row + 1,
                self.grid.row_count(),
                col + 1,
                self.grid.column_count()
            )
        } else {
            "Results".to_string()
        };

        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style)
    }

    /// Area inside the border, used to size the grid before drawing.
    pub fn inner_area(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(area)
    }
}

impl<'a> Widget for GridView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.grid.is_loading() {
            let spinner = Throbber::default()
                .label("Loading...")
                .style(Style::default().fg(Color::Gray))
                .throbber_style(Style::default().fg(Color::Cyan));
            let line = Line::from(vec![
                spinner.to_symbol_span(self.throbber),
                " Loading...".into(),
            ]);
            Paragraph::new(line).render(inner, buf);
            return;
        }

        if self.grid.column_count() == 0 {
            Paragraph::new("No results")
                .style(Style::default().fg(Color::Gray))
                .render(inner, buf);
            return;
        }

        if (inner.height as usize) < HEADER_ROWS + 1 {
            Paragraph::new("Window too small")
                .style(Style::default().fg(Color::Gray))
                .render(inner, buf);
            return;
        }

        let gutter = self.grid.gutter_width() as u16;
        let col_w = self.grid.column_width() as u16;
        let columns = self.grid.visible_columns();
        let (cursor_col, cursor_row) = self.grid.cursor();
        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let rule_style = Style::default().fg(Color::DarkGray);

        // Header and rule.
        buf.set_string(
            inner.x,
            inner.y,
            fit_to_width("#", gutter.saturating_sub(1)),
            header_style,
        );
        buf.set_string(
            inner.x,
            inner.y + 1,
            "─".repeat(inner.width as usize),
            rule_style,
        );
        let mut x = inner.x + gutter;
        let max_x = inner.x + inner.width;
        for col in columns.clone() {
            if x >= max_x {
                break;
            }
            buf.set_string(x.saturating_sub(1), inner.y, "│", rule_style);
            let w = col_w.min(max_x - x);
            let name = &self.grid.columns()[col];
            buf.set_string(x, inner.y, fit_to_width(name, w), header_style);
            buf.set_string(x.saturating_sub(1), inner.y + 1, "┼", rule_style);
            x = x.saturating_add(col_w + 1);
        }

        if self.grid.row_count() == 0 {
            let body = Rect {
                x: inner.x,
                y: inner.y + HEADER_ROWS as u16,
                width: inner.width,
                height: inner.height - HEADER_ROWS as u16,
            };
            Paragraph::new("(no rows)")
                .style(Style::default().fg(Color::Gray))
                .render(body, buf);
            return;
        }

        for (i, row_idx) in self.grid.visible_rows().enumerate() {
            let y = inner.y + (HEADER_ROWS + i) as u16;
            let row_style = if row_idx % 2 == 1 {
                Style::default().bg(Color::Rgb(30, 30, 30))
            } else {
                Style::default()
            };

            let number_style = if row_idx == cursor_row {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let number = format!(
                "{:>width$}",
                row_idx + 1,
                width = gutter.saturating_sub(1) as usize
            );
            buf.set_string(
                inner.x,
                y,
                fit_to_width(&number, gutter.saturating_sub(1)),
                number_style,
            );

            let cells = &self.grid.rows()[row_idx];
            let mut x = inner.x + gutter;
            for col in columns.clone() {
                if x >= max_x {
                    break;
                }
                buf.set_string(x.saturating_sub(1), y, "│", rule_style);
                let w = col_w.min(max_x - x);
                let style = if row_idx == cursor_row && col == cursor_col {
                    if self.focused {
                        Style::default().bg(Color::Cyan).fg(Color::Black)
                    } else {
                        Style::default().bg(Color::DarkGray)
                    }
                } else {
                    row_style
                };
                let value = self.grid.display_value(&cells[col]);
                buf.set_string(x, y, fit_to_width(&value, w), style);
                x = x.saturating_add(col_w + 1);
            }
        }
    }
}

fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pads or truncates `s` to exactly `width` terminal cells.
pub fn fit_to_width(s: &str, width: u16) -> String {
    let width = width as usize;
    if width == 0 {
        return String::new();
    }

    let current = display_width(s);
    if current <= width {
        let mut out = s.to_string();
        out.push_str(&" ".repeat(width - current));
        return out;
    }

    if width <= 1 {
        return truncate_by_display_width(s, width);
    }

    let mut out = truncate_by_display_width(s, width - 1);
    out.push('…');
    out
}

fn truncate_by_display_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;

    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }

    if used < width {
        out.push_str(&" ".repeat(width - used));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to_width_pads() {
        assert_eq!(fit_to_width("ab", 4), "ab  ");
    }

    #[test]
    fn test_fit_to_width_truncates_with_ellipsis() {
        assert_eq!(fit_to_width("abcdef", 4), "abc…");
        assert_eq!(display_width(&fit_to_width("日本語テキスト", 5)), 5);
    }

    #[test]
    fn test_render_shows_header_and_cursor_cell() {
        let mut grid = DataGrid::new();
        grid.set_content(
            vec!["id".into(), "name".into()],
            vec![vec!["1".into(), "x".into()]],
        )
        .unwrap();
        let area = Rect::new(0, 0, 40, 6);
        let inner = GridView::inner_area(area);
        grid.set_viewport(inner.width as usize, inner.height as usize);

        let throbber = ThrobberState::default();
        let mut buf = Buffer::empty(area);
        GridView {
            grid: &grid,
            throbber: &throbber,
            focused: true,
        }
        .render(area, &mut buf);

        let header: String = (0..40)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert!(header.contains("id"));
        assert!(header.contains("name"));
        let first_row: String = (0..40)
            .map(|x| buf[(x, 3)].symbol().to_string())
            .collect();
        assert!(first_row.contains('1'));
        assert!(first_row.contains('x'));
    }
}
