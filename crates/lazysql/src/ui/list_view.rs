use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use super::grid_view::fit_to_width;
use super::list::{ListItem, SelectableList};

/// Renders the visible window of a [`SelectableList`].
pub struct ListView<'a, T: ListItem> {
    pub list: &'a SelectableList<T>,
    pub focused: bool,
}

impl<'a, T: ListItem> ListView<'a, T> {
    pub fn inner_area(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(area)
    }

    fn title(&self) -> String {
        let list = self.list;
        if list.is_editing_filter() {
            format!("{} /{}_", list.title(), list.filter())
        } else if !list.filter().is_empty() {
            format!("{} /{}", list.title(), list.filter())
        } else {
            list.title().to_string()
        }
    }
}

impl<'a, T: ListItem> Widget for ListView<'a, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.list.is_empty() {
            let msg = if self.list.items().is_empty() {
                "(empty)"
            } else {
                "(no matches)"
            };
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .render(inner, buf);
            return;
        }

        let lines: Vec<Line> = self
            .list
            .filtered_items()
            .enumerate()
            .skip(self.list.scroll_offset())
            .take(inner.height as usize)
            .map(|(idx, item)| {
                let mut style = if self.list.is_selected(item) {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                if idx == self.list.cursor() {
                    style = if self.focused {
                        style.bg(Color::DarkGray).add_modifier(Modifier::BOLD)
                    } else {
                        style.add_modifier(Modifier::BOLD)
                    };
                }
                Line::from(Span::styled(fit_to_width(&item.display(), inner.width), style))
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_shows_filter() {
        let mut list: SelectableList<String> = SelectableList::new("Tables");
        list.set_content(vec!["users".into()]);
        list.set_filter("us");
        let view = ListView {
            list: &list,
            focused: true,
        };
        assert_eq!(view.title(), "Tables /us");
    }

    #[test]
    fn test_render_starts_at_scroll_offset() {
        let mut list: SelectableList<String> = SelectableList::new("Items");
        list.set_content((0..10).map(|i| format!("item{i}")).collect());
        let area = Rect::new(0, 0, 20, 5);
        list.set_viewport_height(ListView::<String>::inner_area(area).height as usize);
        list.jump_bottom();

        let mut buf = Buffer::empty(area);
        ListView {
            list: &list,
            focused: true,
        }
        .render(area, &mut buf);

        let first: String = (1..6).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert_eq!(first, "item7");
    }
}
