//! Bottom status line.
//!
//! Segments are dropped by priority when the terminal is too narrow; the
//! message on the right always stays.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::util::ellipsize;

/// Lower values are kept first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

#[derive(Debug, Clone)]
pub struct StatusSegment {
    pub content: String,
    pub priority: Priority,
    pub style: Style,
}

impl StatusSegment {
    pub fn new(content: impl Into<String>, priority: Priority) -> Self {
        Self {
            content: content.into(),
            priority,
            style: Style::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn width(&self) -> usize {
        self.content.width()
    }
}

/// Kind of the transient message shown on the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// Everything the status line shows.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    /// `user@host:port` of the open connection.
    pub connection: Option<String>,
    pub database: Option<String>,
    /// Editor mode label when the editor is focused.
    pub mode: Option<&'static str>,
    /// Pending keys of an unfinished command.
    pub pending: String,
    pub running: bool,
    pub rows: Option<(usize, bool)>,
    pub message: Option<StatusMessage>,
}

impl StatusLine {
    fn segments(&self) -> Vec<StatusSegment> {
        let mut segments = Vec::new();

        if let Some(mode) = self.mode {
            segments.push(
                StatusSegment::new(format!(" {} ", mode.to_uppercase()), Priority::Critical).style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            );
        }

        match &self.connection {
            Some(conn) => {
                let target = match &self.database {
                    Some(db) => format!("{conn}/{db}"),
                    None => conn.clone(),
                };
                segments.push(
                    StatusSegment::new(target, Priority::High).style(Style::default().fg(Color::Green)),
                );
            }
            None => segments.push(
                StatusSegment::new("disconnected", Priority::High)
                    .style(Style::default().fg(Color::DarkGray)),
            ),
        }

        if self.running {
            segments.push(
                StatusSegment::new("running…", Priority::High).style(Style::default().fg(Color::Yellow)),
            );
        }

        if let Some((rows, truncated)) = self.rows {
            let text = if truncated {
                format!("{rows}+ rows")
            } else if rows == 1 {
                "1 row".to_string()
            } else {
                format!("{rows} rows")
            };
            segments.push(StatusSegment::new(text, Priority::Medium));
        }

        if !self.pending.is_empty() {
            segments.push(
                StatusSegment::new(self.pending.clone(), Priority::Low)
                    .style(Style::default().fg(Color::Yellow)),
            );
        }

        segments
    }

    /// Lays the line out for `width` cells.
    pub fn build(&self, width: u16) -> Line<'static> {
        let width = width as usize;
        if width == 0 {
            return Line::from("");
        }
        let separator = " │ ";
        let sep_style = Style::default().fg(Color::DarkGray);

        let (message, message_style) = match &self.message {
            Some(StatusMessage::Info(msg)) => (msg.clone(), Style::default().fg(Color::White)),
            Some(StatusMessage::Error(msg)) => (msg.clone(), Style::default().fg(Color::Red)),
            None => (String::new(), Style::default()),
        };

        // Segments keep their display order; priority only decides which fit.
        let segments = self.segments();
        let mut order: Vec<usize> = (0..segments.len()).collect();
        order.sort_by_key(|&i| segments[i].priority);

        let budget = width.saturating_sub(message.width().min(width / 2));
        let mut used = 0;
        let mut keep = vec![false; segments.len()];
        for i in order {
            let needed = segments[i].width() + if used == 0 { 0 } else { separator.width() };
            if used + needed <= budget {
                used += needed;
                keep[i] = true;
            }
        }

        let mut spans = Vec::new();
        for (segment, _) in segments.into_iter().zip(&keep).filter(|(_, k)| **k) {
            if !spans.is_empty() {
                spans.push(Span::styled(separator, sep_style));
            }
            spans.push(Span::styled(segment.content, segment.style));
        }

        let left: usize = spans.iter().map(|s| s.content.width()).sum();
        let room = width.saturating_sub(left + 1);
        if room > 0 && !message.is_empty() {
            let message = ellipsize(&message, room);
            let padding = width.saturating_sub(left + message.width());
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::styled(message, message_style));
        }

        Line::from(spans)
    }
}
