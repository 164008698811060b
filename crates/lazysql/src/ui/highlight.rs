//! SQL syntax highlighting for the query editor.

use ratatui::style::{Color, Modifier, Style};
use thiserror::Error;
use tracing::debug;
use tree_sitter_highlight::{HighlightConfiguration, HighlightEvent, Highlighter};

/// Capture names styled by the editor. Longer captures such as
/// `function.call` fall back to their closest prefix here.
const CAPTURE_NAMES: &[&str] = &[
    "attribute",
    "boolean",
    "comment",
    "conditional",
    "constant",
    "field",
    "function",
    "keyword",
    "number",
    "operator",
    "parameter",
    "punctuation",
    "storageclass",
    "string",
    "type",
    "variable",
];

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("Invalid highlight query: {0}")]
    Query(String),
}

fn style_for(capture: &str) -> Style {
    match capture {
        "keyword" | "conditional" | "storageclass" => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        "string" => Style::default().fg(Color::Green),
        "number" | "boolean" | "constant" => Style::default().fg(Color::Yellow),
        "comment" => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
        "function" => Style::default().fg(Color::Blue),
        "type" | "attribute" => Style::default().fg(Color::Cyan),
        "operator" => Style::default().fg(Color::LightRed),
        _ => Style::default(),
    }
}

/// Tree-sitter highlighter for the SQL grammar, caching the styles of the
/// last buffer it saw.
pub struct SqlHighlighter {
    config: HighlightConfiguration,
    highlighter: Highlighter,
    source: String,
    styles: Vec<Style>,
}

impl SqlHighlighter {
    pub fn new() -> Result<Self, HighlightError> {
        let mut config = HighlightConfiguration::new(
            tree_sitter_sequel::LANGUAGE.into(),
            "sql",
            tree_sitter_sequel::HIGHLIGHTS_QUERY,
            "",
            "",
        )
        .map_err(|e| HighlightError::Query(e.to_string()))?;
        config.configure(CAPTURE_NAMES);

        Ok(Self {
            config,
            highlighter: Highlighter::new(),
            source: String::new(),
            styles: Vec::new(),
        })
    }

    /// One style per character of `source`.
    pub fn styles(&mut self, source: &str) -> &[Style] {
        if self.source != source || self.styles.len() != source.chars().count() {
            self.styles = self.compute(source);
            self.source = source.to_string();
        }
        &self.styles
    }

    fn compute(&mut self, source: &str) -> Vec<Style> {
        let char_starts: Vec<usize> = source.char_indices().map(|(b, _)| b).collect();
        let mut styles = vec![Style::default(); char_starts.len()];

        let events = match self
            .highlighter
            .highlight(&self.config, source.as_bytes(), None, |_| None)
        {
            Ok(events) => events,
            Err(e) => {
                debug!(error = %e, "highlighting failed");
                return styles;
            }
        };

        let mut stack: Vec<Style> = Vec::new();
        for event in events {
            match event {
                Ok(HighlightEvent::HighlightStart(highlight)) => {
                    let name = CAPTURE_NAMES.get(highlight.0).copied().unwrap_or("");
                    stack.push(style_for(name));
                }
                Ok(HighlightEvent::HighlightEnd) => {
                    stack.pop();
                }
                Ok(HighlightEvent::Source { start, end }) => {
                    let Some(style) = stack.last().copied() else {
                        continue;
                    };
                    let first = char_starts.partition_point(|&b| b < start);
                    let last = char_starts.partition_point(|&b| b < end);
                    for slot in &mut styles[first..last] {
                        *slot = style;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "highlighting stopped");
                    break;
                }
            }
        }
        styles
    }
}
