//! Form for editing a server profile.
//!
//! Text fields are single-line `TextArea`s; the password field is masked.
//! The database type is a toggle.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tui_textarea::{CursorMove, TextArea};

use crate::config::{validate_port, DbType, Host};
use crate::ui::input::{Input, InputEvent, Key};

/// Which field is currently focused in the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Type,
    Host,
    Port,
    User,
    Password,
    Database,
}

impl FormField {
    const ALL: [FormField; 7] = [
        FormField::Name,
        FormField::Type,
        FormField::Host,
        FormField::Port,
        FormField::User,
        FormField::Password,
        FormField::Database,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Text area backing the field; the type toggle has none.
    fn slot(self) -> Option<usize> {
        match self {
            FormField::Name => Some(0),
            FormField::Type => None,
            FormField::Host => Some(1),
            FormField::Port => Some(2),
            FormField::User => Some(3),
            FormField::Password => Some(4),
            FormField::Database => Some(5),
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name:",
            FormField::Type => "Type:",
            FormField::Host => "Host:",
            FormField::Port => "Port:",
            FormField::User => "User:",
            FormField::Password => "Password:",
            FormField::Database => "Database:",
        }
    }
}

/// Result of handling a key event in the host form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFormAction {
    /// Continue editing
    Continue,
    /// Back to the host list
    Cancel,
    /// Connect with the entered values
    Connect(Host),
    /// Store the profile, replacing `original_name` when editing
    Save {
        host: Host,
        original_name: Option<String>,
    },
    /// Validation failed
    Invalid(String),
}

pub struct HostForm {
    fields: [TextArea<'static>; 6],
    db_type: DbType,
    /// PostgreSQL port used when none is given.
    default_port: u16,
    focused: FormField,
    /// Name of the profile being edited, `None` for a new one.
    original_name: Option<String>,
}

fn single_line_field(value: &str) -> TextArea<'static> {
    let mut textarea = TextArea::new(vec![value.to_string()]);
    textarea.move_cursor(CursorMove::End);
    textarea.set_cursor_line_style(Style::default());
    textarea
}

impl HostForm {
    /// Empty form for a new profile.
    pub fn new(default_port: u16) -> Self {
        let mut form = Self {
            fields: [
                single_line_field(""),
                single_line_field("localhost"),
                single_line_field(&default_port.to_string()),
                single_line_field(""),
                single_line_field(""),
                single_line_field(""),
            ],
            db_type: DbType::Postgres,
            default_port,
            focused: FormField::Name,
            original_name: None,
        };
        form.fields[4].set_mask_char('•');
        form.restyle();
        form
    }

    /// Form prefilled from an existing profile.
    pub fn edit(host: &Host, default_port: u16) -> Self {
        let mut form = Self::new(default_port);
        form.db_type = host.db_type;
        form.set_value(FormField::Port, &host.port.to_string());
        form.set_value(FormField::Name, &host.name);
        form.set_value(FormField::Host, &host.host);
        form.set_value(FormField::User, &host.user);
        form.set_value(FormField::Password, &host.password);
        form.set_value(FormField::Database, host.database.as_deref().unwrap_or(""));
        form.original_name = Some(host.name.clone());
        form
    }

    pub fn focused(&self) -> FormField {
        self.focused
    }

    pub fn is_editing(&self) -> bool {
        self.original_name.is_some()
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn db_type(&self) -> DbType {
        self.db_type
    }

    pub fn value(&self, field: FormField) -> String {
        match field.slot() {
            Some(slot) => self.fields[slot].lines().join(""),
            None => self.db_type.label().to_string(),
        }
    }

    fn set_value(&mut self, field: FormField, value: &str) {
        let Some(slot) = field.slot() else {
            return;
        };
        let mut textarea = single_line_field(value);
        if field == FormField::Password {
            textarea.set_mask_char('•');
        }
        self.fields[slot] = textarea;
        self.restyle();
    }

    /// Switches the database type. A port still at the old type's default
    /// follows the new type.
    fn toggle_type(&mut self) {
        let old_default = self.db_type.default_port(self.default_port);
        self.db_type = self.db_type.toggled();
        if self.value(FormField::Port).trim() == old_default.to_string() {
            let port = self.db_type.default_port(self.default_port);
            self.set_value(FormField::Port, &port.to_string());
        }
    }

    pub fn focus(&mut self, field: FormField) {
        self.focused = field;
        self.restyle();
    }

    /// Cursor only on the focused field.
    fn restyle(&mut self) {
        for field in FormField::ALL {
            let Some(slot) = field.slot() else {
                continue;
            };
            let style = if field == self.focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            self.fields[slot].set_cursor_style(style);
        }
    }

    /// Builds a profile from the form. The name may be left empty when only
    /// connecting; it then defaults to the host.
    pub fn to_host(&self, require_name: bool) -> Result<Host, String> {
        let name = self.value(FormField::Name).trim().to_string();
        if require_name && name.is_empty() {
            return Err("Name is required".to_string());
        }
        let port = validate_port(&self.value(FormField::Port)).map_err(|e| e.to_string())?;
        let host = match self.value(FormField::Host).trim() {
            "" => "localhost".to_string(),
            h => h.to_string(),
        };
        let database = self.value(FormField::Database).trim().to_string();
        Ok(Host {
            name: if name.is_empty() { host.clone() } else { name },
            db_type: self.db_type,
            host,
            port,
            user: self.value(FormField::User).trim().to_string(),
            password: self.value(FormField::Password),
            database: (!database.is_empty()).then_some(database),
        })
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> HostFormAction {
        let Input::Key(key) = event.input else {
            return HostFormAction::Continue;
        };

        match key {
            Key::Esc => HostFormAction::Cancel,
            Key::Tab | Key::Down => {
                self.focus(self.focused.next());
                HostFormAction::Continue
            }
            Key::BackTab | Key::Up => {
                self.focus(self.focused.prev());
                HostFormAction::Continue
            }
            Key::Enter => match self.to_host(false) {
                Ok(host) => HostFormAction::Connect(host),
                Err(msg) => HostFormAction::Invalid(msg),
            },
            Key::Ctrl('s') => match self.to_host(true) {
                Ok(host) => HostFormAction::Save {
                    host,
                    original_name: self.original_name.clone(),
                },
                Err(msg) => HostFormAction::Invalid(msg),
            },
            Key::Char(' ') | Key::Left | Key::Right if self.focused == FormField::Type => {
                self.toggle_type();
                HostFormAction::Continue
            }
            Key::Char(c) if self.focused == FormField::Port && !c.is_ascii_digit() => {
                HostFormAction::Continue
            }
            other => {
                if let (Some(slot), Some(input)) = (self.focused.slot(), textarea_input(other)) {
                    self.fields[slot].input(input);
                }
                HostFormAction::Continue
            }
        }
    }

    /// Marks the form as editing the profile just saved.
    pub fn saved_as(&mut self, name: &str) {
        self.original_name = Some(name.to_string());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let title = match &self.original_name {
            Some(name) => format!("Edit host: {name}"),
            None => "New host".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(1); FormField::ALL.len()];
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        let rows = Layout::vertical(constraints).split(inner);

        for (i, field) in FormField::ALL.into_iter().enumerate() {
            let cols = Layout::horizontal([Constraint::Length(11), Constraint::Min(1)]).split(rows[i]);
            let label_style = if focused && field == self.focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            frame.render_widget(Paragraph::new(field.label()).style(label_style), cols[0]);
            match field.slot() {
                Some(slot) => frame.render_widget(&self.fields[slot], cols[1]),
                None => {
                    let style = if focused && field == self.focused {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    let toggle = Line::from(vec![
                        Span::styled(format!("< {} >", self.db_type.label()), style),
                        Span::styled("  Space to change", Style::default().fg(Color::DarkGray)),
                    ]);
                    frame.render_widget(Paragraph::new(toggle), cols[1]);
                }
            }
        }

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" next  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" connect  "),
            Span::styled("Ctrl+S", Style::default().fg(Color::Yellow)),
            Span::raw(" save  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" back"),
        ]);
        if let Some(area) = rows.last() {
            frame.render_widget(Paragraph::new(help), *area);
        }
    }
}

/// Keys that edit a single-line field.
fn textarea_input(key: Key) -> Option<tui_textarea::Input> {
    use tui_textarea::Key as TKey;

    let (key, ctrl) = match key {
        Key::Char(c) => (TKey::Char(c), false),
        Key::Ctrl(c @ ('a' | 'e' | 'h' | 'k' | 'u' | 'w')) => (TKey::Char(c), true),
        Key::Left => (TKey::Left, false),
        Key::Right => (TKey::Right, false),
        Key::Home => (TKey::Home, false),
        Key::End => (TKey::End, false),
        Key::Backspace => (TKey::Backspace, false),
        Key::Delete => (TKey::Delete, false),
        _ => return None,
    };
    Some(tui_textarea::Input {
        key,
        ctrl,
        alt: false,
        shift: false,
    })
}
