use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::SetTitle;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::activity::{ActivityLog, LogViewer};
use super::state::{DbStatus, Focus, HostChoice, HostsFocus, Screen};
use crate::clipboard::Clipboard;
use crate::config::{save_hosts_to, Config, Host};
use crate::db::{self, Driver, QueryResult, QueryTracker, TableRef};
use crate::history::{History, HistoryEntry};
use crate::ui::{
    DataGrid, EditorAction, EditorView, GridAction, GridView, HostForm, HostFormAction, Input,
    InputEvent, Key, ListAction, ListView, Pointer, PointerKind, QueryEditor, SelectableList,
    SqlHighlighter, StatusLine, StatusMessage,
};
use crate::util::{format_error_chain, single_line};

const THROBBER_INTERVAL: Duration = Duration::from_millis(100);
const APP_TITLE: &str = "lazysql";

/// Results of background database work, delivered to the UI thread.
pub enum DbEvent {
    Connected {
        driver: Arc<dyn Driver>,
        host: Host,
        database: Option<String>,
    },
    ConnectError {
        error: String,
    },
    DatabasesLoaded {
        databases: Vec<String>,
    },
    DatabaseSwitched {
        name: String,
    },
    TablesLoaded {
        /// Database the tables were listed for.
        database: Option<String>,
        tables: Vec<TableRef>,
    },
    MetadataError {
        error: String,
    },
    QueryFinished {
        id: u64,
        result: QueryResult,
        /// Query to add to history once accepted.
        record: Option<String>,
    },
    QueryError {
        id: u64,
        error: String,
    },
    CancelFinished {
        sent: std::result::Result<bool, String>,
    },
}

/// Pane rectangles from the last frame, for mouse hit testing.
#[derive(Debug, Default, Clone, Copy)]
struct PaneAreas {
    databases: Rect,
    tables: Rect,
    history: Rect,
    editor: Rect,
    grid: Rect,
    hosts: Rect,
    form: Rect,
    status: Rect,
}

pub struct App {
    config: Config,
    screen: Screen,
    focus: Focus,
    hosts_focus: HostsFocus,

    saved_hosts: Vec<Host>,
    hosts_file: Option<PathBuf>,
    hosts: SelectableList<HostChoice>,
    host_form: HostForm,

    databases: SelectableList<String>,
    tables: SelectableList<TableRef>,
    history_list: SelectableList<HistoryEntry>,
    history: History,

    editor: QueryEditor,
    highlighter: Option<SqlHighlighter>,
    grid: DataGrid,
    throbber: ThrobberState,
    last_tick: Instant,
    clipboard: Clipboard,

    rt: tokio::runtime::Handle,
    db_events_tx: mpsc::UnboundedSender<DbEvent>,
    db_events_rx: mpsc::UnboundedReceiver<DbEvent>,
    driver: Option<Arc<dyn Driver>>,
    db_status: DbStatus,
    active_host: Option<Host>,
    current_database: Option<String>,
    tracker: QueryTracker,

    areas: PaneAreas,
    last_rows: Option<(usize, bool)>,
    message: Option<StatusMessage>,
    activity: ActivityLog,
    /// Full-screen log viewer; absorbs input while open.
    log_viewer: Option<LogViewer>,
    last_status_click: Option<Instant>,
    /// Error panel; absorbs keys until dismissed.
    last_error: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        saved_hosts: Vec<Host>,
        history: History,
        hosts_file: Option<PathBuf>,
        rt: tokio::runtime::Handle,
    ) -> Self {
        let timeout = config.editor.key_sequence_timeout();
        let (db_events_tx, db_events_rx) = mpsc::unbounded_channel();

        let mut history_list = SelectableList::with_timeout("History", timeout);
        history_list.set_content(history.entries().to_vec());

        let highlighter = if config.editor.syntax_highlighting {
            SqlHighlighter::new()
                .map_err(|e| warn!(error = %e, "syntax highlighting disabled"))
                .ok()
        } else {
            None
        };

        let mut app = Self {
            screen: Screen::Hosts,
            focus: Focus::Databases,
            hosts_focus: HostsFocus::List,

            saved_hosts,
            hosts_file,
            hosts: SelectableList::with_timeout("Hosts", timeout),
            host_form: HostForm::new(config.connection.default_port),

            databases: SelectableList::with_timeout("Databases", timeout),
            tables: SelectableList::with_timeout("Tables", timeout),
            history_list,
            history,

            editor: QueryEditor::with_settings(config.editor.tab_size, timeout),
            highlighter,
            grid: DataGrid::with_settings(
                config.display.row_number_width,
                config.display.min_column_width,
                &config.display.newline_marker,
                timeout,
            ),
            throbber: ThrobberState::default(),
            last_tick: Instant::now(),
            clipboard: Clipboard::new(),

            rt,
            db_events_tx,
            db_events_rx,
            driver: None,
            db_status: DbStatus::Disconnected,
            active_host: None,
            current_database: None,
            tracker: QueryTracker::new(),

            areas: PaneAreas::default(),
            last_rows: None,
            message: None,
            activity: ActivityLog::default(),
            log_viewer: None,
            last_status_click: None,
            last_error: None,
            should_quit: false,
            config,
        };
        app.refresh_hosts_list();
        app
    }

    // ─────────────────────────────────────────────────────────────────────
    // State accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn db_status(&self) -> DbStatus {
        self.db_status
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn editor(&self) -> &QueryEditor {
        &self.editor
    }

    pub fn grid(&self) -> &DataGrid {
        &self.grid
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn is_log_open(&self) -> bool {
        self.log_viewer.is_some()
    }

    /// Terminal title: the app name plus the database in use.
    pub fn window_title(&self) -> String {
        match (&self.driver, &self.current_database) {
            (Some(_), Some(name)) => format!("{APP_TITLE} ({name})"),
            _ => APP_TITLE.to_string(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Main loop
    // ─────────────────────────────────────────────────────────────────────

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut title = String::new();
        loop {
            self.drain_db_events();

            let wanted = self.window_title();
            if wanted != title {
                execute!(terminal.backend_mut(), SetTitle(&wanted))?;
                title = wanted;
            }

            if self.grid.is_loading() && self.last_tick.elapsed() >= THROBBER_INTERVAL {
                self.throbber.calc_next();
                self.last_tick = Instant::now();
            }

            terminal.draw(|frame| self.draw(frame))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                let at = Instant::now();
                let input = match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        InputEvent::from_key_event(key, at)
                    }
                    Event::Mouse(mouse) => InputEvent::from_mouse_event(mouse, at),
                    _ => None,
                };
                if let Some(input) = input {
                    self.handle_input(input);
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(driver) = self.driver.take() {
            self.rt.block_on(driver.close());
        }
        if let Err(e) = self.history.save() {
            warn!(error = %e, "failed to save history");
        }
    }

    /// Connects to `host` as if it had been picked on the hosts screen.
    pub fn connect_host(&mut self, host: Host) {
        self.hosts
            .set_selected(Some(HostChoice::Saved(host.clone())));
        self.host_form = HostForm::edit(&host, self.config.connection.default_port);
        self.start_connect(host);
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if self.last_error.is_some() {
            if matches!(event.as_key(), Some(Key::Enter | Key::Esc)) {
                self.last_error = None;
            }
            return;
        }
        if self.log_viewer.is_some() {
            self.handle_log_input(&event);
            return;
        }
        match event.input {
            Input::Pointer(pointer) => self.handle_pointer(pointer, &event),
            Input::Key(key) => match self.screen {
                Screen::Hosts => self.handle_hosts_key(key, &event),
                Screen::Database => self.handle_database_key(key, &event),
            },
        }
    }

    fn set_info(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.activity.push(msg.clone());
        self.message = Some(StatusMessage::Info(msg));
    }

    fn set_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!(error = %msg, "reported to user");
        self.activity.push(format!("[Error]: {msg}"));
        self.message = Some(StatusMessage::Error(msg));
    }

    /// Reports a failure in the error panel as well as the status line.
    fn show_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.set_error(single_line(&msg));
        self.last_error = Some(msg);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Log viewer
    // ─────────────────────────────────────────────────────────────────────

    /// A second click on the status line within the key sequence window
    /// opens the log viewer.
    fn status_clicked(&mut self, at: Instant) {
        let window = self.config.editor.key_sequence_timeout();
        match self.last_status_click.take() {
            Some(prev) if at.saturating_duration_since(prev) <= window => {
                self.log_viewer = Some(LogViewer::default());
            }
            _ => self.last_status_click = Some(at),
        }
    }

    fn handle_log_input(&mut self, event: &InputEvent) {
        let len = self.activity.len();
        let Some(viewer) = self.log_viewer.as_mut() else {
            return;
        };
        match event.input {
            Input::Pointer(pointer) => match pointer.kind {
                PointerKind::ScrollUp => viewer.scroll(-1, len),
                PointerKind::ScrollDown => viewer.scroll(1, len),
                PointerKind::Click => {}
            },
            Input::Key(key) => match key {
                Key::Esc | Key::Char('q') => self.log_viewer = None,
                Key::Char('j') | Key::Down => viewer.scroll(1, len),
                Key::Char('k') | Key::Up => viewer.scroll(-1, len),
                Key::PageDown | Key::Ctrl('d') => viewer.scroll(10, len),
                Key::PageUp | Key::Ctrl('u') => viewer.scroll(-10, len),
                Key::Char('g') | Key::Home => viewer.offset = 0,
                Key::Char('G') | Key::End => viewer.scroll(isize::MAX, len),
                _ => {}
            },
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hosts screen
    // ─────────────────────────────────────────────────────────────────────

    fn refresh_hosts_list(&mut self) {
        let items = self
            .saved_hosts
            .iter()
            .cloned()
            .map(HostChoice::Saved)
            .chain(std::iter::once(HostChoice::New))
            .collect();
        self.hosts.set_content(items);
    }

    fn handle_hosts_key(&mut self, key: Key, event: &InputEvent) {
        if key == Key::Ctrl('c') {
            if self.db_status == DbStatus::Connecting {
                self.db_status = DbStatus::Disconnected;
                self.set_info("Connection attempt abandoned");
            } else {
                self.should_quit = true;
            }
            return;
        }

        match self.hosts_focus {
            HostsFocus::Form => {
                let action = self.host_form.handle_input(event);
                self.apply_form_action(action);
            }
            HostsFocus::List => {
                if !self.hosts.is_editing_filter() {
                    match key {
                        Key::Char('q') => {
                            self.should_quit = true;
                            return;
                        }
                        Key::Char('c') => {
                            self.connect_under_cursor();
                            return;
                        }
                        Key::Tab | Key::BackTab | Key::Char('l') | Key::Right => {
                            self.hosts_focus = HostsFocus::Form;
                            return;
                        }
                        _ => {}
                    }
                }
                let action = self.hosts.handle_input(event);
                self.apply_hosts_action(action);
            }
        }
    }

    fn apply_hosts_action(&mut self, action: ListAction<HostChoice>) {
        match action {
            ListAction::Selected(choice) => {
                self.host_form = match choice {
                    HostChoice::New => HostForm::new(self.config.connection.default_port),
                    HostChoice::Saved(host) => {
                        HostForm::edit(&host, self.config.connection.default_port)
                    }
                };
            }
            ListAction::Reselected(_) => self.hosts_focus = HostsFocus::Form,
            ListAction::None => {}
        }
    }

    fn apply_form_action(&mut self, action: HostFormAction) {
        match action {
            HostFormAction::Continue => {}
            HostFormAction::Cancel => self.hosts_focus = HostsFocus::List,
            HostFormAction::Connect(host) => self.start_connect(host),
            HostFormAction::Save {
                host,
                original_name,
            } => self.save_host(host, original_name),
            HostFormAction::Invalid(msg) => self.set_error(msg),
        }
    }

    fn connect_under_cursor(&mut self) {
        match self.hosts.cursor_item().cloned() {
            Some(HostChoice::Saved(host)) => self.start_connect(host),
            Some(HostChoice::New) => match self.host_form.to_host(false) {
                Ok(host) => self.start_connect(host),
                Err(msg) => self.set_error(msg),
            },
            None => {}
        }
    }

    fn save_host(&mut self, host: Host, original_name: Option<String>) {
        let mut hosts = self.saved_hosts.clone();
        let existing = original_name
            .as_deref()
            .and_then(|name| hosts.iter().position(|h| h.name == name));
        match existing {
            Some(i) => hosts[i] = host.clone(),
            None => hosts.push(host.clone()),
        }

        let Some(path) = self.hosts_file.clone() else {
            self.set_error("Could not determine config directory");
            return;
        };
        if let Err(e) = save_hosts_to(&path, &hosts) {
            self.set_error(format_error_chain(&e));
            return;
        }

        info!(host = %host.name, "saved host profile");
        self.saved_hosts = hosts;
        self.refresh_hosts_list();
        self.hosts
            .set_selected(Some(HostChoice::Saved(host.clone())));
        self.host_form.saved_as(&host.name);
        self.set_info(format!("Saved host {}", host.name));
    }

    fn start_connect(&mut self, host: Host) {
        if self.db_status == DbStatus::Connecting {
            self.set_info("Already connecting");
            return;
        }
        self.db_status = DbStatus::Connecting;
        self.set_info(format!(
            "Connecting to {} {}...",
            host.db_type.label(),
            host.address()
        ));

        let tx = self.db_events_tx.clone();
        let row_limit = self.config.connection.row_limit;
        let timeout = self.config.connection.connect_timeout();

        self.rt.spawn(async move {
            match db::connect(&host, row_limit, timeout).await {
                Ok(driver) => {
                    let database = driver.database().await;
                    let _ = tx.send(DbEvent::Connected {
                        driver,
                        host,
                        database,
                    });
                }
                Err(e) => {
                    let _ = tx.send(DbEvent::ConnectError {
                        error: format_error_chain(&e),
                    });
                }
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Database screen
    // ─────────────────────────────────────────────────────────────────────

    fn set_focus(&mut self, focus: Focus) {
        if self.focus == Focus::Query && focus != Focus::Query {
            self.editor.blur();
        }
        self.focus = focus;
    }

    fn focused_list_is_filtering(&self) -> bool {
        match self.focus {
            Focus::Databases => self.databases.is_editing_filter(),
            Focus::Tables => self.tables.is_editing_filter(),
            Focus::History => self.history_list.is_editing_filter(),
            Focus::Query | Focus::Grid => false,
        }
    }

    fn handle_database_key(&mut self, key: Key, event: &InputEvent) {
        if key == Key::Ctrl('c') {
            if self.tracker.is_running() {
                self.cancel_query();
            } else {
                self.disconnect();
            }
            return;
        }

        match self.focus {
            Focus::Query => {
                let idle = self.editor.mode().is_normal() && self.editor.pending_keys().is_empty();
                match key {
                    Key::Tab if idle => self.set_focus(self.focus.next()),
                    Key::BackTab if idle => self.set_focus(self.focus.prev()),
                    _ => {
                        let action = self.editor.handle_input(event);
                        self.apply_editor_action(action);
                    }
                }
            }
            Focus::Grid => match key {
                Key::Tab => self.set_focus(self.focus.next()),
                Key::BackTab => self.set_focus(self.focus.prev()),
                Key::Char('c') => self.set_focus(Focus::Query),
                Key::Char('q') => self.should_quit = true,
                _ => {
                    let action = self.grid.handle_input(event);
                    self.apply_grid_action(action);
                }
            },
            list => {
                if !self.focused_list_is_filtering() {
                    match key {
                        Key::Tab | Key::Char('l') | Key::Right => {
                            self.set_focus(list.next());
                            return;
                        }
                        Key::BackTab | Key::Char('h') | Key::Left => {
                            self.set_focus(list.prev());
                            return;
                        }
                        Key::Char('c') => {
                            self.set_focus(Focus::Query);
                            return;
                        }
                        Key::Char('q') => {
                            self.should_quit = true;
                            return;
                        }
                        _ => {}
                    }
                }
                self.list_input(list, event);
            }
        }
    }

    fn list_input(&mut self, list: Focus, event: &InputEvent) {
        match list {
            Focus::Databases => {
                let action = self.databases.handle_input(event);
                self.apply_database_action(action);
            }
            Focus::Tables => {
                let action = self.tables.handle_input(event);
                self.apply_table_action(action);
            }
            Focus::History => {
                let action = self.history_list.handle_input(event);
                self.apply_history_action(action);
            }
            Focus::Query | Focus::Grid => {}
        }
    }

    fn list_click(&mut self, list: Focus, row: usize, at: Instant) {
        match list {
            Focus::Databases => {
                let action = self.databases.click_row(row, at);
                self.apply_database_action(action);
            }
            Focus::Tables => {
                let action = self.tables.click_row(row, at);
                self.apply_table_action(action);
            }
            Focus::History => {
                let action = self.history_list.click_row(row, at);
                self.apply_history_action(action);
            }
            Focus::Query | Focus::Grid => {}
        }
    }

    fn apply_editor_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::None => {}
            EditorAction::Execute(query) => self.execute_query(query, true),
            EditorAction::Yank(text) => self.copy(&text),
            EditorAction::Leave => self.set_focus(Focus::Tables),
        }
    }

    fn apply_grid_action(&mut self, action: GridAction) {
        match action {
            GridAction::None => {}
            GridAction::CopyCell(text) => self.copy(&text),
        }
    }

    fn apply_database_action(&mut self, action: ListAction<String>) {
        match action {
            ListAction::Selected(name) => self.switch_database(name),
            ListAction::Reselected(_) => self.set_focus(Focus::Tables),
            ListAction::None => {}
        }
    }

    fn apply_table_action(&mut self, action: ListAction<TableRef>) {
        match action {
            ListAction::Selected(table) => self.preview_table(&table),
            ListAction::Reselected(_) => self.set_focus(Focus::Query),
            ListAction::None => {}
        }
    }

    fn apply_history_action(&mut self, action: ListAction<HistoryEntry>) {
        match action {
            ListAction::Selected(entry) | ListAction::Reselected(entry) => {
                self.editor.set_text(&entry.query);
                self.grid.clear();
                self.last_rows = None;
                self.set_focus(Focus::Query);
            }
            ListAction::None => {}
        }
    }

    fn copy(&mut self, text: &str) {
        match self.clipboard.copy(text) {
            Ok(msg) => self.set_info(msg),
            Err(e) => self.show_error(format_error_chain(&e)),
        }
    }

    fn preview_table(&mut self, table: &TableRef) {
        let Some(driver) = self.driver.clone() else {
            return;
        };
        let sql = driver.query_for_table(table, self.config.connection.row_limit);
        self.activity
            .push(format!("Selecting data for table {}", table.qualified_name()));
        self.editor.set_text(&sql);
        self.execute_query(sql, false);
    }

    fn execute_query(&mut self, query: String, record: bool) {
        if query.trim().is_empty() {
            self.set_info("No query to run");
            return;
        }
        let Some(driver) = self.driver.clone() else {
            self.set_error("Not connected");
            return;
        };

        let (id, superseded) = self.tracker.begin();
        if let Some(old) = superseded {
            debug!(old, id, "superseding running query");
            let driver = Arc::clone(&driver);
            self.rt.spawn(async move {
                if let Err(e) = driver.cancel_query(old).await {
                    warn!(old, error = %e, "failed to cancel superseded query");
                }
            });
        }

        debug!(id, query = %single_line(&query), "executing query");
        self.activity
            .push(format!("Executing query: {}", single_line(&query)));
        self.grid.set_loading(true);
        self.set_info("Running...");

        let tx = self.db_events_tx.clone();
        self.rt.spawn(async move {
            match driver.query(id, &query).await {
                Ok(result) => {
                    let _ = tx.send(DbEvent::QueryFinished {
                        id,
                        result,
                        record: record.then_some(query),
                    });
                }
                Err(e) => {
                    let _ = tx.send(DbEvent::QueryError {
                        id,
                        error: format_error_chain(&e),
                    });
                }
            }
        });
    }

    fn cancel_query(&mut self) {
        let Some(id) = self.tracker.cancel() else {
            return;
        };
        debug!(id, "cancelling query");
        self.grid.set_loading(false);
        self.set_info("Cancelling...");

        let Some(driver) = self.driver.clone() else {
            return;
        };
        let tx = self.db_events_tx.clone();
        self.rt.spawn(async move {
            let sent = driver
                .cancel_query(id)
                .await
                .map_err(|e| format_error_chain(&e));
            let _ = tx.send(DbEvent::CancelFinished { sent });
        });
    }

    fn disconnect(&mut self) {
        self.activity.push("Disconnecting");
        self.tracker.cancel();
        if let Some(driver) = self.driver.take() {
            self.rt.spawn(async move { driver.close().await });
        }
        self.editor.blur();
        self.grid.clear();
        self.last_rows = None;
        self.db_status = DbStatus::Disconnected;
        self.active_host = None;
        self.current_database = None;
        self.screen = Screen::Hosts;
        self.hosts_focus = HostsFocus::List;
        self.set_info("Disconnected");
    }

    fn switch_database(&mut self, name: String) {
        let Some(driver) = self.driver.clone() else {
            return;
        };
        self.activity.push(format!(
            "Changing database from {} to {name}",
            self.current_database.as_deref().unwrap_or("(none)")
        ));
        self.set_info(format!("Switching to {name}..."));
        let tx = self.db_events_tx.clone();
        self.rt.spawn(async move {
            let event = match driver.select_database(&name).await {
                Ok(()) => DbEvent::DatabaseSwitched { name },
                Err(e) => DbEvent::MetadataError {
                    error: format_error_chain(&e),
                },
            };
            let _ = tx.send(event);
        });
    }

    fn load_databases(&mut self) {
        let Some(driver) = self.driver.clone() else {
            return;
        };
        let tx = self.db_events_tx.clone();
        self.rt.spawn(async move {
            let event = match driver.databases().await {
                Ok(databases) => DbEvent::DatabasesLoaded { databases },
                Err(e) => DbEvent::MetadataError {
                    error: format_error_chain(&e),
                },
            };
            let _ = tx.send(event);
        });
    }

    fn load_tables(&mut self) {
        let Some(driver) = self.driver.clone() else {
            return;
        };
        let database = self.current_database.clone();
        let tx = self.db_events_tx.clone();
        self.rt.spawn(async move {
            let event = match driver.tables().await {
                Ok(tables) => DbEvent::TablesLoaded { database, tables },
                Err(e) => DbEvent::MetadataError {
                    error: format_error_chain(&e),
                },
            };
            let _ = tx.send(event);
        });
    }

    fn record_history(&mut self, query: &str) {
        if let Some(entry) = self.history.push(query).cloned() {
            self.history_list.set_content(self.history.entries().to_vec());
            self.history_list.set_selected(Some(entry));
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Background events
    // ─────────────────────────────────────────────────────────────────────

    fn drain_db_events(&mut self) {
        while let Ok(ev) = self.db_events_rx.try_recv() {
            self.apply_db_event(ev);
        }
    }

    fn apply_db_event(&mut self, ev: DbEvent) {
        match ev {
            DbEvent::Connected {
                driver,
                host,
                database,
            } => {
                if self.db_status != DbStatus::Connecting {
                    // The attempt was abandoned.
                    self.rt.spawn(async move { driver.close().await });
                    return;
                }
                info!(host = %host.name, database = ?database, "connected");
                self.db_status = DbStatus::Connected;
                self.driver = Some(driver);
                self.set_info(format!("Connected to {}", host.address()));
                self.active_host = Some(host);
                self.current_database = database;
                self.tracker = QueryTracker::new();

                self.databases.set_content(Vec::new());
                self.databases.set_selected(self.current_database.clone());
                self.tables.set_content(Vec::new());
                self.tables.set_selected(None);
                self.editor.set_text("");
                self.grid.clear();
                self.last_rows = None;

                self.screen = Screen::Database;
                self.focus = Focus::Databases;
                self.load_databases();
                self.load_tables();
            }
            DbEvent::ConnectError { error } => {
                if self.db_status != DbStatus::Connecting {
                    return;
                }
                self.db_status = DbStatus::Disconnected;
                self.show_error(format!("Connection failed: {error}"));
            }
            DbEvent::DatabasesLoaded { databases } => {
                self.databases.set_content(databases);
            }
            DbEvent::DatabaseSwitched { name } => {
                info!(database = %name, "database switched");
                self.set_info(format!("Using database {name}"));
                self.current_database = Some(name.clone());
                self.databases.set_selected(Some(name));
                self.tables.set_content(Vec::new());
                self.tables.set_selected(None);
                self.load_tables();
            }
            DbEvent::TablesLoaded { database, tables } => {
                if database != self.current_database {
                    return;
                }
                self.tables.set_content(tables);
            }
            DbEvent::MetadataError { error } => {
                self.databases.set_selected(self.current_database.clone());
                self.show_error(error);
            }
            DbEvent::QueryFinished { id, result, record } => {
                if !self.tracker.finish(id) {
                    debug!(id, "dropping superseded result");
                    return;
                }
                self.grid.set_loading(false);
                let rows = result.rows.len();
                match self.grid.set_content(result.headers, result.rows) {
                    Ok(()) => {
                        self.last_rows = Some((rows, result.truncated));
                        let mut msg = result
                            .command_tag
                            .unwrap_or_else(|| "Query complete".to_string());
                        msg.push_str(&format!(" ({} ms)", result.elapsed.as_millis()));
                        if result.truncated {
                            msg.push_str(" [truncated]");
                        }
                        self.set_info(msg);
                    }
                    Err(e) => self.set_error(e.to_string()),
                }
                if let Some(query) = record {
                    self.record_history(&query);
                }
            }
            DbEvent::QueryError { id, error } => {
                if !self.tracker.finish(id) {
                    debug!(id, "dropping superseded error");
                    return;
                }
                self.grid.set_loading(false);
                self.show_error(error);
            }
            DbEvent::CancelFinished { sent } => match sent {
                Ok(true) => self.set_info("Query cancelled"),
                Ok(false) => self.set_info("Query already finished"),
                Err(e) => self.set_error(format!("Cancel failed: {e}")),
            },
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mouse
    // ─────────────────────────────────────────────────────────────────────

    fn pane_at(&self, pos: Position) -> Option<Focus> {
        let a = &self.areas;
        [
            (a.databases, Focus::Databases),
            (a.tables, Focus::Tables),
            (a.history, Focus::History),
            (a.editor, Focus::Query),
            (a.grid, Focus::Grid),
        ]
        .into_iter()
        .find(|(area, _)| area.contains(pos))
        .map(|(_, focus)| focus)
    }

    fn list_area(&self, list: Focus) -> Rect {
        match list {
            Focus::Databases => self.areas.databases,
            Focus::Tables => self.areas.tables,
            Focus::History => self.areas.history,
            Focus::Query => self.areas.editor,
            Focus::Grid => self.areas.grid,
        }
    }

    fn handle_pointer(&mut self, pointer: Pointer, event: &InputEvent) {
        let pos = Position::new(pointer.column, pointer.row);
        let click = pointer.kind == PointerKind::Click;

        if click && self.areas.status.contains(pos) {
            self.status_clicked(event.at);
            return;
        }

        if self.screen == Screen::Hosts {
            if self.areas.hosts.contains(pos) {
                if !click {
                    let action = self.hosts.handle_input(event);
                    self.apply_hosts_action(action);
                    return;
                }
                self.hosts_focus = HostsFocus::List;
                let inner = ListView::<HostChoice>::inner_area(self.areas.hosts);
                if inner.contains(pos) {
                    let action = self.hosts.click_row((pos.y - inner.y) as usize, event.at);
                    self.apply_hosts_action(action);
                }
            } else if click && self.areas.form.contains(pos) {
                self.hosts_focus = HostsFocus::Form;
            }
            return;
        }

        let Some(target) = self.pane_at(pos) else {
            return;
        };
        if !click {
            // Wheel scrolls the pane under the pointer without focusing it.
            match target {
                Focus::Query => {
                    self.editor.handle_input(event);
                }
                Focus::Grid => {
                    self.grid.handle_input(event);
                }
                list => self.list_input(list, event),
            }
            return;
        }

        self.set_focus(target);
        match target {
            Focus::Query => {
                let inner = EditorView::inner_area(self.areas.editor);
                if inner.contains(pos) {
                    let line = self.editor.scroll_top() + (pos.y - inner.y) as usize;
                    self.editor.click(line, (pos.x - inner.x) as usize);
                }
            }
            Focus::Grid => {
                let inner = GridView::inner_area(self.areas.grid);
                if inner.contains(pos) {
                    self.grid
                        .click((pos.x - inner.x) as usize, (pos.y - inner.y) as usize);
                }
            }
            list => {
                let inner = ListView::<String>::inner_area(self.list_area(list));
                if inner.contains(pos) {
                    self.list_click(list, (pos.y - inner.y) as usize, event.at);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(frame.area());

        match self.screen {
            Screen::Hosts => self.draw_hosts(frame, chunks[0]),
            Screen::Database => self.draw_database(frame, chunks[0]),
        }

        self.areas.status = chunks[1];
        let line = self.status_line().build(chunks[1].width);
        frame.render_widget(Paragraph::new(line), chunks[1]);

        if let Some(viewer) = self.log_viewer {
            self.draw_log(frame, viewer);
        }

        if let Some(err) = &self.last_error {
            let popup = centered_rect(60, 30, frame.area());
            frame.render_widget(Clear, popup);
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Error (Enter to dismiss)")
                .border_style(Style::default().fg(Color::Red));
            frame.render_widget(
                Paragraph::new(err.as_str())
                    .block(block)
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: false }),
                popup,
            );
        }
    }

    fn draw_log(&self, frame: &mut Frame, viewer: LogViewer) {
        let area = frame.area();
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Log ({} entries, Esc to close)", self.activity.len()))
            .border_style(Style::default().fg(Color::Cyan));
        let height = block.inner(area).height as usize;
        let lines: Vec<Line> = self
            .activity
            .newest_first()
            .skip(viewer.offset)
            .take(height)
            .map(|entry| {
                let style = if entry.line.starts_with("[Error]") {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                Line::styled(entry.render(), style)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_hosts(&mut self, frame: &mut Frame, area: Rect) {
        let cols = Layout::horizontal([Constraint::Percentage(35), Constraint::Min(30)]).split(area);
        self.areas = PaneAreas {
            hosts: cols[0],
            form: cols[1],
            ..Default::default()
        };

        let inner = ListView::<HostChoice>::inner_area(cols[0]);
        self.hosts.set_viewport_height(inner.height as usize);
        frame.render_widget(
            ListView {
                list: &self.hosts,
                focused: self.hosts_focus == HostsFocus::List,
            },
            cols[0],
        );
        self.host_form
            .render(frame, cols[1], self.hosts_focus == HostsFocus::Form);
    }

    fn draw_database(&mut self, frame: &mut Frame, area: Rect) {
        let cols = Layout::horizontal([Constraint::Percentage(25), Constraint::Min(20)]).split(area);
        let left = Layout::vertical([
            Constraint::Percentage(25),
            Constraint::Percentage(45),
            Constraint::Percentage(30),
        ])
        .split(cols[0]);
        let right =
            Layout::vertical([Constraint::Percentage(30), Constraint::Min(5)]).split(cols[1]);

        self.areas = PaneAreas {
            databases: left[0],
            tables: left[1],
            history: left[2],
            editor: right[0],
            grid: right[1],
            ..Default::default()
        };

        self.databases
            .set_viewport_height(ListView::<String>::inner_area(left[0]).height as usize);
        self.tables
            .set_viewport_height(ListView::<String>::inner_area(left[1]).height as usize);
        self.history_list
            .set_viewport_height(ListView::<String>::inner_area(left[2]).height as usize);
        let grid_inner = GridView::inner_area(right[1]);
        self.grid
            .set_viewport(grid_inner.width as usize, grid_inner.height as usize);
        self.editor
            .scroll_to_cursor(EditorView::inner_area(right[0]).height as usize);

        frame.render_widget(
            ListView {
                list: &self.databases,
                focused: self.focus == Focus::Databases,
            },
            left[0],
        );
        frame.render_widget(
            ListView {
                list: &self.tables,
                focused: self.focus == Focus::Tables,
            },
            left[1],
        );
        frame.render_widget(
            ListView {
                list: &self.history_list,
                focused: self.focus == Focus::History,
            },
            left[2],
        );

        let text = self.editor.text();
        let highlights: &[Style] = match self.highlighter.as_mut() {
            Some(highlighter) => highlighter.styles(&text),
            None => &[],
        };
        let editor_view = EditorView {
            editor: &self.editor,
            highlights,
            focused: self.focus == Focus::Query,
        };
        let cursor = editor_view.cursor_position(right[0]);
        frame.render_widget(editor_view, right[0]);

        frame.render_widget(
            GridView {
                grid: &self.grid,
                throbber: &self.throbber,
                focused: self.focus == Focus::Grid,
            },
            right[1],
        );

        if self.focus == Focus::Query {
            if let Some(pos) = cursor {
                frame.set_cursor_position(pos);
            }
        }
    }

    fn status_line(&self) -> StatusLine {
        let editing = self.screen == Screen::Database && self.focus == Focus::Query;
        StatusLine {
            connection: self.active_host.as_ref().map(Host::address),
            database: self.current_database.clone(),
            mode: editing.then(|| self.editor.mode().label()),
            pending: if editing {
                self.editor.pending_keys().to_string()
            } else {
                String::new()
            },
            running: self.tracker.is_running() || self.db_status == DbStatus::Connecting,
            rows: self.last_rows,
            message: self.message.clone(),
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let rows = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(rows[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;

    /// Echoes each query back and records cancel requests.
    #[derive(Default)]
    struct FakeDriver {
        cancelled: std::sync::Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl Driver for FakeDriver {
        async fn databases(&self) -> Result<Vec<String>> {
            Ok(vec!["app".to_string(), "postgres".to_string()])
        }

        async fn database(&self) -> Option<String> {
            Some("postgres".to_string())
        }

        async fn select_database(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        async fn tables(&self) -> Result<Vec<TableRef>> {
            Ok(vec![TableRef::new("public", "users")])
        }

        fn query_for_table(&self, table: &TableRef, limit: usize) -> String {
            format!("SELECT * FROM {} LIMIT {}", table.name, limit)
        }

        async fn query(&self, _id: u64, sql: &str) -> Result<QueryResult> {
            Ok(QueryResult {
                headers: vec!["query".to_string()],
                rows: vec![vec![sql.to_string()]],
                command_tag: Some("SELECT 1".to_string()),
                truncated: false,
                elapsed: Duration::ZERO,
            })
        }

        async fn cancel_query(&self, id: u64) -> Result<bool> {
            self.cancelled.lock().unwrap().push(id);
            Ok(false)
        }

        async fn close(&self) {}
    }

    fn new_app(rt: &tokio::runtime::Runtime) -> App {
        App::new(
            Config::default(),
            vec![Host::local(5432)],
            History::in_memory(100),
            None,
            rt.handle().clone(),
        )
    }

    fn connected_with(rt: &tokio::runtime::Runtime, driver: Arc<FakeDriver>) -> App {
        let mut app = new_app(rt);
        app.db_status = DbStatus::Connecting;
        app.apply_db_event(DbEvent::Connected {
            driver,
            host: Host::local(5432),
            database: Some("postgres".to_string()),
        });
        app
    }

    fn connected_app(rt: &tokio::runtime::Runtime) -> App {
        connected_with(rt, Arc::new(FakeDriver::default()))
    }

    /// Applies background events until one matches `done`.
    fn wait_for(rt: &tokio::runtime::Runtime, app: &mut App, done: fn(&DbEvent) -> bool) {
        loop {
            let ev = rt
                .block_on(async {
                    tokio::time::timeout(Duration::from_secs(5), app.db_events_rx.recv()).await
                })
                .expect("timed out waiting for event")
                .expect("channel closed");
            let finished = done(&ev);
            app.apply_db_event(ev);
            if finished {
                return;
            }
        }
    }

    fn press(app: &mut App, key: Key) {
        app.handle_input(InputEvent::key(key, Instant::now()));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, Key::Char(c));
        }
    }

    #[test]
    fn test_connect_switches_to_database_screen() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        assert_eq!(app.screen(), Screen::Database);
        assert_eq!(app.db_status(), DbStatus::Connected);
        wait_for(&rt, &mut app, |ev| matches!(ev, DbEvent::TablesLoaded { .. }));
        assert_eq!(app.tables.items().len(), 1);
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        press(&mut app, Key::Char('c'));
        assert_eq!(app.focus(), Focus::Query);
        press(&mut app, Key::Enter);
        assert_eq!(
            app.message(),
            Some(&StatusMessage::Info("No query to run".to_string()))
        );
        assert!(!app.grid().is_loading());
    }

    #[test]
    fn test_executed_query_fills_grid_and_history() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        press(&mut app, Key::Char('c'));
        press(&mut app, Key::Char('i'));
        type_str(&mut app, "select 1");
        press(&mut app, Key::Esc);
        press(&mut app, Key::Enter);
        assert!(app.grid().is_loading());

        wait_for(&rt, &mut app, |ev| matches!(ev, DbEvent::QueryFinished { .. }));
        assert!(!app.grid().is_loading());
        assert_eq!(app.grid().current_cell(), Some("select 1"));
        assert_eq!(app.history().entries()[0].query, "select 1");
    }

    #[test]
    fn test_table_preview_is_not_recorded() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        wait_for(&rt, &mut app, |ev| matches!(ev, DbEvent::TablesLoaded { .. }));

        press(&mut app, Key::Tab);
        assert_eq!(app.focus(), Focus::Tables);
        press(&mut app, Key::Enter);
        assert_eq!(app.editor().text(), "SELECT * FROM users LIMIT 9999");

        wait_for(&rt, &mut app, |ev| matches!(ev, DbEvent::QueryFinished { .. }));
        assert_eq!(app.grid().row_count(), 1);
        assert!(app.history().is_empty());

        // Committing the same table again moves to the editor.
        press(&mut app, Key::Enter);
        assert_eq!(app.focus(), Focus::Query);
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        app.execute_query("select 1".to_string(), true);
        app.execute_query("select 2".to_string(), true);

        let stale = QueryResult {
            headers: vec!["a".to_string()],
            rows: vec![vec!["stale".to_string()]],
            command_tag: None,
            truncated: false,
            elapsed: Duration::ZERO,
        };
        app.apply_db_event(DbEvent::QueryFinished {
            id: 1,
            result: stale,
            record: Some("select 1".to_string()),
        });
        assert_eq!(app.grid().row_count(), 0);
        assert!(app.grid().is_loading());
        assert!(app.history().is_empty());

        app.apply_db_event(DbEvent::QueryError {
            id: 2,
            error: "boom".to_string(),
        });
        assert!(!app.grid().is_loading());
        assert_eq!(
            app.message(),
            Some(&StatusMessage::Error("boom".to_string()))
        );
    }

    #[test]
    fn test_error_panel_absorbs_keys_until_dismissed() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        app.show_error("relation \"nope\" does not exist");
        assert!(app.last_error().is_some());

        press(&mut app, Key::Char('q'));
        assert!(!app.should_quit());
        assert!(app.last_error().is_some());

        press(&mut app, Key::Enter);
        assert!(app.last_error().is_none());
        press(&mut app, Key::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_leaving_editor_commits_insert_session() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        press(&mut app, Key::Char('c'));
        press(&mut app, Key::Char('i'));
        type_str(&mut app, "abc");
        assert!(app.editor().mode().is_insert());

        app.set_focus(Focus::Grid);
        assert!(app.editor().mode().is_normal());
        assert!(app.editor().can_undo());
    }

    #[test]
    fn test_ctrl_c_when_idle_disconnects() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        press(&mut app, Key::Ctrl('c'));
        assert_eq!(app.screen(), Screen::Hosts);
        assert_eq!(app.db_status(), DbStatus::Disconnected);
    }

    #[test]
    fn test_q_quits_from_lists() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = new_app(&rt);
        press(&mut app, Key::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_history_selection_loads_editor() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        app.record_history("select 42");
        app.set_focus(Focus::History);
        press(&mut app, Key::Enter);
        assert_eq!(app.focus(), Focus::Query);
        assert_eq!(app.editor().text(), "select 42");
        assert!(!app.editor().can_undo());
    }

    #[test]
    fn test_save_host_writes_profile() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.yaml");
        let mut app = App::new(
            Config::default(),
            Vec::new(),
            History::in_memory(10),
            Some(path.clone()),
            rt.handle().clone(),
        );

        press(&mut app, Key::Tab);
        type_str(&mut app, "dev");
        press(&mut app, Key::Ctrl('s'));

        let saved = crate::config::load_hosts_from(&path, 5432).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "dev");
        assert_eq!(app.hosts.items().len(), 2);
    }

    #[test]
    fn test_draw_both_screens() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = new_app(&rt);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        assert!(app.areas.hosts.width > 0);

        let mut app = connected_app(&rt);
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let (width, height) = app.grid().viewport();
        assert!(width > 0 && height > 0);
    }

    #[test]
    fn test_superseded_query_is_cancelled_by_id() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let driver = Arc::new(FakeDriver::default());
        let mut app = connected_with(&rt, Arc::clone(&driver));
        app.execute_query("select 1".to_string(), true);
        app.execute_query("select 2".to_string(), true);

        let superseded = rt.block_on(async {
            for _ in 0..100 {
                if !driver.cancelled.lock().unwrap().is_empty() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            driver.cancelled.lock().unwrap().clone()
        });
        assert_eq!(superseded, vec![1]);

        app.cancel_query();
        wait_for(&rt, &mut app, |ev| matches!(ev, DbEvent::CancelFinished { .. }));
        assert_eq!(*driver.cancelled.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_activity_log_records_user_visible_events() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        app.execute_query("select\n  1".to_string(), true);
        app.show_error("syntax error");

        let lines: Vec<&str> = app
            .activity()
            .newest_first()
            .map(|e| e.line.as_str())
            .collect();
        assert_eq!(lines[0], "[Error]: syntax error");
        assert!(lines.contains(&"Executing query: select 1"));
        assert!(lines.contains(&"Connected to localhost:5432"));
    }

    #[test]
    fn test_status_double_click_opens_log_viewer() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = connected_app(&rt);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let row = app.areas.status.y;

        let t0 = Instant::now();
        app.handle_input(InputEvent::pointer(PointerKind::Click, 3, row, t0));
        assert!(!app.is_log_open());
        app.handle_input(InputEvent::pointer(
            PointerKind::Click,
            3,
            row,
            t0 + Duration::from_millis(900),
        ));
        assert!(!app.is_log_open());
        app.handle_input(InputEvent::pointer(
            PointerKind::Click,
            4,
            row,
            t0 + Duration::from_millis(1000),
        ));
        assert!(app.is_log_open());
        terminal.draw(|frame| app.draw(frame)).unwrap();

        // Keys go to the viewer until it is closed.
        press(&mut app, Key::Char('q'));
        assert!(!app.is_log_open());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_window_title_follows_database() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = new_app(&rt);
        assert_eq!(app.window_title(), "lazysql");

        app.db_status = DbStatus::Connecting;
        app.apply_db_event(DbEvent::Connected {
            driver: Arc::new(FakeDriver::default()),
            host: Host::local(5432),
            database: Some("postgres".to_string()),
        });
        assert_eq!(app.window_title(), "lazysql (postgres)");

        app.apply_db_event(DbEvent::DatabaseSwitched {
            name: "app".to_string(),
        });
        assert_eq!(app.window_title(), "lazysql (app)");

        press(&mut app, Key::Ctrl('c'));
        assert_eq!(app.window_title(), "lazysql");
    }

    #[test]
    fn test_highlighting_can_be_disabled() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut config = Config::default();
        config.editor.syntax_highlighting = false;
        let app = App::new(
            config,
            Vec::new(),
            History::in_memory(10),
            None,
            rt.handle().clone(),
        );
        assert!(app.highlighter.is_none());
        assert!(new_app(&rt).highlighter.is_some());
    }
}
