mod activity;
#[allow(clippy::module_inception)]
mod app;
mod state;

pub use activity::{ActivityLog, LogEntry, LogViewer, LOG_CAPACITY};
pub use app::{App, DbEvent};
pub use state::{DbStatus, Focus, HostChoice, HostsFocus, Screen};
