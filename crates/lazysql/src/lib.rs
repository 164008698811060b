pub mod app;
pub mod clipboard;
pub mod config;
pub mod db;
pub mod history;
pub mod logging;
pub mod ui;
pub mod util;
pub mod vim;
