use std::env;
use std::io::{self, Stdout};

use anyhow::{bail, Context, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;

use lazysql::app::App;
use lazysql::config::{self, load_hosts};
use lazysql::history::History;
use lazysql::logging;

fn print_version() {
    println!("lazysql {}", env!("CARGO_PKG_VERSION"));
}

fn print_usage() {
    eprintln!("lazysql - A keyboard-first terminal SQL client");
    eprintln!();
    eprintln!("Usage: lazysql [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -h, --help            Print this help message");
    eprintln!("  -V, --version         Print version information");
    eprintln!("      --host-name NAME  Connect to a saved host profile on startup");
    eprintln!();
    eprintln!("Environment Variables:");
    eprintln!("  LAZYSQL_CONFIG_DIR    Override the configuration directory");
    eprintln!("  {}           Log filter (e.g. debug, lazysql=trace)", logging::LOG_ENV);
    eprintln!();
    eprintln!("Configuration:");
    if let Some(path) = config::config_path() {
        eprintln!("  Config file: {}", path.display());
    }
    if let Some(path) = config::hosts_path() {
        eprintln!("  Hosts file:  {}", path.display());
    }
}

fn host_name_arg(args: &[String]) -> Result<Option<String>> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if let Some(name) = arg.strip_prefix("--host-name=") {
            return Ok(Some(name.to_string()));
        }
        if arg == "--host-name" {
            return match iter.next() {
                Some(name) => Ok(Some(name.clone())),
                None => bail!("--host-name requires a value"),
            };
        }
    }
    Ok(None)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }

    if args.iter().any(|a| a == "-V" || a == "--version") {
        print_version();
        return Ok(());
    }

    let host_name = host_name_arg(&args)?;

    let cfg = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {:#}", e);
        config::Config::default()
    });

    if let Some(path) = config::log_path() {
        if let Err(e) = logging::init(&cfg.logging.level, &path) {
            eprintln!("Warning: Logging disabled: {:#}", e);
        }
    }

    let hosts = load_hosts(cfg.connection.default_port).context("failed to load host profiles")?;

    let startup_host = match host_name {
        Some(name) => match hosts.iter().find(|h| h.name == name) {
            Some(host) => Some(host.clone()),
            None => bail!("no host profile named '{}'", name),
        },
        None => None,
    };

    let history = if cfg.history.persist {
        History::load(cfg.history.max_entries).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load history: {:#}", e);
            History::in_memory(cfg.history.max_entries)
        })
    } else {
        History::in_memory(cfg.history.max_entries)
    };

    let rt = Runtime::new().context("failed to initialize tokio runtime")?;

    let mut terminal =
        init_terminal().context("failed to initialize terminal; are you running in a real TTY?")?;

    let mut app = App::new(cfg, hosts, history, config::hosts_path(), rt.handle().clone());
    if let Some(host) = startup_host {
        app.connect_host(host);
    }

    let res = app.run(&mut terminal);
    restore_terminal(terminal)?;
    res
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
