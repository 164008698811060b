use std::error::Error as StdError;

/// Format a postgres error with its full chain of causes
pub fn format_pg_error(e: &tokio_postgres::Error) -> String {
    let mut msg = e.to_string();

    // Try to get the database error details
    if let Some(db_err) = e.as_db_error() {
        msg = db_err.to_string();
    } else if let Some(source) = e.source() {
        // Fall back to source error
        msg = format!("{}: {}", msg, source);
    }

    msg
}

/// Format a MySQL error, preferring the server's own message
pub fn format_mysql_error(e: &sqlx::Error) -> String {
    match e.as_database_error() {
        Some(db_err) => match db_err.code() {
            Some(code) => format!("ERROR {}: {}", code, db_err.message()),
            None => format!("ERROR: {}", db_err.message()),
        },
        None => e.to_string(),
    }
}

/// Collapse a query onto one line for list entries and status messages.
pub fn single_line(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shorten `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Render an anyhow error with its context chain on one line.
pub fn format_error_chain(e: &anyhow::Error) -> String {
    single_line(&format!("{e:#}"))
}
