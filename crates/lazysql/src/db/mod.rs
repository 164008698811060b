//! Database access behind the [`Driver`] trait.

mod gate;
mod mysql;
mod postgres;
mod tracker;

pub use mysql::MysqlDriver;
pub use postgres::PostgresDriver;
pub use tracker::QueryTracker;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{DbType, Host};
use crate::ui::ListItem;

/// Result of one statement, already rendered to strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub command_tag: Option<String>,
    pub truncated: bool,
    pub elapsed: Duration,
}

/// A table qualified by its schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// `schema.name`, or just `name` for the `public` schema.
    pub fn qualified_name(&self) -> String {
        if self.schema.is_empty() || self.schema == "public" {
            self.name.clone()
        } else {
            format!("{}.{}", self.schema, self.name)
        }
    }
}

impl ListItem for TableRef {
    fn display(&self) -> String {
        self.qualified_name()
    }

    fn same_item(&self, other: &Self) -> bool {
        self == other
    }
}

/// Connection to one database server.
///
/// Implementations are shared between the UI thread and query tasks, so
/// every method takes `&self`.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Databases visible on the server.
    async fn databases(&self) -> Result<Vec<String>>;

    /// Database the connection currently uses, if any.
    async fn database(&self) -> Option<String>;

    /// Switches the connection to `name`.
    async fn select_database(&self, name: &str) -> Result<()>;

    /// Tables of the current database.
    async fn tables(&self) -> Result<Vec<TableRef>>;

    /// Preview query for a table.
    fn query_for_table(&self, table: &TableRef, limit: usize) -> String;

    /// Runs `sql` on behalf of submission `id`. Statements run one at a
    /// time in submission order.
    async fn query(&self, id: u64, sql: &str) -> Result<QueryResult>;

    /// Cancels submission `id`. A request reaches the server only while
    /// that submission's statement is executing; one still waiting for the
    /// connection is dropped instead. Returns false when it already finished.
    async fn cancel_query(&self, id: u64) -> Result<bool>;

    async fn close(&self);
}

/// Opens a connection with the driver for the profile's database type.
pub async fn connect(
    host: &Host,
    row_limit: usize,
    timeout: Duration,
) -> Result<Arc<dyn Driver>> {
    let driver: Arc<dyn Driver> = match host.db_type {
        DbType::Postgres => Arc::new(PostgresDriver::connect(host, row_limit, timeout).await?),
        DbType::Mysql => Arc::new(MysqlDriver::connect(host, row_limit, timeout).await?),
    };
    Ok(driver)
}

/// Quotes an identifier for use in generated SQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_table_display_hides_public_schema() {
        assert_eq!(TableRef::new("public", "users").display(), "users");
        assert_eq!(TableRef::new("audit", "log").display(), "audit.log");
    }

    #[test]
    fn test_tables_compare_by_schema_and_name() {
        let a = TableRef::new("public", "t");
        assert!(a.same_item(&TableRef::new("public", "t")));
        assert!(!a.same_item(&TableRef::new("other", "t")));
    }
}
