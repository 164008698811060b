use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Either, Executor, Row, ValueRef};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::gate::StatementGate;
use super::{Driver, QueryResult, TableRef};
use crate::config::Host;
use crate::util::format_mysql_error;

/// [`Driver`] for MySQL and MariaDB over `sqlx`.
///
/// Statements go through the text protocol so every value arrives already
/// rendered by the server.
pub struct MysqlDriver {
    options: MySqlConnectOptions,
    timeout: Duration,
    row_limit: usize,
    conn: Mutex<Option<MySqlConnection>>,
    /// Server thread id of `conn`, the target of `KILL QUERY`. Zero once
    /// closed.
    connection_id: AtomicU64,
    database: Mutex<Option<String>>,
    gate: StatementGate,
}

impl MysqlDriver {
    pub async fn connect(host: &Host, row_limit: usize, timeout: Duration) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&host.host)
            .port(host.port)
            .username(&host.user);
        if !host.password.is_empty() {
            options = options.password(&host.password);
        }
        if let Some(database) = &host.database {
            options = options.database(database);
        }

        let mut conn = open(&options, timeout).await?;
        let connection_id: u64 = sqlx::query_scalar("SELECT CONNECTION_ID()")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| anyhow!(format_mysql_error(&e)))?;
        info!(host = %host.host, port = host.port, connection_id, "connected");

        Ok(Self {
            options,
            timeout,
            row_limit,
            conn: Mutex::new(Some(conn)),
            connection_id: AtomicU64::new(connection_id),
            database: Mutex::new(host.database.clone()),
            gate: StatementGate::new(),
        })
    }

    async fn rows(&self, sql: &str) -> Result<Vec<Vec<String>>> {
        let _turn = self.gate.internal().await;
        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| anyhow!("Connection is closed"))?;
        let rows = conn
            .fetch_all(sqlx::raw_sql(sql))
            .await
            .map_err(|e| anyhow!(format_mysql_error(&e)))?;
        Ok(rows.iter().map(render_row).collect())
    }

    async fn run(&self, sql: &str) -> Result<QueryResult> {
        let started = Instant::now();
        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| anyhow!("Connection is closed"))?;

        let mut fold = ResultFold::new(self.row_limit);
        let mut stream = conn.fetch_many(sqlx::raw_sql(sql));
        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|e| anyhow!(format_mysql_error(&e)))?
        {
            match item {
                Either::Left(done) => fold.complete(done.rows_affected()),
                Either::Right(row) => fold.row(&row),
            }
        }
        Ok(fold.finish(started.elapsed()))
    }
}

async fn open(options: &MySqlConnectOptions, timeout: Duration) -> Result<MySqlConnection> {
    match tokio::time::timeout(timeout, options.connect()).await {
        Ok(conn) => conn.map_err(|e| anyhow!(format_mysql_error(&e))),
        Err(_) => bail!("Timed out after {}s", timeout.as_secs()),
    }
}

/// Backtick-quotes an identifier.
fn quote_mysql_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn render_row(row: &MySqlRow) -> Vec<String> {
    (0..row.len()).map(|i| render_cell(row, i)).collect()
}

fn render_cell(row: &MySqlRow, index: usize) -> String {
    match row.try_get_raw(index) {
        Ok(value) if value.is_null() => "NULL".to_string(),
        Ok(_) => match row.try_get_unchecked::<String, _>(index) {
            Ok(text) => text.replace('\r', ""),
            Err(_) => row
                .try_get_unchecked::<Vec<u8>, _>(index)
                .map(|bytes| String::from_utf8_lossy(&bytes).replace('\r', ""))
                .unwrap_or_default(),
        },
        Err(_) => String::new(),
    }
}

/// Keeps the last result set of a multi-statement run.
struct ResultFold {
    row_limit: usize,
    headers: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    last_headers: Vec<String>,
    last_rows: Vec<Vec<String>>,
    last_cmd: Option<String>,
    truncated: bool,
}

impl ResultFold {
    fn new(row_limit: usize) -> Self {
        Self {
            row_limit,
            headers: None,
            rows: Vec::new(),
            last_headers: Vec::new(),
            last_rows: Vec::new(),
            last_cmd: None,
            truncated: false,
        }
    }

    fn row(&mut self, row: &MySqlRow) {
        if self.headers.is_none() {
            self.headers = Some(row.columns().iter().map(|c| c.name().to_string()).collect());
        }
        if self.rows.len() < self.row_limit {
            self.rows.push(render_row(row));
        } else {
            self.truncated = true;
        }
    }

    fn complete(&mut self, rows_affected: u64) {
        match self.headers.take() {
            Some(headers) => {
                self.last_cmd = Some(format!("{} rows", self.rows.len()));
                self.last_headers = headers;
                self.last_rows = std::mem::take(&mut self.rows);
            }
            None => self.last_cmd = Some(format!("{rows_affected} rows")),
        }
    }

    fn finish(mut self, elapsed: Duration) -> QueryResult {
        if let Some(headers) = self.headers.take() {
            self.last_headers = headers;
            self.last_rows = self.rows;
        }
        let (headers, rows) = if self.last_headers.is_empty() {
            let status = self.last_cmd.clone().unwrap_or_else(|| "OK".to_string());
            (vec!["status".to_string()], vec![vec![status]])
        } else {
            (self.last_headers, self.last_rows)
        };
        QueryResult {
            headers,
            rows,
            command_tag: self.last_cmd,
            truncated: self.truncated,
            elapsed,
        }
    }
}

#[async_trait]
impl Driver for MysqlDriver {
    async fn databases(&self) -> Result<Vec<String>> {
        let rows = self.rows("SHOW DATABASES").await?;
        Ok(rows.into_iter().filter_map(|r| r.into_iter().next()).collect())
    }

    async fn database(&self) -> Option<String> {
        self.database.lock().await.clone()
    }

    async fn select_database(&self, name: &str) -> Result<()> {
        self.rows(&format!("USE {}", quote_mysql_identifier(name)))
            .await?;
        *self.database.lock().await = Some(name.to_string());
        info!(database = name, "switched database");
        Ok(())
    }

    /// Tables of the selected database; empty until one is selected.
    async fn tables(&self) -> Result<Vec<TableRef>> {
        if self.database.lock().await.is_none() {
            return Ok(Vec::new());
        }
        let rows = self
            .rows(
                "SELECT table_schema, table_name FROM information_schema.tables \
                 WHERE table_schema = DATABASE() \
                 ORDER BY table_name",
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.as_slice() {
                [schema, name] => Some(TableRef::new(schema.as_str(), name.as_str())),
                _ => None,
            })
            .collect())
    }

    fn query_for_table(&self, table: &TableRef, limit: usize) -> String {
        format!(
            "SELECT *\nFROM {}.{}\nLIMIT {}",
            quote_mysql_identifier(&table.schema),
            quote_mysql_identifier(&table.name),
            limit
        )
    }

    async fn query(&self, id: u64, sql: &str) -> Result<QueryResult> {
        let Some(turn) = self.gate.begin(id).await else {
            bail!("Query cancelled");
        };
        let outcome = self.run(sql).await;
        self.gate.finish(turn).await;

        let result = outcome?;
        debug!(
            id,
            rows = result.rows.len(),
            truncated = result.truncated,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "query finished"
        );
        Ok(result)
    }

    async fn cancel_query(&self, id: u64) -> Result<bool> {
        let connection_id = self.connection_id.load(Ordering::SeqCst);
        if connection_id == 0 {
            return Ok(false);
        }
        let options = self.options.clone();
        let timeout = self.timeout;
        let sent = self
            .gate
            .cancel(id, || async move {
                let mut killer = open(&options, timeout).await?;
                let sql = format!("KILL QUERY {connection_id}");
                killer
                    .execute(sqlx::raw_sql(&sql))
                    .await
                    .map_err(|e| anyhow!(format_mysql_error(&e)))?;
                if let Err(e) = killer.close().await {
                    warn!(error = %e, "failed to close cancel connection");
                }
                Ok(())
            })
            .await?;
        if sent {
            info!(id, "query cancelled");
        }
        Ok(sent)
    }

    async fn close(&self) {
        self.connection_id.store(0, Ordering::SeqCst);
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            if let Err(e) = conn.close().await {
                warn!(error = %e, "connection closed with error");
            }
            info!("connection closed");
        }
    }
}
