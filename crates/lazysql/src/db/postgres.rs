use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_postgres::{CancelToken, Client, Config, NoTls, SimpleQueryMessage};
use tracing::{debug, info, warn};

use super::gate::StatementGate;
use super::{quote_identifier, Driver, QueryResult, TableRef};
use crate::config::Host;
use crate::util::format_pg_error;

/// Database used for the first connection when the profile names none.
pub const DEFAULT_DATABASE: &str = "postgres";

struct Session {
    client: Arc<Client>,
    cancel_token: CancelToken,
    database: String,
}

/// [`Driver`] for PostgreSQL over `tokio-postgres`.
pub struct PostgresDriver {
    config: Config,
    row_limit: usize,
    session: Mutex<Option<Session>>,
    gate: StatementGate,
}

impl PostgresDriver {
    pub async fn connect(host: &Host, row_limit: usize, timeout: Duration) -> Result<Self> {
        let mut config = Config::new();
        config
            .host(&host.host)
            .port(host.port)
            .user(&host.user)
            .application_name("lazysql")
            .connect_timeout(timeout);
        if !host.password.is_empty() {
            config.password(&host.password);
        }

        let database = host
            .database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let session = open_session(&config, &database).await?;
        info!(host = %host.host, port = host.port, %database, "connected");

        Ok(Self {
            config,
            row_limit,
            session: Mutex::new(Some(session)),
            gate: StatementGate::new(),
        })
    }

    async fn client(&self) -> Result<Arc<Client>> {
        let guard = self.session.lock().await;
        guard
            .as_ref()
            .map(|s| Arc::clone(&s.client))
            .ok_or_else(|| anyhow!("Connection is closed"))
    }

    async fn rows(&self, sql: &str) -> Result<Vec<Vec<String>>> {
        let _turn = self.gate.internal().await;
        let client = self.client().await?;
        let messages = client
            .simple_query(sql)
            .await
            .map_err(|e| anyhow!(format_pg_error(&e)))?;
        Ok(messages
            .into_iter()
            .filter_map(|msg| match msg {
                SimpleQueryMessage::Row(row) => Some(
                    (0..row.len())
                        .map(|i| row.get(i).unwrap_or_default().to_string())
                        .collect(),
                ),
                _ => None,
            })
            .collect())
    }
}

async fn open_session(base: &Config, database: &str) -> Result<Session> {
    let mut config = base.clone();
    config.dbname(database);

    let (client, connection) = config
        .connect(NoTls)
        .await
        .map_err(|e| anyhow!(format_pg_error(&e)))
        .with_context(|| format!("Failed to connect to database {database}"))?;

    // Drive the connection until the client is dropped.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            warn!(error = %format_pg_error(&e), "connection closed with error");
        }
    });

    let cancel_token = client.cancel_token();
    Ok(Session {
        client: Arc::new(client),
        cancel_token,
        database: database.to_string(),
    })
}

#[async_trait]
impl Driver for PostgresDriver {
    async fn databases(&self) -> Result<Vec<String>> {
        let rows = self
            .rows(
                "SELECT datname FROM pg_database \
                 WHERE datallowconn AND NOT datistemplate \
                 ORDER BY datname",
            )
            .await?;
        Ok(rows.into_iter().filter_map(|r| r.into_iter().next()).collect())
    }

    async fn database(&self) -> Option<String> {
        let guard = self.session.lock().await;
        guard.as_ref().map(|s| s.database.clone())
    }

    async fn select_database(&self, name: &str) -> Result<()> {
        let session = open_session(&self.config, name).await?;
        let _turn = self.gate.internal().await;
        let mut guard = self.session.lock().await;
        *guard = Some(session);
        info!(database = name, "switched database");
        Ok(())
    }

    async fn tables(&self) -> Result<Vec<TableRef>> {
        let rows = self
            .rows(
                "SELECT table_schema, table_name FROM information_schema.tables \
                 WHERE table_schema NOT IN ('pg_catalog', 'information_schema') \
                 ORDER BY table_schema = 'public' DESC, table_schema, table_name",
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
            quote_identifier(&table.schema),
            quote_identifier(&table.name),
            limit
        )
    }

    async fn query(&self, id: u64, sql: &str) -> Result<QueryResult> {
        let Some(turn) = self.gate.begin(id).await else {
            bail!("Query cancelled");
        };
        let client = match self.client().await {
            Ok(client) => client,
            Err(e) => {
                self.gate.finish(turn).await;
                return Err(e);
            }
        };
        let started = Instant::now();
        let outcome = client.simple_query(sql).await;
        self.gate.finish(turn).await;

        let messages = outcome.map_err(|e| anyhow!(format_pg_error(&e)))?;
        let result = collect_result(messages, self.row_limit, started.elapsed());
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
        // The token is read under the gate: the session cannot be swapped
        // while `id` holds the connection.
        let sent = self
            .gate
            .cancel(id, || async {
                let token = self
                    .session
                    .lock()
                    .await
                    .as_ref()
                    .map(|s| s.cancel_token.clone())
                    .ok_or_else(|| anyhow!("Connection is closed"))?;
                token
                    .cancel_query(NoTls)
                    .await
                    .map_err(|e| anyhow!(format_pg_error(&e)))
            })
            .await?;
        if sent {
            info!(id, "query cancelled");
        }
        Ok(sent)
    }

    async fn close(&self) {
        let mut guard = self.session.lock().await;
        if guard.take().is_some() {
            info!("connection closed");
        }
    }
}

/// Folds the messages of a simple query into the last result set. Statements
/// without rows produce a single `status` column holding the row count.
fn collect_result(
    messages: Vec<SimpleQueryMessage>,
    row_limit: usize,
    elapsed: Duration,
) -> QueryResult {
    let mut current_headers: Option<Vec<String>> = None;
    let mut current_rows: Vec<Vec<String>> = Vec::new();
    let mut last_headers: Vec<String> = Vec::new();
    let mut last_rows: Vec<Vec<String>> = Vec::new();
    let mut last_cmd: Option<String> = None;
    let mut truncated = false;

    for msg in messages {
        match msg {
            SimpleQueryMessage::RowDescription(columns) => {
                current_headers = Some(columns.iter().map(|c| c.name().to_string()).collect());
                current_rows.clear();
            }
            SimpleQueryMessage::Row(row) => {
                if current_headers.is_none() {
                    current_headers =
                        Some(row.columns().iter().map(|c| c.name().to_string()).collect());
                }
                if current_rows.len() < row_limit {
                    let cells = (0..row.len())
                        .map(|i| match row.get(i) {
                            Some(value) => value.replace('\r', ""),
                            None => "NULL".to_string(),
                        })
                        .collect();
                    current_rows.push(cells);
                } else {
                    truncated = true;
                }
            }
            SimpleQueryMessage::CommandComplete(count) => {
                last_cmd = Some(format!("{count} rows"));
                match current_headers.take() {
                    Some(headers) => {
                        last_headers = headers;
                        last_rows = std::mem::take(&mut current_rows);
                    }
                    None => current_rows.clear(),
                }
            }
            _ => {}
        }
    }

    if let Some(headers) = current_headers.take() {
        last_headers = headers;
        last_rows = current_rows;
    }

    let (headers, rows) = if last_headers.is_empty() {
        let status = last_cmd.clone().unwrap_or_else(|| "OK".to_string());
        (vec!["status".to_string()], vec![vec![status]])
    } else {
        (last_headers, last_rows)
    };

    QueryResult {
        headers,
        rows,
        command_tag: last_cmd,
        truncated,
        elapsed,
    }
}
