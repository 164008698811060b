//! Statement ordering on a single connection.
//!
//! A connection runs one statement at a time. Cancel requests go out of band
//! (a fresh socket for PostgreSQL, `KILL QUERY` for MySQL) and hit whatever
//! the server is executing when they land, so a request aimed at one query
//! must never be able to reach the next one. The gate keeps the next
//! statement waiting until any cancel request in flight has been delivered.

use std::collections::BTreeSet;
use std::future::Future;

use anyhow::Result;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct GateState {
    /// Query whose statement is on the wire.
    running: Option<u64>,
    /// Highest query id that has started.
    started: u64,
    /// Queries cancelled before they got the connection.
    abandoned: BTreeSet<u64>,
}

#[derive(Debug, Default)]
pub(crate) struct StatementGate {
    turn: Mutex<()>,
    state: Mutex<GateState>,
}

/// Held while a user query runs. Hand it back with [`StatementGate::finish`].
pub(crate) struct QueryTurn<'a> {
    id: u64,
    _turn: MutexGuard<'a, ()>,
}

impl StatementGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the connection on behalf of query `id`. Returns `None` when
    /// the query was cancelled while it waited.
    pub async fn begin(&self, id: u64) -> Option<QueryTurn<'_>> {
        let turn = self.turn.lock().await;
        let mut state = self.state.lock().await;
        state.started = state.started.max(id);
        if state.abandoned.remove(&id) {
            return None;
        }
        state.running = Some(id);
        Some(QueryTurn { id, _turn: turn })
    }

    /// Releases the connection. Blocks while a cancel request for this query
    /// is still being sent.
    pub async fn finish(&self, turn: QueryTurn<'_>) {
        let mut state = self.state.lock().await;
        if state.running == Some(turn.id) {
            state.running = None;
        }
        let id = turn.id;
        state.abandoned.retain(|&a| a > id);
        drop(turn);
    }

    /// Holds the connection for an internal statement. Cancel requests never
    /// target it.
    pub async fn internal(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    /// Cancels query `id`. `send` runs only while `id` is the statement on
    /// the wire; a query that has not started yet is dropped before it runs.
    /// Returns whether a request was sent or the query was dropped.
    pub async fn cancel<F, Fut>(&self, id: u64, send: F) -> Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut state = self.state.lock().await;
        if state.running == Some(id) {
            send().await?;
            return Ok(true);
        }
        if id > state.started {
            state.abandoned.insert(id);
            return Ok(true);
        }
        Ok(false)
    }
}
