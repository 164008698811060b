//! Ordering of concurrent query submissions.
//!
//! Each submission gets a fresh id. Only the most recent one may deliver a
//! result; anything finishing after a newer submission started is stale.

#[derive(Debug, Default)]
pub struct QueryTracker {
    next_id: u64,
    active: Option<u64>,
}

impl QueryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a submission. Returns its id and the id it supersedes.
    pub fn begin(&mut self) -> (u64, Option<u64>) {
        self.next_id += 1;
        let id = self.next_id;
        let superseded = self.active.replace(id);
        (id, superseded)
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.active == Some(id)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Accepts the outcome of `id` if it is still current.
    pub fn finish(&mut self, id: u64) -> bool {
        if self.is_current(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Forgets the running submission so its outcome will be dropped.
    pub fn cancel(&mut self) -> Option<u64> {
        self.active.take()
    }
}
