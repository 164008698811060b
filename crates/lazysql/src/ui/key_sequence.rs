//! Multi-key sequence recognition (`dd`, `ciw`, `gg`, ...).
//!
//! Recognition is a pure function of the pending keys, the incoming key and
//! the event timestamp. Keys typed more than the debounce window after the
//! previous key start a new sequence. No timers are involved: an expired
//! sequence is only noticed when the next key arrives.

use std::time::{Duration, Instant};

/// Default debounce window between the keys of one sequence.
pub const DEFAULT_SEQUENCE_TIMEOUT: Duration = Duration::from_millis(500);

/// Keys typed so far in an unfinished sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingKeys {
    keys: String,
    last_at: Option<Instant>,
}

impl PendingKeys {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.keys
    }

    /// True if the pending keys can still be continued at `now`.
    pub fn is_live(&self, now: Instant, window: Duration) -> bool {
        match self.last_at {
            Some(at) if !self.keys.is_empty() => now.saturating_duration_since(at) <= window,
            _ => false,
        }
    }
}

/// Outcome of feeding one key to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep<C> {
    /// A complete sequence was typed.
    Matched(C),
    /// The key extends a sequence that is not complete yet.
    Pending,
    /// The key broke a live sequence; it is swallowed.
    Rejected,
    /// The key does not take part in any sequence.
    Unhandled,
}

/// Feeds `key` typed at `now` to the recognizer.
///
/// Returns the step and the pending keys to carry to the next call.
pub fn advance<C: Copy>(
    table: &[(&str, C)],
    pending: &PendingKeys,
    key: char,
    now: Instant,
    window: Duration,
) -> (SequenceStep<C>, PendingKeys) {
    let live = pending.is_live(now, window);

    if live {
        let mut candidate = pending.keys.clone();
        candidate.push(key);
        if let Some(step) = match_candidate(table, &candidate, now) {
            return step;
        }
    }

    let single = key.to_string();
    match match_candidate(table, &single, now) {
        Some(step) => step,
        None if live => (SequenceStep::Rejected, PendingKeys::default()),
        None => (SequenceStep::Unhandled, PendingKeys::default()),
    }
}

fn match_candidate<C: Copy>(
    table: &[(&str, C)],
    candidate: &str,
    now: Instant,
) -> Option<(SequenceStep<C>, PendingKeys)> {
    if let Some((_, cmd)) = table.iter().find(|(keys, _)| *keys == candidate) {
        return Some((SequenceStep::Matched(*cmd), PendingKeys::default()));
    }

    let is_prefix = table
        .iter()
        .any(|(keys, _)| keys.len() > candidate.len() && keys.starts_with(candidate));
    if is_prefix {
        return Some((
            SequenceStep::Pending,
            PendingKeys {
                keys: candidate.to_string(),
                last_at: Some(now),
            },
        ));
    }

    None
}

/// Stateful wrapper holding the pending keys for one component.
#[derive(Debug, Clone)]
pub struct KeySequenceHandler<C: 'static> {
    table: &'static [(&'static str, C)],
    pending: PendingKeys,
    window: Duration,
}

impl<C: Copy + 'static> KeySequenceHandler<C> {
    pub fn new(table: &'static [(&'static str, C)], window: Duration) -> Self {
        Self {
            table,
            pending: PendingKeys::default(),
            window,
        }
    }

    pub fn feed(&mut self, key: char, now: Instant) -> SequenceStep<C> {
        let (step, pending) = advance(self.table, &self.pending, key, now, self.window);
        self.pending = pending;
        step
    }

    /// Pending keys, for display while a sequence is being typed.
    pub fn pending(&self) -> &str {
        self.pending.as_str()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn cancel(&mut self) {
        self.pending = PendingKeys::default();
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
