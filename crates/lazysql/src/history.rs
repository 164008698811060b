//! Query history with JSON persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::config::history_path;
use crate::ui::ListItem;

const HISTORY_VERSION: u32 = 1;

/// A single executed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Increasing number, unique within one history file.
    pub id: u64,
    /// The SQL exactly as it was run.
    pub query: String,
    /// When the query was executed.
    pub executed_at: DateTime<Utc>,
}

impl ListItem for HistoryEntry {
    fn display(&self) -> String {
        format!("{}: {}", self.id, self.query.replace('\n', " "))
    }

    fn same_item(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// The history file format.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    version: u32,
    /// Newest first.
    entries: Vec<HistoryEntry>,
}

/// Executed queries, newest first.
pub struct History {
    entries: Vec<HistoryEntry>,
    last_id: u64,
    max_entries: usize,
    path: Option<PathBuf>,
    dirty: bool,
}

impl History {
    /// Load history from the default path.
    pub fn load(max_entries: usize) -> Result<Self> {
        let path = history_path().context("Could not determine history path")?;
        Self::load_from_path(&path, max_entries)
    }

    /// Load history from a specific path.
    pub fn load_from_path(path: &Path, max_entries: usize) -> Result<Self> {
        let mut entries = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read history file: {}", path.display()))?;
            let file: HistoryFile = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse history file: {}", path.display()))?;
            file.entries
        } else {
            Vec::new()
        };

        entries.sort_by(|a, b| b.id.cmp(&a.id));
        entries.truncate(max_entries);
        let last_id = entries.first().map(|e| e.id).unwrap_or(0);

        Ok(Self {
            entries,
            last_id,
            max_entries,
            path: Some(path.to_path_buf()),
            dirty: false,
        })
    }

    /// History that lives only for this session.
    pub fn in_memory(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            last_id: 0,
            max_entries,
            path: None,
            dirty: false,
        }
    }

    /// Records an executed query. Returns the new entry, or `None` when the
    /// query is blank or repeats the most recent one.
    pub fn push(&mut self, query: &str) -> Option<&HistoryEntry> {
        if query.trim().is_empty() {
            return None;
        }
        if self.entries.first().is_some_and(|e| e.query == query) {
            return None;
        }

        self.last_id += 1;
        self.entries.insert(
            0,
            HistoryEntry {
                id: self.last_id,
                query: query.to_string(),
                executed_at: Utc::now(),
            },
        );
        self.entries.truncate(self.max_entries);
        self.dirty = true;
        self.entries.first()
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save history to disk, replacing the file atomically.
    pub fn save(&mut self) -> Result<()> {
        let path = match &self.path {
            Some(path) if self.dirty => path,
            _ => return Ok(()),
        };
        let parent = path.parent().context("History path has no parent directory")?;
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        let file = HistoryFile {
            version: HISTORY_VERSION,
            entries: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&file).context("Failed to serialize history")?;

        let mut tmp = NamedTempFile::new_in(parent).with_context(|| {
            format!("Failed to create temp history file in: {}", parent.display())
        })?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write temp history file")?;
        tmp.flush().context("Failed to flush temp history file")?;
        tmp.persist(path)
            .map_err(|e| anyhow::anyhow!("Failed to persist history file: {}", e))?;

        self.dirty = false;
        Ok(())
    }
}

impl Drop for History {
    fn drop(&mut self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "failed to save history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_newest_first_with_increasing_ids() {
        let mut history = History::in_memory(10);
        history.push("select 1");
        history.push("select 2");
        let ids: Vec<_> = history.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, [2, 1]);
        assert_eq!(history.entries()[0].query, "select 2");
    }

    #[test]
    fn test_repeat_of_latest_is_skipped() {
        let mut history = History::in_memory(10);
        assert!(history.push("select 1").is_some());
        assert!(history.push("select 1").is_none());
        history.push("select 2");
        // Only consecutive repeats collapse.
        assert!(history.push("select 1").is_some());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_blank_query_not_added() {
        let mut history = History::in_memory(10);
        assert!(history.push("").is_none());
        assert!(history.push(" \n ").is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_display_flattens_newlines() {
        let mut history = History::in_memory(10);
        let entry = history.push("SELECT *\nFROM t").unwrap().clone();
        assert_eq!(entry.display(), "1: SELECT * FROM t");
    }

    #[test]
    fn test_entries_compare_by_id() {
        let mut history = History::in_memory(10);
        history.push("a");
        history.push("b");
        history.push("a");
        let entries = history.entries();
        assert!(!entries[0].same_item(&entries[2]));
        assert!(entries[0].same_item(&entries[0].clone()));
    }

    #[test]
    fn test_max_entries_drops_oldest() {
        let mut history = History::in_memory(2);
        history.push("q1");
        history.push("q2");
        history.push("q3");
        let queries: Vec<_> = history.entries().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, ["q3", "q2"]);
    }

    #[test]
    fn test_save_and_load_continues_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        {
            let mut history = History::load_from_path(&path, 100).unwrap();
            history.push("select 1");
            history.push("select 2");
            history.save().unwrap();
        }

        let mut history = History::load_from_path(&path, 100).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].query, "select 2");
        let entry = history.push("select 3").unwrap();
        assert_eq!(entry.id, 3);
    }

    #[test]
    fn test_corrupt_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();
        let err = History::load_from_path(&path, 10).err().unwrap();
        assert!(format!("{err:#}").contains("history.json"));
    }
}
