//! Durable backing for [`crate::MemoryManager`].
//!
//! The manager owns the authoritative [`CategoryMap`] and hands the whole map
//! to [`StructuredStore::save`] after every mutation.  Daily logs go through
//! the same store but are opaque to the manager and never indexed.
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::debug;

use crate::daily_log::DailyLog;
use crate::error::{MemoryError, Result};
use crate::markdown::{parse_memory, render_memory};
use crate::schema::{CategoryMap, LogEntry};

/// File name of the categorized key/value store inside the base directory.
pub const MEMORY_FILE: &str = "MEMORY.md";

pub trait StructuredStore {
    /// Current durable state; an empty map when nothing was saved yet.
    fn load(&self) -> Result<CategoryMap>;

    /// Replace the durable state with `data`.
    fn save(&mut self, data: &CategoryMap) -> Result<()>;

    fn append_log_entry(&mut self, date: NaiveDate, entry: &LogEntry) -> Result<()>;

    fn read_log_entries(&self, date: NaiveDate) -> Result<Vec<LogEntry>>;
}

// ── Markdown files ───────────────────────────────────────────────────────────

/// Human-readable store: one Markdown memory file plus one Markdown file per
/// day of log notes, all inside `base_dir`.
#[derive(Debug, Clone)]
pub struct MarkdownStore {
    base_dir: PathBuf,
    memory_file: String,
}

impl MarkdownStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_file_name(base_dir, MEMORY_FILE)
    }

    pub fn with_file_name(base_dir: impl Into<PathBuf>, memory_file: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            memory_file: memory_file.into(),
        }
    }

    pub fn memory_path(&self) -> PathBuf {
        self.base_dir.join(&self.memory_file)
    }

    pub fn log_path(&self, date: NaiveDate) -> PathBuf {
        self.base_dir.join(format!("{}.md", date.format("%Y-%m-%d")))
    }
}

impl StructuredStore for MarkdownStore {
    fn load(&self) -> Result<CategoryMap> {
        let path = self.memory_path();
        if !path.exists() {
            return Ok(CategoryMap::new());
        }
        let raw = fs::read_to_string(&path).map_err(|source| {
            MemoryError::persistence(format!("reading {}", path.display()), source)
        })?;
        Ok(parse_memory(&raw))
    }

    /// Crash-safety guarantee: the new content is written to a `.tmp` sibling,
    /// `fsync`'d, then renamed over the memory file.  A crash before the rename
    /// leaves the previous file untouched.  The `.tmp` file is removed on any
    /// error path.
    fn save(&mut self, data: &CategoryMap) -> Result<()> {
        let path = self.memory_path();
        let io_err = |source| MemoryError::persistence(format!("writing {}", path.display()), source);

        fs::create_dir_all(&self.base_dir).map_err(io_err)?;

        let tmp_path = path.with_file_name(format!("{}.tmp", self.memory_file));
        let rendered = render_memory(data);

        let write_result = (|| -> std::io::Result<()> {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(rendered.as_bytes())?;
            file.flush()?;
            file.sync_all()?;
            Ok(())
        })();

        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_err(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_err(err));
        }

        debug!(
            path = %path.display(),
            categories = data.len(),
            entries = data.total_entries(),
            "memory file written"
        );
        Ok(())
    }

    fn append_log_entry(&mut self, date: NaiveDate, entry: &LogEntry) -> Result<()> {
        DailyLog::new(self.log_path(date)).append(entry)
    }

    fn read_log_entries(&self, date: NaiveDate) -> Result<Vec<LogEntry>> {
        DailyLog::new(self.log_path(date)).load()
    }
}

// ── In-process store ─────────────────────────────────────────────────────────

/// Volatile store for embedding the manager without touching the filesystem.
/// Counts saves so callers can observe when the manager persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: CategoryMap,
    logs: BTreeMap<NaiveDate, Vec<LogEntry>>,
    saves: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted content.
    pub fn with_data(data: CategoryMap) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> &CategoryMap {
        &self.data
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl StructuredStore for InMemoryStore {
    fn load(&self) -> Result<CategoryMap> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &CategoryMap) -> Result<()> {
        self.data = data.clone();
        self.saves += 1;
        Ok(())
    }

    fn append_log_entry(&mut self, date: NaiveDate, entry: &LogEntry) -> Result<()> {
        self.logs.entry(date).or_default().push(entry.clone());
        Ok(())
    }

    fn read_log_entries(&self, date: NaiveDate) -> Result<Vec<LogEntry>> {
        Ok(self.logs.get(&date).cloned().unwrap_or_default())
    }
}
