use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use memkit_config::MemoryConfig;
use tracing::{debug, info};

use crate::error::{MemoryError, Result};
use crate::index::RelevanceIndex;
use crate::schema::{CategoryMap, DEFAULT_CATEGORY, Entry, LogEntry, normalize_category, validate_entry};
use crate::store::{MarkdownStore, StructuredStore};

mod maintenance;
mod retrieval;
mod sync;

/// Single authoritative in-process view of the stored facts.
///
/// Every mutation runs in two phases: the in-memory [`CategoryMap`] is
/// changed, then the whole map is saved and the [`RelevanceIndex`] rebuilt
/// from it.  When the save fails the error is returned, the map keeps the
/// change and the index keeps serving the last successfully saved state;
/// call [`MemoryManager::reload`] to fall back to what is on disk.
///
/// Mutators take `&mut self`.  Sharing one manager between threads needs an
/// external lock; two processes on the same directory are last-writer-wins.
pub struct MemoryManager<S = MarkdownStore> {
    store: S,
    data: CategoryMap,
    index: RelevanceIndex,
}

impl MemoryManager<MarkdownStore> {
    /// Open (creating if needed) a Markdown memory directory.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir).map_err(|source| {
            MemoryError::persistence(format!("creating {}", base_dir.display()), source)
        })?;
        Self::with_store(MarkdownStore::new(base_dir))
    }

    pub fn from_config(config: &MemoryConfig) -> Result<Self> {
        let base_dir = Path::new(&config.base_dir);
        fs::create_dir_all(base_dir).map_err(|source| {
            MemoryError::persistence(format!("creating {}", base_dir.display()), source)
        })?;
        Self::with_store(MarkdownStore::with_file_name(base_dir, &config.memory_file))
    }
}

impl<S: StructuredStore> MemoryManager<S> {
    /// Load the store once and build the index from it.
    pub fn with_store(store: S) -> Result<Self> {
        let data = store.load()?;
        let mut index = RelevanceIndex::new();
        index.load(&data);
        info!(
            categories = data.len(),
            entries = data.total_entries(),
            "memory loaded"
        );
        Ok(Self { store, data, index })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &RelevanceIndex {
        &self.index
    }

    /// Insert `key` into `category`, or replace its value in place.
    pub fn remember(&mut self, key: &str, value: &str, category: &str) -> Result<()> {
        let category = normalize_category(category)?;
        let value = value.trim_start();
        validate_entry(key, value)?;

        let entries = self.data.entries_mut(&category);
        match entries.iter_mut().find(|entry| entry.key == key) {
            Some(existing) => {
                existing.value = value.to_string();
                debug!(%category, key, "memory updated");
            }
            None => {
                entries.push(Entry::new(key, value));
                debug!(%category, key, "memory added");
            }
        }

        self.persist_and_resync()
    }

    /// [`remember`](Self::remember) into the `general` category.
    pub fn remember_general(&mut self, key: &str, value: &str) -> Result<()> {
        self.remember(key, value, DEFAULT_CATEGORY)
    }

    /// Category names in first-seen order, empty categories included.
    pub fn categories(&self) -> Vec<String> {
        self.data.names().map(String::from).collect()
    }

    /// Snapshot of one category's entries, oldest first.
    pub fn list(&self, category: &str) -> Result<Vec<Entry>> {
        let category = normalize_category(category)?;
        Ok(self.data.get(&category).map(<[Entry]>::to_vec).unwrap_or_default())
    }

    /// Entry count per category.
    pub fn stats(&self) -> BTreeMap<String, usize> {
        self.data
            .iter()
            .map(|(category, entries)| (category.to_string(), entries.len()))
            .collect()
    }

    pub fn total_entries(&self) -> usize {
        self.data.total_entries()
    }

    /// Append `text` to the daily log of `date` (today when `None`), stamped
    /// with the local wall-clock time.  Log notes are never indexed.
    pub fn daily_log(&mut self, text: &str, date: Option<NaiveDate>) -> Result<LogEntry> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MemoryError::invalid("log text must not be blank"));
        }
        if text.contains(['\n', '\r']) {
            return Err(MemoryError::invalid("log text must be a single line"));
        }

        let now = Local::now();
        let date = date.unwrap_or_else(|| now.date_naive());
        let entry = LogEntry {
            timestamp: now.format("%H:%M:%S").to_string(),
            text: text.to_string(),
        };
        self.store.append_log_entry(date, &entry)?;
        debug!(%date, timestamp = %entry.timestamp, "daily log appended");
        Ok(entry)
    }

    /// Notes of `date` (today when `None`) in the order they were written.
    pub fn daily_entries(&self, date: Option<NaiveDate>) -> Result<Vec<LogEntry>> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        self.store.read_log_entries(date)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
