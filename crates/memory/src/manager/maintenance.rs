//! Forgetting, trimming and reloading for [`MemoryManager`].

use std::collections::BTreeMap;

use tracing::info;

use crate::error::Result;
use crate::schema::{DEFAULT_CATEGORY, normalize_category};
use crate::store::StructuredStore;

use super::MemoryManager;

impl<S: StructuredStore> MemoryManager<S> {
    /// Remove `key` from `category`.  Returns `false` (and persists nothing)
    /// when the key or the category does not exist.  The category itself is
    /// kept even when its last entry goes.
    pub fn forget(&mut self, key: &str, category: &str) -> Result<bool> {
        let category = normalize_category(category)?;
        let Some(entries) = self.data.get_mut(&category) else {
            return Ok(false);
        };
        let Some(pos) = entries.iter().position(|entry| entry.key == key) else {
            return Ok(false);
        };

        entries.remove(pos);
        info!(%category, key, "memory forgotten");
        self.persist_and_resync()?;
        Ok(true)
    }

    /// [`forget`](Self::forget) from the `general` category.
    pub fn forget_general(&mut self, key: &str) -> Result<bool> {
        self.forget(key, DEFAULT_CATEGORY)
    }

    /// Bound every category to its `max_per_category` most recent entries.
    ///
    /// Returns the number of entries dropped per trimmed category; untouched
    /// categories are absent.  Saves once, and only when something changed.
    pub fn trim_categories(&mut self, max_per_category: usize) -> Result<BTreeMap<String, usize>> {
        let mut removed = BTreeMap::new();
        for (category, entries) in self.data.iter_mut() {
            if entries.len() > max_per_category {
                let excess = entries.len() - max_per_category;
                entries.drain(..excess);
                removed.insert(category.to_string(), excess);
            }
        }

        if removed.is_empty() {
            return Ok(removed);
        }

        info!(
            categories = removed.len(),
            dropped = removed.values().sum::<usize>(),
            max_per_category,
            "trimmed categories"
        );
        self.persist_and_resync()?;
        Ok(removed)
    }

    /// Discard the in-memory map and re-read it from the store.  Use after a
    /// failed save to get back to the durable state.
    pub fn reload(&mut self) -> Result<()> {
        self.data = self.store.load()?;
        self.index.load(&self.data);
        info!(
            categories = self.data.len(),
            entries = self.data.total_entries(),
            "memory reloaded from store"
        );
        Ok(())
    }
}
