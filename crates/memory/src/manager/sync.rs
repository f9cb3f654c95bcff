//! Persist-then-reindex step shared by every mutation of [`MemoryManager`].

use tracing::warn;

use crate::error::Result;
use crate::store::StructuredStore;

use super::MemoryManager;

impl<S: StructuredStore> MemoryManager<S> {
    /// Save the full map, then rebuild the index from exactly what was saved.
    /// On failure the index is left untouched so recall keeps answering from
    /// the last durable state.
    pub(super) fn persist_and_resync(&mut self) -> Result<()> {
        if let Err(err) = self.store.save(&self.data) {
            warn!(%err, "memory save failed; in-memory state is ahead of the store");
            return Err(err);
        }
        self.index.load(&self.data);
        Ok(())
    }
}
