//! Recall queries for [`MemoryManager`].

use crate::error::Result;
use crate::index::RecallOptions;
use crate::schema::RecallHit;
use crate::store::StructuredStore;

use super::MemoryManager;

impl<S: StructuredStore> MemoryManager<S> {
    /// Rank stored facts against `query`.  Answers from the index alone and
    /// never touches the store.
    pub fn recall(&self, query: &str, options: RecallOptions) -> Result<Vec<RecallHit>> {
        self.index.search(query, options)
    }

    /// [`recall`](Self::recall) with the default limit (10) and threshold (0.4).
    pub fn recall_default(&self, query: &str) -> Result<Vec<RecallHit>> {
        self.recall(query, RecallOptions::default())
    }
}
