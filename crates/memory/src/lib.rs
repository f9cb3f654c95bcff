pub mod daily_log;
pub mod error;
pub mod index;
pub mod manager;
pub mod markdown;
pub mod retrieval;
pub mod schema;
pub mod scorer;
pub mod store;

pub use error::{MemoryError, Result};
pub use index::{RecallOptions, RelevanceIndex};
pub use manager::MemoryManager;
pub use schema::{CategoryMap, Entry, LogEntry, RecallHit};
pub use store::{InMemoryStore, MarkdownStore, StructuredStore};
