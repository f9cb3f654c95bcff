//! Error taxonomy for the memory library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    /// An argument was rejected before any state changed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The durable store could not be read or written.  When raised by a
    /// mutation the in-memory map already holds the change while the
    /// relevance index still reflects the last successful save.
    #[error("persistence failure while {context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl MemoryError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn persistence(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            context: context.into(),
            source,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

pub type Result<T> = std::result::Result<T, MemoryError>;
