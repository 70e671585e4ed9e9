//! Error types for the deals pipeline.
//!
//! Title parsing itself cannot fail. These errors cover the layers around it:
//! reading feeds, loading and saving the cache, and serializing results.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for deals pipeline operations.
pub type DealResult<T> = Result<T, DealError>;

/// Error type for feed, cache and serialization failures.
#[derive(Debug, Error)]
pub enum DealError {
    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not an RSS feed
    #[error("Invalid feed: {reason}")]
    InvalidFeed { reason: String },

    /// A cache file exists but does not hold a valid cache
    #[error("Malformed cache file '{}': {source}", path.display())]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing results failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration or parameters
    #[error("Invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },
}

impl DealError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
