//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// A write to the history store failed.
///
/// Reads never produce this; they fall back to empty collections instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
