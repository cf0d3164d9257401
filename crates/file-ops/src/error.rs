//! Error types for filesystem operations.

use std::path::PathBuf;

/// Errors produced while listing or reading the served root.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot open directory {}: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {name:?}: {source}")]
    Read {
        name: String,
        source: std::io::Error,
    },
}
