//! Filesystem access for the served directory.
//!
//! Every operation re-reads the directory at call time; nothing is cached
//! between requests. Reads are confined to regular files that appear by
//! exact name in the root's own listing.

mod browse;
mod error;
mod read;

pub use browse::{DirEntry, EntryKind, render_listing};
pub use error::FileOpsError;
pub use read::{FileContents, FileLookup, is_plain_name};

use std::path::{Path, PathBuf};

/// The directory exposed to clients.
///
/// Holds the canonicalized path so containment checks compare like with like.
#[derive(Debug, Clone)]
pub struct ServedRoot {
    path: PathBuf,
}

impl ServedRoot {
    /// Resolves `path` and checks that it is a directory.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FileOpsError> {
        let path = path.as_ref();
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|source| FileOpsError::DirectoryUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let metadata = tokio::fs::metadata(&canonical).await?;
        if !metadata.is_dir() {
            return Err(FileOpsError::NotADirectory(canonical));
        }

        Ok(Self { path: canonical })
    }

    /// Canonical path of the root.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
