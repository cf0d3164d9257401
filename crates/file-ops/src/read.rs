//! Contained file reads for `get` requests.

use std::path::{Component, Path};

use tokio::io::AsyncReadExt;

use crate::browse::EntryKind;
use crate::{FileOpsError, ServedRoot};

/// Bytes read from a served file, capped at the caller's limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    pub bytes: Vec<u8>,
    /// Size of the file on disk when it was opened.
    pub size: u64,
}

impl FileContents {
    /// Whether the file was larger than what was read.
    pub fn truncated(&self) -> bool {
        self.size > self.bytes.len() as u64
    }
}

/// Result of looking a filename up in the served root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLookup {
    Found(FileContents),
    NotFound,
}

/// Returns `true` if `name` is a single, normal path component.
///
/// Rejects empty names, `.`/`..`, anything carrying a separator (either
/// style), and absolute or prefixed paths.
pub fn is_plain_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

impl ServedRoot {
    /// Reads at most `limit` bytes of the file `name`.
    ///
    /// The name must match a regular file in a fresh listing of the root,
    /// byte for byte. The resolved path must also stay inside the root.
    /// Anything else is [`FileLookup::NotFound`].
    pub async fn read_file(&self, name: &str, limit: usize) -> Result<FileLookup, FileOpsError> {
        if !is_plain_name(name) {
            tracing::debug!(name, "rejecting non-plain filename");
            return Ok(FileLookup::NotFound);
        }

        let listed = self
            .entries()
            .await?
            .into_iter()
            .any(|e| e.kind == EntryKind::File && e.name == name);
        if !listed {
            return Ok(FileLookup::NotFound);
        }

        let candidate = match tokio::fs::canonicalize(self.path.join(name)).await {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileLookup::NotFound),
            Err(source) => {
                return Err(FileOpsError::Read {
                    name: name.to_string(),
                    source,
                });
            }
        };
        if candidate.parent() != Some(self.path.as_path()) {
            tracing::warn!(name, resolved = %candidate.display(), "path escapes served root");
            return Ok(FileLookup::NotFound);
        }

        let read_err = |source| FileOpsError::Read {
            name: name.to_string(),
            source,
        };

        let file = match tokio::fs::File::open(&candidate).await {
            Ok(f) => f,
            // Removed between listing and open.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileLookup::NotFound),
            Err(e) => return Err(read_err(e)),
        };
        let size = file.metadata().await.map_err(read_err)?.len();

        let mut bytes = Vec::with_capacity(size.min(limit as u64) as usize);
        file.take(limit as u64)
            .read_to_end(&mut bytes)
            .await
            .map_err(read_err)?;

        Ok(FileLookup::Found(FileContents { bytes, size }))
    }
}
