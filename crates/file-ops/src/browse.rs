//! Directory enumeration for `list` requests.

use crate::{FileOpsError, ServedRoot};

/// Kind of entry that qualifies for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A listed entry of the served root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    pub kind: EntryKind,
}

impl ServedRoot {
    /// Lists regular files and subdirectories of the root.
    ///
    /// Symlinks, sockets, FIFOs and device nodes are skipped. Entries come
    /// back in whatever order the filesystem yields them.
    ///
    /// Names that are not valid UTF-8 are listed lossily (invalid bytes
    /// become U+FFFD). Such a listed name never matches the real entry, so
    /// `read_file` cannot serve those files.
    pub async fn entries(&self) -> Result<Vec<DirEntry>, FileOpsError> {
        let mut dir = tokio::fs::read_dir(&self.path)
            .await
            .map_err(|source| FileOpsError::DirectoryUnavailable {
                path: self.path.clone(),
                source,
            })?;

        let mut result = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            // file_type() does not follow symlinks.
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!(name = ?entry.file_name(), "skipping entry: {e}");
                    continue;
                }
            };

            let kind = if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else {
                continue;
            };

            result.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        Ok(result)
    }

    /// Produces the newline-terminated listing sent for a `list` request.
    pub async fn listing(&self) -> Result<Vec<u8>, FileOpsError> {
        let entries = self.entries().await?;
        tracing::debug!(count = entries.len(), "directory enumerated");
        Ok(render_listing(&entries))
    }
}

/// Renders entry names, each followed by `\n`.
pub fn render_listing(entries: &[DirEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(entry.name.as_bytes());
        out.push(b'\n');
    }
    out
}
