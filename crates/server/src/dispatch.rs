//! Maps a command to its response payload.
//!
//! Application-level failures (missing file, unsupported command,
//! unreadable directory) become a [`Reply`] payload rather than an error,
//! so the client always receives a frame.

use ftserve_file_ops::{FileLookup, FileOpsError, ServedRoot};
use ftserve_protocol::{Command, FRAME_CAPACITY, Reply};
use tracing::{error, warn};

/// Response content for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Newline-terminated directory listing.
    Listing(Vec<u8>),
    /// File bytes (at most one frame's worth).
    File { name: String, bytes: Vec<u8>, size: u64 },
    /// Fixed error reply.
    Reply(Reply),
}

impl Response {
    /// Bytes to place in the frame.
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Listing(bytes) | Self::File { bytes, .. } => bytes.as_slice(),
            Self::Reply(reply) => reply.as_bytes(),
        }
    }
}

/// Produces the response for `command` against `root`.
pub async fn dispatch(root: &ServedRoot, command: &Command) -> Response {
    match command {
        Command::List => match root.listing().await {
            Ok(listing) => Response::Listing(listing),
            Err(e) => {
                error!("listing failed: {e}");
                Response::Reply(Reply::DirectoryUnavailable)
            }
        },
        Command::Get(name) => match root.read_file(name, FRAME_CAPACITY).await {
            Ok(FileLookup::Found(contents)) => {
                if contents.truncated() {
                    warn!(
                        name = %name,
                        size = contents.size,
                        sent = contents.bytes.len(),
                        "file exceeds frame capacity, truncating"
                    );
                }
                Response::File {
                    name: name.clone(),
                    bytes: contents.bytes,
                    size: contents.size,
                }
            }
            Ok(FileLookup::NotFound) => {
                warn!(name = %name, "requested file not found");
                Response::Reply(Reply::NotFound)
            }
            Err(e @ FileOpsError::DirectoryUnavailable { .. }) => {
                error!(name = %name, "listing failed: {e}");
                Response::Reply(Reply::DirectoryUnavailable)
            }
            Err(e) => {
                error!(name = %name, "file read failed: {e}");
                Response::Reply(Reply::NotFound)
            }
        },
        Command::Unknown(token) => {
            warn!(token = %token, "unsupported command");
            Response::Reply(Reply::Unsupported)
        }
    }
}
