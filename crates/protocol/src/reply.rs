//! Fixed text replies carried in the data-channel frame.

/// Sent when a `get` names a file that is not in the served directory.
pub const NOT_FOUND: &str = "File not found.";

/// Sent when the command token is neither `-l` nor `-g`.
pub const UNSUPPORTED: &str = "Unsupported command.";

/// Sent when the served directory cannot be opened.
pub const DIRECTORY_UNAVAILABLE: &str = "Directory unavailable.";

/// Application-level error outcomes delivered as frame content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    NotFound,
    Unsupported,
    DirectoryUnavailable,
}

impl Reply {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => NOT_FOUND,
            Self::Unsupported => UNSUPPORTED,
            Self::DirectoryUnavailable => DIRECTORY_UNAVAILABLE,
        }
    }

    pub fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Recognizes an error reply from a trimmed frame payload.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        [Self::NotFound, Self::Unsupported, Self::DirectoryUnavailable]
            .into_iter()
            .find(|reply| reply.as_bytes() == payload)
    }
}
