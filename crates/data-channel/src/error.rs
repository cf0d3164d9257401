//! Error types for the data channel.

/// Errors produced by the TCP data channel.
#[derive(Debug, thiserror::Error)]
pub enum DataChannelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot resolve {host}:{port}: {reason}")]
    Resolve {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("transmission failed after {sent} of {total} bytes: {source}")]
    Send {
        sent: usize,
        total: usize,
        source: std::io::Error,
    },

    #[error("frame ended after {received} of {expected} bytes")]
    ShortFrame { received: usize, expected: usize },

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("cancelled")]
    Cancelled,
}
