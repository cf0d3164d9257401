//! Request types assembled by the control handshake.

use std::fmt;

use crate::ProtocolError;
use crate::constants::{GET_TOKEN, LIST_TOKEN};

/// Operation requested by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Directory listing of the served root.
    List,
    /// Contents of a single file. The name is filled in once the
    /// handshake has read the filename field.
    Get(String),
    /// Any token other than `-l` / `-g`, kept verbatim for diagnostics.
    Unknown(String),
}

impl Command {
    /// Classifies a raw command token by exact match.
    ///
    /// `Get` starts with an empty filename; see [`Command::expects_filename`].
    pub fn classify(token: &str) -> Self {
        match token {
            LIST_TOKEN => Self::List,
            GET_TOKEN => Self::Get(String::new()),
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the handshake must read a fourth (filename) field.
    pub fn expects_filename(&self) -> bool {
        matches!(self, Self::Get(_))
    }

    /// Wire token for this command.
    pub fn token(&self) -> &str {
        match self {
            Self::List => LIST_TOKEN,
            Self::Get(_) => GET_TOKEN,
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Get(name) => write!(f, "get {name:?}"),
            Self::Unknown(raw) => write!(f, "unknown {raw:?}"),
        }
    }
}

/// A fully received control-channel request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    pub command: Command,
    pub data_port: u16,
    pub peer_address: String,
}

impl ControlRequest {
    /// Filename requested by a `Get`, if any.
    pub fn filename(&self) -> Option<&str> {
        match &self.command {
            Command::Get(name) => Some(name),
            _ => None,
        }
    }
}

/// Decodes a raw field: lossy UTF-8 with trailing NUL padding removed.
///
/// Whitespace is kept, so filenames match entry names byte for byte.
pub fn decode_field(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .to_string()
}

/// Parses the data-port field.
///
/// Port 0 is rejected since the server cannot connect to it.
pub fn parse_data_port(field: &str) -> Result<u16, ProtocolError> {
    match field.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ProtocolError::InvalidPort(field.to_string())),
        Ok(port) => Ok(port),
    }
}
