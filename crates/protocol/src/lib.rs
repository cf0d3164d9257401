//! Wire protocol for the ftserve control and data channels.
//!
//! A request is four text fields sent one per message over the control
//! channel, each acknowledged with [`constants::ACK`]. The response is a
//! single fixed-size frame delivered over a second connection that the
//! server opens back to the client.

pub mod command;
pub mod constants;
pub mod reply;

pub use command::{Command, ControlRequest};
pub use constants::{ACK, FRAME_CAPACITY, MAX_FIELD_SIZE};
pub use reply::Reply;

/// Errors produced while decoding control-channel fields.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed while reading {0}")]
    ConnectionClosed(&'static str),

    #[error("invalid data port: {0:?}")]
    InvalidPort(String),

    #[error("empty {0} field")]
    EmptyField(&'static str),

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}
