//! Client for the ftserve protocol.
//!
//! Sends a request over the control channel, field by field, and waits
//! for the server to connect back and deliver the response frame.

mod client;
mod network;

pub use client::{Client, ClientConfig, Response};
pub use network::{advertise_address, get_local_ips};

use ftserve_data_channel::DataChannelError;

/// Errors produced by the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot resolve server {0}")]
    Resolve(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("{field} is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("expected OK after {field}, got {got:?}")]
    UnexpectedAck { field: &'static str, got: String },

    #[error("data channel: {0}")]
    DataChannel(#[from] DataChannelError),
}
