//! ftserve server: control-channel supervisor and per-connection workers.
//!
//! The [`Server`] accepts control connections and hands each one to its
//! own [`Worker`] task. A worker runs the four-field handshake, builds the
//! response from the served directory and delivers it over a separate
//! data connection, then exits. Workers share nothing mutable.

mod config;
mod dispatch;
mod handshake;
mod server;
mod worker;

pub use config::{ServerConfig, validate_port};
pub use dispatch::{Response, dispatch};
pub use handshake::read_control_request;
pub use server::Server;
pub use worker::{Worker, WorkerContext, WorkerReport};

use ftserve_data_channel::DataChannelError;
use ftserve_file_ops::FileOpsError;
use ftserve_protocol::ProtocolError;

/// Errors produced by the server and its workers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("port {0} outside 1024-65535")]
    InvalidPort(u16),

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("served root: {0}")]
    Root(#[from] FileOpsError),

    #[error("control channel: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("data channel: {0}")]
    DataChannel(#[from] DataChannelError),
}
