//! Per-connection worker.
//!
//! A worker owns its control stream, its request and the data connection
//! it opens. It serves exactly one request and is then dropped.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ftserve_data_channel::{DataSender, Frame};
use ftserve_file_ops::ServedRoot;
use ftserve_protocol::Command;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::ServerError;
use crate::dispatch::{Response, dispatch};
use crate::handshake::read_control_request;

/// Read-only state shared by all workers.
#[derive(Debug)]
pub struct WorkerContext {
    pub root: ServedRoot,
    pub sender: DataSender,
    pub control_timeout: Duration,
}

/// Summary of a served request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub command: Command,
    /// Bytes written to the data channel (the full frame).
    pub bytes_sent: usize,
    /// Payload bytes before padding.
    pub payload_len: usize,
    pub truncated: bool,
}

/// Handles one control connection end to end.
pub struct Worker {
    id: u64,
    peer: SocketAddr,
    ctx: Arc<WorkerContext>,
}

impl Worker {
    pub fn new(id: u64, peer: SocketAddr, ctx: Arc<WorkerContext>) -> Self {
        Self { id, peer, ctx }
    }

    /// Runs the handshake, builds the response and delivers it.
    ///
    /// Any transport failure ends the worker with an error; the control
    /// stream is dropped either way.
    pub async fn run<S>(self, mut control: S) -> Result<WorkerReport, ServerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let request = read_control_request(&mut control, self.ctx.control_timeout).await?;
        info!(
            worker = self.id,
            peer = %self.peer,
            command = %request.command,
            data_port = request.data_port,
            address = %request.peer_address,
            "request received"
        );

        let response = dispatch(&self.ctx.root, &request.command).await;
        let frame = Frame::new(response.payload());
        // Oversized files are already reported by dispatch.
        if frame.truncated() && matches!(response, Response::Listing(_)) {
            warn!(
                worker = self.id,
                listing = response.payload().len(),
                "listing truncated to frame capacity"
            );
        }

        let bytes_sent = self
            .ctx
            .sender
            .send(&request.peer_address, request.data_port, &frame)
            .await?;

        drop(control);

        Ok(WorkerReport {
            command: request.command,
            bytes_sent,
            payload_len: frame.payload_len(),
            truncated: frame.truncated(),
        })
    }
}
