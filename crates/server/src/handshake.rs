//! Control-channel handshake.
//!
//! Reads, in order: command token, data port, client address and, for
//! `get` only, the filename. Each field is one read of up to
//! [`MAX_FIELD_SIZE`] bytes and is acknowledged with `OK` before the next
//! one is read.

use std::time::Duration;

use ftserve_protocol::command::{decode_field, parse_data_port};
use ftserve_protocol::{ACK, Command, ControlRequest, MAX_FIELD_SIZE, ProtocolError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Runs the handshake on `stream` and returns the assembled request.
///
/// A `list` (or unknown) command never waits for a filename.
pub async fn read_control_request<S>(
    stream: &mut S,
    timeout: Duration,
) -> Result<ControlRequest, ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let token = read_field(stream, "command", timeout).await?;
    let mut command = Command::classify(&token);
    ack(stream, "command", timeout).await?;

    let port_field = read_field(stream, "data port", timeout).await?;
    let data_port = parse_data_port(&port_field)?;
    ack(stream, "data port", timeout).await?;

    let peer_address = read_field(stream, "address", timeout).await?;
    if peer_address.is_empty() {
        return Err(ProtocolError::EmptyField("address"));
    }
    ack(stream, "address", timeout).await?;

    if let Command::Get(filename) = &mut command {
        *filename = read_field(stream, "filename", timeout).await?;
        ack(stream, "filename", timeout).await?;
    }

    Ok(ControlRequest {
        command,
        data_port,
        peer_address,
    })
}

async fn read_field<S>(
    stream: &mut S,
    field: &'static str,
    timeout: Duration,
) -> Result<String, ProtocolError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = [0u8; MAX_FIELD_SIZE];
    let n = match tokio::time::timeout(timeout, stream.read(&mut buf)).await {
        Ok(r) => r?,
        Err(_) => return Err(ProtocolError::Timeout(field)),
    };
    if n == 0 {
        return Err(ProtocolError::ConnectionClosed(field));
    }

    let value = decode_field(&buf[..n]);
    debug!(field, %value, "control field received");
    Ok(value)
}

async fn ack<S>(stream: &mut S, field: &'static str, timeout: Duration) -> Result<(), ProtocolError>
where
    S: AsyncWrite + Unpin,
{
    let write = async {
        stream.write_all(ACK).await?;
        stream.flush().await
    };
    match tokio::time::timeout(timeout, write).await {
        Ok(r) => Ok(r?),
        Err(_) => Err(ProtocolError::Timeout(field)),
    }
}
