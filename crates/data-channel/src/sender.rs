//! Outbound data connection (server side).
//!
//! Connects back to the address the client advertised, writes one frame
//! and closes.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::DataChannelError;
use crate::wire::{Frame, write_frame};
use crate::{TCP_CONNECT_TIMEOUT, TCP_TRANSFER_TIMEOUT};

/// Sends response frames over a fresh outbound connection.
#[derive(Debug, Clone)]
pub struct DataSender {
    connect_timeout: Duration,
    send_timeout: Duration,
    cancel: CancellationToken,
}

impl DataSender {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            connect_timeout: TCP_CONNECT_TIMEOUT,
            send_timeout: TCP_TRANSFER_TIMEOUT,
            cancel,
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, send: Duration) -> Self {
        self.connect_timeout = connect;
        self.send_timeout = send;
        self
    }

    /// Resolves `host:port` and connects to the first address that answers.
    pub async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, DataChannelError> {
        let addrs = resolve(host, port).await?;

        let mut last_err = None;
        for addr in addrs {
            let attempt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(DataChannelError::Cancelled);
                }
                result = tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)) => result,
            };

            match attempt {
                Ok(Ok(stream)) => {
                    info!(%addr, "data channel connected");
                    return Ok(stream);
                }
                Ok(Err(source)) => {
                    debug!(%addr, "data channel connect failed: {source}");
                    last_err = Some(DataChannelError::Connect {
                        addr: addr.to_string(),
                        source,
                    });
                }
                Err(_) => last_err = Some(DataChannelError::Timeout("data channel connect")),
            }
        }

        Err(last_err.unwrap_or_else(|| DataChannelError::Resolve {
            host: host.to_string(),
            port,
            reason: "no addresses".into(),
        }))
    }

    /// Connects to `host:port`, transmits `frame` in full and closes.
    ///
    /// Returns the number of bytes sent, always the frame capacity.
    pub async fn send(
        &self,
        host: &str,
        port: u16,
        frame: &Frame,
    ) -> Result<usize, DataChannelError> {
        let mut stream = self.connect(host, port).await?;

        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(DataChannelError::Cancelled);
            }
            result = tokio::time::timeout(self.send_timeout, write_frame(&mut stream, frame.as_bytes())) => {
                match result {
                    Ok(r) => r?,
                    Err(_) => return Err(DataChannelError::Timeout("frame transmission")),
                }
            }
        };

        // Peer may already have closed after reading the full frame.
        if let Err(e) = stream.shutdown().await {
            debug!("data channel shutdown: {e}");
        }

        info!(bytes = sent, payload = frame.payload_len(), "data channel: frame sent");
        Ok(sent)
    }
}

async fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, DataChannelError> {
    let resolve_err = |reason: String| DataChannelError::Resolve {
        host: host.to_string(),
        port,
        reason,
    };

    if host.is_empty() {
        return Err(resolve_err("empty address".into()));
    }

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| resolve_err(e.to_string()))?
        .collect();

    if addrs.is_empty() {
        return Err(resolve_err("no addresses".into()));
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;
    use crate::wire::{read_frame, trim_padding};

    #[tokio::test]
    async fn sends_full_frame_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let reader = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_frame(&mut stream, 4096).await.unwrap()
        });

        let frame = Frame::with_capacity(b"hello", 4096);
        let sender = DataSender::new(CancellationToken::new());
        let sent = sender.send("127.0.0.1", port, &frame).await.unwrap();
        assert_eq!(sent, 4096);

        let received = reader.await.unwrap();
        assert_eq!(received.len(), 4096);
        assert_eq!(trim_padding(&received), b"hello");
    }

    #[tokio::test]
    async fn resolves_hostnames() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });

        let sender = DataSender::new(CancellationToken::new());
        sender.connect("localhost", port).await.unwrap();
        accept.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn connect_refused_is_reported() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };

        let sender = DataSender::new(CancellationToken::new());
        let err = sender
            .send("127.0.0.1", port, &Frame::with_capacity(b"x", 8))
            .await
            .unwrap_err();
        assert!(matches!(err, DataChannelError::Connect { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn empty_address_is_rejected() {
        let sender = DataSender::new(CancellationToken::new());
        let err = sender.connect("", 9500).await.unwrap_err();
        assert!(matches!(err, DataChannelError::Resolve { .. }));
    }

    #[tokio::test]
    async fn cancelled_before_connect() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let sender = DataSender::new(cancel);
        let err = sender.connect("127.0.0.1", 9).await.unwrap_err();
        assert!(matches!(err, DataChannelError::Cancelled));
    }
}
