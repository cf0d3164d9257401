//! Data channel listener (client side).
//!
//! Binds before the request is sent so the server's connect-back cannot
//! race ahead of it, then accepts one connection and reads one frame.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::error::DataChannelError;
use crate::wire::{read_frame, trim_padding};
use crate::{TCP_CONNECT_TIMEOUT, TCP_TRANSFER_TIMEOUT};

/// Listener waiting for the server to deliver a response frame.
pub struct DataReceiver {
    listener: TcpListener,
    accept_timeout: Duration,
    read_timeout: Duration,
}

impl DataReceiver {
    /// Binds the data listener. Port 0 picks an ephemeral port.
    pub async fn bind(addr: SocketAddr) -> Result<Self, DataChannelError> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "data channel listener bound");

        Ok(Self {
            listener,
            accept_timeout: TCP_CONNECT_TIMEOUT,
            read_timeout: TCP_TRANSFER_TIMEOUT,
        })
    }

    pub fn with_timeouts(mut self, accept: Duration, read: Duration) -> Self {
        self.accept_timeout = accept;
        self.read_timeout = read;
        self
    }

    /// Port the listener is bound to (the one to advertise).
    pub fn port(&self) -> Result<u16, DataChannelError> {
        Ok(self.listener.local_addr()?.port())
    }

    /// Accepts a single connection and reads one frame of `capacity` bytes.
    ///
    /// Returns the payload with trailing padding removed.
    pub async fn receive(self, capacity: usize) -> Result<Vec<u8>, DataChannelError> {
        let (mut stream, addr) =
            match tokio::time::timeout(self.accept_timeout, self.listener.accept()).await {
                Ok(Ok(pair)) => pair,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(DataChannelError::Timeout("data channel accept")),
            };
        info!(%addr, "data channel connection accepted");

        // Only one connection per request.
        drop(self.listener);

        let frame = match tokio::time::timeout(self.read_timeout, read_frame(&mut stream, capacity))
            .await
        {
            Ok(r) => r?,
            Err(_) => return Err(DataChannelError::Timeout("frame receive")),
        };

        let payload = trim_padding(&frame).to_vec();
        debug!(payload = payload.len(), "data channel: frame received");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::sender::DataSender;
    use crate::wire::Frame;

    #[tokio::test]
    async fn sender_to_receiver() {
        let receiver = DataReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let port = receiver.port().unwrap();
        let rx = tokio::spawn(receiver.receive(2048));

        let frame = Frame::with_capacity(b"a.txt\nsub\n", 2048);
        DataSender::new(CancellationToken::new())
            .send("127.0.0.1", port, &frame)
            .await
            .unwrap();

        assert_eq!(rx.await.unwrap().unwrap(), b"a.txt\nsub\n");
    }

    #[tokio::test]
    async fn short_frame_is_an_error() {
        let receiver = DataReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let port = receiver.port().unwrap();
        let rx = tokio::spawn(receiver.receive(2048));

        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .unwrap();
        tokio::io::AsyncWriteExt::write_all(&mut stream, b"only a little")
            .await
            .unwrap();
        drop(stream);

        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            DataChannelError::ShortFrame {
                received: 13,
                expected: 2048
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn accept_times_out() {
        let receiver = DataReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap()
            .with_timeouts(Duration::from_secs(5), Duration::from_secs(5));

        let err = receiver.receive(16).await.unwrap_err();
        assert!(matches!(err, DataChannelError::Timeout(_)));
    }
}
