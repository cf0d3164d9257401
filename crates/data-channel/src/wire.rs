//! TCP wire format for response frames.
//!
//! # Wire format
//!
//! ```text
//! DATA CHANNEL (Server -> Client), exactly once per request:
//!   [FRAME_CAPACITY bytes: payload, then 0x00 padding]
//! ```
//!
//! There is no length prefix. The receiver reads exactly the frame
//! capacity and strips trailing NUL bytes to recover the payload, so a
//! payload that itself ends in NUL bytes loses them.

use ftserve_protocol::FRAME_CAPACITY;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::DataChannelError;

/// One zero-padded, fixed-size response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    buf: Box<[u8]>,
    payload_len: usize,
    truncated: bool,
}

impl Frame {
    /// Builds a frame of [`FRAME_CAPACITY`] bytes around `payload`.
    pub fn new(payload: &[u8]) -> Self {
        Self::with_capacity(payload, FRAME_CAPACITY)
    }

    /// Builds a frame of `capacity` bytes.
    ///
    /// The buffer is zeroed first, so padding is always NUL. Payload
    /// bytes past `capacity` are dropped.
    pub fn with_capacity(payload: &[u8], capacity: usize) -> Self {
        let mut buf = vec![0u8; capacity].into_boxed_slice();
        let payload_len = payload.len().min(capacity);
        buf[..payload_len].copy_from_slice(&payload[..payload_len]);

        Self {
            buf,
            payload_len,
            truncated: payload.len() > capacity,
        }
    }

    /// The full frame, padding included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of payload bytes carried (before padding).
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// Whether the payload did not fit.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

/// Strips trailing NUL padding from a received frame.
pub fn trim_padding(frame: &[u8]) -> &[u8] {
    let end = frame.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &frame[..end]
}

/// Writes all of `frame`, retrying with the remaining slice after each
/// partial write.
///
/// Returns the number of bytes written, which always equals `frame.len()`
/// on success.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    frame: &[u8],
) -> Result<usize, DataChannelError> {
    let total = frame.len();
    let mut sent = 0;

    while sent < total {
        match writer.write(&frame[sent..]).await {
            Ok(0) => {
                return Err(DataChannelError::Send {
                    sent,
                    total,
                    source: std::io::ErrorKind::WriteZero.into(),
                });
            }
            Ok(n) => {
                sent += n;
                tracing::trace!(n, sent, total, "frame chunk written");
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(DataChannelError::Send { sent, total, source }),
        }
    }

    writer
        .flush()
        .await
        .map_err(|source| DataChannelError::Send { sent, total, source })?;
    Ok(sent)
}

/// Reads exactly `capacity` bytes.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    capacity: usize,
) -> Result<Vec<u8>, DataChannelError> {
    let mut buf = vec![0u8; capacity];
    let mut received = 0;

    while received < capacity {
        let n = reader.read(&mut buf[received..]).await?;
        if n == 0 {
            return Err(DataChannelError::ShortFrame {
                received,
                expected: capacity,
            });
        }
        received += n;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    /// Accepts at most `max_chunk` bytes per write call.
    struct Trickle {
        written: Vec<u8>,
        max_chunk: usize,
        calls: usize,
    }

    impl Trickle {
        fn new(max_chunk: usize) -> Self {
            Self {
                written: Vec::new(),
                max_chunk,
                calls: 0,
            }
        }
    }

    impl AsyncWrite for Trickle {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            // Vary the chunk size between 1 and max_chunk.
            let this = &mut *self;
            this.calls += 1;
            let chunk = 1 + (this.calls * 7) % this.max_chunk;
            let n = chunk.min(buf.len());
            this.written.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn short_payload_is_zero_padded() {
        let frame = Frame::with_capacity(b"hello", 16);
        assert_eq!(frame.capacity(), 16);
        assert_eq!(frame.payload_len(), 5);
        assert!(!frame.truncated());
        assert_eq!(&frame.as_bytes()[..5], b"hello");
        assert!(frame.as_bytes()[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn long_payload_is_truncated_deterministically() {
        let payload: Vec<u8> = (1..=40u8).collect();
        let frame = Frame::with_capacity(&payload, 32);
        assert!(frame.truncated());
        assert_eq!(frame.payload_len(), 32);
        assert_eq!(frame.as_bytes(), &payload[..32]);
    }

    #[test]
    fn default_capacity() {
        let frame = Frame::new(b"File not found.");
        assert_eq!(frame.as_bytes().len(), FRAME_CAPACITY);
        assert_eq!(trim_padding(frame.as_bytes()), b"File not found.");
    }

    #[test]
    fn trim_padding_cases() {
        assert_eq!(trim_padding(b"a.txt\nsub\n\0\0\0"), b"a.txt\nsub\n");
        assert_eq!(trim_padding(b"\0\0\0"), b"");
        assert_eq!(trim_padding(b""), b"");
        assert_eq!(trim_padding(b"a\0b\0"), b"a\0b");
    }

    #[tokio::test]
    async fn partial_writes_deliver_full_capacity() {
        let frame = Frame::with_capacity(b"payload under test", 1000);

        for max_chunk in 1..=13 {
            let mut sink = Trickle::new(max_chunk);
            let sent = write_frame(&mut sink, frame.as_bytes()).await.unwrap();

            assert_eq!(sent, 1000, "max_chunk {max_chunk}");
            assert_eq!(sink.written, frame.as_bytes(), "max_chunk {max_chunk}");
            if max_chunk < 1000 {
                assert!(sink.calls > 1);
            }
        }
    }

    #[tokio::test]
    async fn scripted_partial_writes() {
        let frame = Frame::with_capacity(b"abcdef", 10);
        let bytes = frame.as_bytes();

        let mut mock = tokio_test::io::Builder::new()
            .write(&bytes[..1])
            .write(&bytes[1..4])
            .write(&bytes[4..10])
            .build();

        assert_eq!(write_frame(&mut mock, bytes).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn write_error_reports_progress() {
        let frame = Frame::with_capacity(b"abcdef", 10);
        let bytes = frame.as_bytes();

        let mut mock = tokio_test::io::Builder::new()
            .write(&bytes[..3])
            .write_error(std::io::ErrorKind::BrokenPipe.into())
            .build();

        let err = write_frame(&mut mock, bytes).await.unwrap_err();
        match err {
            DataChannelError::Send { sent, total, source } => {
                assert_eq!(sent, 3);
                assert_eq!(total, 10);
                assert_eq!(source.kind(), std::io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_frame_reassembles_chunks() {
        let frame = Frame::with_capacity(b"hello", 8);
        let bytes = frame.as_bytes();

        let mut mock = tokio_test::io::Builder::new()
            .read(&bytes[..2])
            .read(&bytes[2..7])
            .read(&bytes[7..])
            .build();

        let received = read_frame(&mut mock, 8).await.unwrap();
        assert_eq!(received, bytes);
        assert_eq!(trim_padding(&received), b"hello");
    }

    #[tokio::test]
    async fn read_frame_detects_short_frame() {
        let mut cursor: &[u8] = b"abc";
        let err = read_frame(&mut cursor, 8).await.unwrap_err();
        assert!(matches!(
            err,
            DataChannelError::ShortFrame {
                received: 3,
                expected: 8
            }
        ));
    }
}
