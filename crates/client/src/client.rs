//! Request/response round trip against an ftserve server.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use ftserve_data_channel::DataReceiver;
use ftserve_protocol::constants::{CONTROL_IO_TIMEOUT, DATA_SEND_TIMEOUT};
use ftserve_protocol::{ACK, Command, FRAME_CAPACITY, MAX_FIELD_SIZE, Reply};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::ClientError;
use crate::network::advertise_address;

/// Where to reach the server and how to be reached back.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Data-channel port to listen on (0 = OS-assigned).
    pub data_port: u16,
    /// Address sent to the server; derived from the route to the server
    /// when unset.
    pub advertise: Option<IpAddr>,
    /// Bound on each control exchange.
    pub control_timeout: Duration,
    /// Bound on waiting for, and reading, the response frame.
    pub data_timeout: Duration,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, data_port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            data_port,
            advertise: None,
            control_timeout: CONTROL_IO_TIMEOUT,
            data_timeout: DATA_SEND_TIMEOUT,
        }
    }
}

/// Decoded response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Newline-terminated listing, padding removed.
    Listing(Vec<u8>),
    /// File bytes, padding removed.
    File(Vec<u8>),
    /// One of the fixed error replies.
    Error(Reply),
}

impl Response {
    /// Entry names of a listing; empty for other responses.
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Listing(bytes) => String::from_utf8_lossy(bytes)
                .lines()
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn classify(command: &Command, payload: Vec<u8>) -> Self {
        if let Some(reply) = Reply::from_payload(&payload) {
            return Self::Error(reply);
        }
        match command {
            Command::Get(_) => Self::File(payload),
            _ => Self::Listing(payload),
        }
    }
}

/// Client for one server.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Sends `command` and waits for the response frame.
    pub async fn request(&self, command: &Command) -> Result<Response, ClientError> {
        let server = self.resolve_server().await?;
        let advertise = self
            .config
            .advertise
            .unwrap_or_else(|| advertise_address(server.ip()));

        // Listen before sending anything so the connect-back cannot race us.
        let bind_ip = match advertise {
            ip if ip.is_loopback() => ip,
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let receiver = DataReceiver::bind(SocketAddr::new(bind_ip, self.config.data_port))
            .await?
            .with_timeouts(self.config.data_timeout, self.config.data_timeout);
        let data_port = receiver.port()?;

        let mut control = match tokio::time::timeout(
            self.config.control_timeout,
            TcpStream::connect(server),
        )
        .await
        {
            Ok(r) => r?,
            Err(_) => return Err(ClientError::Timeout("control connect")),
        };
        info!(%server, "connected to server");

        send_request(
            &mut control,
            command,
            data_port,
            &advertise.to_string(),
            self.config.control_timeout,
        )
        .await?;

        let payload = receiver.receive(FRAME_CAPACITY).await?;
        drop(control);

        Ok(Response::classify(command, payload))
    }

    async fn resolve_server(&self) -> Result<SocketAddr, ClientError> {
        let target = format!("{}:{}", self.config.host, self.config.port);
        tokio::net::lookup_host((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| ClientError::Resolve(format!("{target}: {e}")))?
            .next()
            .ok_or(ClientError::Resolve(target))
    }
}

/// Writes the handshake fields for `command`, waiting for `OK` after each.
pub(crate) async fn send_request<S>(
    stream: &mut S,
    command: &Command,
    data_port: u16,
    address: &str,
    timeout: Duration,
) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    send_field(stream, "command", command.token(), timeout).await?;
    send_field(stream, "data port", &data_port.to_string(), timeout).await?;
    send_field(stream, "address", address, timeout).await?;
    if let Command::Get(filename) = command {
        send_field(stream, "filename", filename, timeout).await?;
    }
    Ok(())
}

async fn send_field<S>(
    stream: &mut S,
    field: &'static str,
    value: &str,
    timeout: Duration,
) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if value.len() > MAX_FIELD_SIZE {
        return Err(ClientError::FieldTooLong {
            field,
            len: value.len(),
            max: MAX_FIELD_SIZE,
        });
    }

    let exchange = async {
        stream.write_all(value.as_bytes()).await?;
        stream.flush().await?;
        let mut ack = [0u8; 2];
        stream.read_exact(&mut ack).await?;
        Ok::<_, std::io::Error>(ack)
    };

    let ack = match tokio::time::timeout(timeout, exchange).await {
        Ok(r) => r?,
        Err(_) => return Err(ClientError::Timeout(field)),
    };
    if &ack != ACK {
        return Err(ClientError::UnexpectedAck {
            field,
            got: String::from_utf8_lossy(&ack).into_owned(),
        });
    }

    debug!(field, value, "field acknowledged");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn list_sends_three_fields() {
        let mut mock = Builder::new()
            .write(b"-l")
            .read(b"OK")
            .write(b"9500")
            .read(b"OK")
            .write(b"127.0.0.1")
            .read(b"OK")
            .build();

        send_request(&mut mock, &Command::List, 9500, "127.0.0.1", TIMEOUT)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_sends_filename_last() {
        let mut mock = Builder::new()
            .write(b"-g")
            .read(b"OK")
            .write(b"9500")
            .read(b"OK")
            .write(b"127.0.0.1")
            .read(b"OK")
            .write(b"a.txt")
            .read(b"OK")
            .build();

        send_request(
            &mut mock,
            &Command::Get("a.txt".into()),
            9500,
            "127.0.0.1",
            TIMEOUT,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn wrong_ack_is_rejected() {
        let mut mock = Builder::new().write(b"-l").read(b"NO").build();

        let err = send_request(&mut mock, &Command::List, 9500, "127.0.0.1", TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::UnexpectedAck {
                field: "command",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn oversized_filename_is_refused_locally() {
        let mut mock = Builder::new()
            .write(b"-g")
            .read(b"OK")
            .write(b"9500")
            .read(b"OK")
            .write(b"127.0.0.1")
            .read(b"OK")
            .build();

        let name = "n".repeat(MAX_FIELD_SIZE + 1);
        let err = send_request(&mut mock, &Command::Get(name), 9500, "127.0.0.1", TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::FieldTooLong { field: "filename", .. }));
    }

    #[test]
    fn classify_payloads() {
        assert_eq!(
            Response::classify(&Command::Get("x".into()), b"File not found.".to_vec()),
            Response::Error(Reply::NotFound)
        );
        assert_eq!(
            Response::classify(&Command::Get("x".into()), b"hello".to_vec()),
            Response::File(b"hello".to_vec())
        );

        let listing = Response::classify(&Command::List, b"a.txt\nsub\n".to_vec());
        assert_eq!(listing.names(), vec!["a.txt".to_string(), "sub".to_string()]);
    }
}
