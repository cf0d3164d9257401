//! Server configuration.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use ftserve_protocol::constants::{
    CONTROL_IO_TIMEOUT, DATA_CONNECT_TIMEOUT, DATA_SEND_TIMEOUT, LISTEN_PORT_RANGE,
};

use crate::ServerError;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port for control connections (0 = OS-assigned).
    pub port: u16,
    /// Address to listen on.
    pub bind_ip: IpAddr,
    /// Directory exposed to clients.
    pub root: PathBuf,
    /// Bound on each control-channel read or write.
    pub control_timeout: Duration,
    /// Bound on opening the data channel.
    pub connect_timeout: Duration,
    /// Bound on transmitting the response frame.
    pub send_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            control_timeout: CONTROL_IO_TIMEOUT,
            connect_timeout: DATA_CONNECT_TIMEOUT,
            send_timeout: DATA_SEND_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Configuration listening on `port`, which must lie in 1024-65535.
    pub fn new(port: u16) -> Result<Self, ServerError> {
        Ok(Self {
            port: validate_port(port)?,
            ..Self::default()
        })
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_bind_ip(mut self, ip: IpAddr) -> Self {
        self.bind_ip = ip;
        self
    }

    /// Sets every network timeout to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.control_timeout = timeout;
        self.connect_timeout = timeout;
        self.send_timeout = timeout;
        self
    }
}

/// Checks that a listening port is in the allowed range.
pub fn validate_port(port: u16) -> Result<u16, ServerError> {
    if LISTEN_PORT_RANGE.contains(&port) {
        Ok(port)
    } else {
        Err(ServerError::InvalidPort(port))
    }
}
