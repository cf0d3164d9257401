//! Command-line interface.
//!
//! The listening port is the only required argument. Root directory and
//! network timeout are optional hardening knobs.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ftserve_server::{ServerConfig, validate_port};

/// Serve a directory to ftclient peers.
#[derive(Debug, Parser)]
#[command(name = "ftserver", version)]
pub struct Cli {
    /// Port for control connections (1024-65535).
    #[arg(value_parser = parse_port)]
    pub port: u16,

    /// Directory to serve (defaults to the current directory).
    #[arg(long, short = 'd')]
    pub root: Option<PathBuf>,

    /// Timeout in seconds for each network operation.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,
}

impl Cli {
    pub fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut config =
            ServerConfig::new(self.port)?.with_timeout(Duration::from_secs(self.timeout));
        if let Some(root) = self.root {
            config = config.with_root(root);
        }
        Ok(config)
    }
}

fn parse_port(s: &str) -> Result<u16, String> {
    let port: u16 = s
        .parse()
        .map_err(|_| format!("{s:?} is not a port number"))?;
    validate_port(port).map_err(|e| e.to_string())
}
