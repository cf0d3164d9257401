//! Command-line interface.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ftserve_client::ClientConfig;
use ftserve_protocol::Command;

/// List or fetch files from an ftserve server.
#[derive(Debug, Parser)]
#[command(name = "ftclient", version)]
pub struct Cli {
    /// Server host name or address.
    pub host: String,

    /// Server control port.
    pub port: u16,

    #[command(subcommand)]
    pub action: Action,

    /// Address the server should connect back to (auto-detected if unset).
    #[arg(long, global = true)]
    pub advertise: Option<IpAddr>,

    /// Timeout in seconds for each network operation.
    #[arg(long, global = true, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Print the server's directory listing.
    List {
        /// Local port for the data channel (0 = any).
        data_port: u16,
    },
    /// Download one file.
    Get {
        filename: String,
        /// Local port for the data channel (0 = any).
        data_port: u16,
        /// Where to save the file (defaults to its name).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Splits into client configuration, command and output path.
    pub fn into_parts(self) -> (ClientConfig, Command, Option<PathBuf>) {
        let (command, data_port, output) = match self.action {
            Action::List { data_port } => (Command::List, data_port, None),
            Action::Get {
                filename,
                data_port,
                output,
            } => (Command::Get(filename), data_port, output),
        };

        let timeout = Duration::from_secs(self.timeout);
        let mut config = ClientConfig::new(self.host, self.port, data_port);
        config.advertise = self.advertise;
        config.control_timeout = timeout;
        config.data_timeout = timeout;

        (config, command, output)
    }
}
