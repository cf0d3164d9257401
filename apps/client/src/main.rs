//! ftserve client entry point.

mod cli;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;
use ftserve_client::{Client, Response};
use ftserve_protocol::Command;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let (config, command, output) = cli.into_parts();
    let client = Client::new(config);

    let rt = tokio::runtime::Runtime::new()?;
    let response = rt.block_on(client.request(&command))?;

    match (command, response) {
        (_, Response::Error(reply)) => bail!("server replied: {}", reply.as_str()),
        (Command::Get(name), Response::File(bytes)) => {
            let path = output.unwrap_or_else(|| name.clone().into());
            save(&path, &bytes)?;
            tracing::info!(file = %name, bytes = bytes.len(), "transfer complete");
            eprintln!("{name}: {} bytes written to {}", bytes.len(), path.display());
        }
        (_, Response::Listing(bytes) | Response::File(bytes)) => {
            std::io::stdout()
                .write_all(&bytes)
                .context("failed to write listing")?;
        }
    }

    Ok(())
}

fn save(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
