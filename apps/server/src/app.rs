//! Wires the server to process signals.

use ftserve_server::{Server, ServerConfig};
use tokio_util::sync::CancellationToken;

/// Runs the server until Ctrl-C.
///
/// Bind failures are returned to the caller and end the process.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let server = Server::bind(config).await?;
    let port = server.local_addr()?.port();
    tracing::info!(port, "control channel ready");

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received");
                signal_cancel.cancel();
            }
            Err(e) => tracing::error!("failed to listen for interrupt: {e}"),
        }
    });

    server.run(cancel).await?;
    Ok(())
}
