//! Connection supervisor.
//!
//! Listens for control connections and spawns one [`Worker`] task per
//! connection. Finished workers are reaped from a `JoinSet` in the same
//! loop that accepts, so the accept path never waits on a worker.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ftserve_data_channel::DataSender;
use ftserve_file_ops::ServedRoot;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::ServerError;
use crate::config::ServerConfig;
use crate::worker::{Worker, WorkerContext, WorkerReport};

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// How long shutdown waits for in-flight workers before aborting them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The ftserve control-channel server.
pub struct Server {
    listener: TcpListener,
    root: ServedRoot,
    config: ServerConfig,
}

impl Server {
    /// Opens the served root and binds the configured address.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let root = ServedRoot::open(&config.root).await?;

        let addr = SocketAddr::new(config.bind_ip, config.port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            root,
            config,
        })
    }

    /// Wraps an already bound listener.
    pub async fn with_listener(
        listener: TcpListener,
        config: ServerConfig,
    ) -> Result<Self, ServerError> {
        let root = ServedRoot::open(&config.root).await?;
        Ok(Self {
            listener,
            root,
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until `cancel` fires.
    ///
    /// Accept failures are logged and retried; only cancellation ends the
    /// loop. On shutdown, in-flight workers get a short grace period and
    /// are aborted after it.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ServerError> {
        let local_addr = self.listener.local_addr()?;
        tracing::info!(
            root = %self.root.path().display(),
            "server listening on {local_addr}"
        );

        let ctx = Arc::new(WorkerContext {
            root: self.root,
            sender: DataSender::new(cancel.child_token())
                .with_timeouts(self.config.connect_timeout, self.config.send_timeout),
            control_timeout: self.config.control_timeout,
        });

        let mut workers = JoinSet::new();
        let mut next_id: u64 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("server shutting down");
                    break;
                }

                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    reap(joined);
                }

                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            next_id += 1;
                            let id = next_id;
                            tracing::info!(worker = id, %peer_addr, "control connection accepted");

                            let worker = Worker::new(id, peer_addr, Arc::clone(&ctx));
                            workers.spawn(async move {
                                (id, worker.run(stream).await)
                            });
                        }
                        Err(e) => {
                            tracing::error!("accept error: {e}");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                        }
                    }
                }
            }
        }

        drop(self.listener);
        if !workers.is_empty() {
            tracing::info!(in_flight = workers.len(), "waiting for workers");
            let drain = async {
                while let Some(joined) = workers.join_next().await {
                    reap(joined);
                }
            };
            if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
                tracing::warn!(remaining = workers.len(), "aborting workers");
                workers.shutdown().await;
            }
        }

        Ok(())
    }
}

fn reap(joined: Result<(u64, Result<WorkerReport, ServerError>), JoinError>) {
    match joined {
        Ok((id, Ok(report))) => {
            tracing::info!(
                worker = id,
                command = %report.command,
                bytes = report.bytes_sent,
                payload = report.payload_len,
                "request served"
            );
        }
        Ok((id, Err(e))) => {
            tracing::error!(worker = id, "worker failed: {e}");
        }
        Err(e) if e.is_panic() => {
            tracing::error!("worker panicked: {e}");
        }
        Err(e) => {
            tracing::debug!("worker cancelled: {e}");
        }
    }
}
