//! # Bloom Node Runtime
//!
//! Startup orchestration for the keyword bloom service.
//!
//! ## Startup Sequence
//!
//! 1. Resolve configuration (flags, environment, defaults)
//! 2. Load every dictionary in parallel (Initializing)
//! 3. Abort on the first load failure: nothing is bound, nothing is served,
//!    and loaders still running are abandoned
//! 4. Bind the listener and serve the gateway (Serving)
//!
//! There is no way back from Serving to Initializing; the filter set is fixed
//! for the life of the process.

pub mod config;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use bloom_filters::{load_all, FilterRegistry};
use bloom_gateway::{FilterGateway, GatewayError};
use tokio::runtime::Builder;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use config::{Cli, Command, NodeConfig, ServeArgs, TokenArgs};

/// The node runtime, before filters are loaded
pub struct NodeRuntime {
    config: NodeConfig,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    /// Load every configured dictionary
    ///
    /// Returns the registry only if all sources loaded.
    pub async fn initialize(&self) -> Result<Arc<FilterRegistry>> {
        let registry = load_all(&self.config.sources, &self.config.filters)
            .await
            .context("Bloom filter initialization failed")?;

        Ok(Arc::new(registry))
    }

    /// Load filters, bind the listener and start serving in the background
    ///
    /// The returned handle resolves once `shutdown` fires and the listener
    /// has drained.
    pub async fn start<F>(self, shutdown: F) -> Result<RunningNode>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let registry = self.initialize().await?;

        let gateway = FilterGateway::new(self.config.gateway.clone(), registry)
            .context("Invalid gateway configuration")?;
        let listener = gateway.bind().await.context("Bloom listen error")?;
        let addr = listener
            .local_addr()
            .context("Failed to read listener address")?;

        let handle = tokio::spawn(gateway.serve(listener, shutdown));
        Ok(RunningNode { addr, handle })
    }
}

/// A node in the Serving state
pub struct RunningNode {
    addr: SocketAddr,
    handle: JoinHandle<Result<(), GatewayError>>,
}

impl RunningNode {
    /// Address the gateway is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the gateway to stop
    pub async fn wait(self) -> Result<()> {
        match self.handle.await {
            Ok(result) => result.context("Bloom gateway failed"),
            Err(e) => {
                error!(error = %e, "Bloom gateway task aborted");
                Err(e).context("Bloom gateway task aborted")
            }
        }
    }
}

/// Run `future` to completion on a fresh multi-threaded runtime
///
/// The runtime is then shut down without waiting for blocking tasks, so a
/// dictionary loader stuck on a stalled source cannot keep the process alive
/// after startup has already failed.
pub fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let result = runtime.block_on(future);
    runtime.shutdown_background();
    result
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}
