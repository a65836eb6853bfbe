//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics,
//! server startup, and Kubernetes client setup.

use crate::config::{ControllerConfig, ServerConfig};
use crate::controller::gateway::{ClusterGateway, KubeGateway};
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::observability;
use crate::store::FingerprintStore;
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tracing::{error, info};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// One reconciler per watched namespace, sharing a single store
    pub reconcilers: Vec<Reconciler>,
    /// Process-lifetime fingerprint store
    pub store: Arc<FingerprintStore>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field(
                "namespaces",
                &self
                    .reconcilers
                    .iter()
                    .map(Reconciler::namespace)
                    .collect::<Vec<_>>(),
            )
            .field("server_ready", &self.server_state.is_ready())
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - Reconciler setup, one per namespace
///
/// # Errors
///
/// Fails if logging or metrics cannot be installed, the HTTP server does not
/// come up in time, or no Kubernetes client can be built.
pub async fn initialize(
    controller_config: &ControllerConfig,
    server_config: &ServerConfig,
) -> Result<InitializationResult> {
    // Required for rustls 0.23+ when no default provider is set via features.
    // An already installed provider is kept.
    let _ = rustls::crypto::ring::default_provider().install_default();

    observability::logging::init_logging(
        &controller_config.log_level,
        &controller_config.log_format,
        controller_config.log_enable_color,
    )?;

    info!("Starting Deployment Flipper");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    observability::metrics::register_metrics().context("Failed to register metrics")?;

    let server_state = Arc::new(ServerState::default());

    // Start HTTP server for metrics and probes
    let server_state_clone = Arc::clone(&server_state);
    let server_port = server_config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    wait_for_server_ready(&server_state, &server_handle, server_config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let gateway: Arc<dyn ClusterGateway> = Arc::new(KubeGateway::new(
        client,
        controller_config.watch_annotation.clone(),
    ));
    let store = Arc::new(FingerprintStore::new());
    let reconcilers = build_reconcilers(&gateway, &store, &controller_config.watch_namespaces);

    info!(
        namespaces = ?controller_config.watch_namespaces,
        annotation = controller_config.watch_annotation.as_str(),
        interval_secs = controller_config.poll_interval().as_secs(),
        "Controller initialized, starting poll loop..."
    );

    Ok(InitializationResult {
        reconcilers,
        store,
        server_state,
    })
}

/// One reconciler per namespace over a shared gateway and store
#[must_use]
pub fn build_reconcilers(
    gateway: &Arc<dyn ClusterGateway>,
    store: &Arc<FingerprintStore>,
    namespaces: &[String],
) -> Vec<Reconciler> {
    namespaces
        .iter()
        .map(|namespace| Reconciler::new(Arc::clone(gateway), Arc::clone(store), namespace.as_str()))
        .collect()
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
    server_config: &ServerConfig,
) -> Result<()> {
    let startup_timeout = server_config.startup_timeout();
    let poll_interval = server_config.poll_interval();
    let start_time = std::time::Instant::now();

    loop {
        // Check if server task crashed
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready() {
            info!("HTTP server is ready and accepting connections");
            break;
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }

    Ok(())
}
