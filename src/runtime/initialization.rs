//! # Initialization
//!
//! Operator startup: rustls setup, tracing, metrics, probe server and
//! Kubernetes client.

use crate::config::OperatorConfig;
use crate::constants::{
    DEFAULT_SERVER_POLL_INTERVAL_MS, DEFAULT_SERVER_STARTUP_TIMEOUT_SECS, EVENT_REPORTER,
};
use crate::controller::cluster::KubeClusterReader;
use crate::controller::operator::DataImporterOperator;
use crate::controller::server::{start_server, ServerState};
use crate::controller::status::KubeEventRecorder;
use crate::crd::DataImporter;
use crate::observability;
use crate::resources::StandardResources;
use crate::runtime::watch_loop::Reconciler;
use anyhow::{Context, Result};
use kube::{api::Api, Client};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Everything the watch loop needs
pub struct InitializationResult {
    pub client: Client,
    /// API for DataImporter resources (cluster scoped)
    pub importers: Api<DataImporter>,
    pub reconciler: Arc<Reconciler>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.is_ready.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Initialize the operator runtime
pub async fn initialize() -> Result<InitializationResult> {
    // Must happen before any TLS connection is made
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    let config = OperatorConfig::from_env();
    init_tracing(&config);

    if !provider_installed {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting Data Importer Operator {}", config.operator_version);
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(
        "Operand namespace: {}, cluster resources: {}",
        config.namespace, config.deploy_cluster_resources
    );

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_state_clone = Arc::clone(&server_state);
    let server_port = config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let importers: Api<DataImporter> = Api::all(client.clone());

    let operator = DataImporterOperator::new(
        config,
        Arc::new(KubeClusterReader::new(client.clone())),
        Arc::new(StandardResources),
        Arc::new(KubeEventRecorder::new(client.clone(), EVENT_REPORTER)),
    );
    let reconciler = Arc::new(Reconciler::new(client.clone(), operator));

    info!("Operator initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        importers,
        reconciler,
        server_state,
    })
}

fn init_tracing(config: &OperatorConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "data_importer_operator=info".into());

    if config.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(DEFAULT_SERVER_STARTUP_TIMEOUT_SECS);
    let poll_interval = Duration::from_millis(DEFAULT_SERVER_POLL_INTERVAL_MS);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready.load(Ordering::Relaxed) {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}
