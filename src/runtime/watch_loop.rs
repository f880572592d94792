//! # Watch Loop
//!
//! Watches `DataImporter` resources and computes their desired state on every
//! change. Applying the objects is left to the reconcile engine that consumes
//! the plan; this loop logs it and persists status whenever synthesis changed it.

use crate::controller::assembler::SynthesisError;
use crate::controller::operator::DataImporterOperator;
use crate::controller::server::ServerState;
use crate::crd::{DataImporter, DataImporterStatus};
use crate::observability;
use crate::runtime::error_policy::handle_reconciliation_error;
use futures::StreamExt;
use kube::api::{Api, Patch, PatchParams};
use kube::{Client, ResourceExt};
use kube_runtime::{controller::Action, watcher, Controller};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn, Instrument};

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Desired state synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("Failed to persist status of {name}: {source}")]
    StatusPatch {
        name: String,
        #[source]
        source: kube::Error,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reconcile context shared by every reconciliation
pub struct Reconciler {
    pub client: Client,
    pub operator: DataImporterOperator,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("operator", &self.operator)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(client: Client, operator: DataImporterOperator) -> Self {
        Self { client, operator }
    }
}

/// Reconcile one `DataImporter`
pub async fn reconcile(
    obj: Arc<DataImporter>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let span = tracing::info_span!("controller.reconcile", resource.name = %obj.name_any());
    reconcile_instrumented(obj, ctx).instrument(span).await
}

async fn reconcile_instrumented(
    obj: Arc<DataImporter>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let started = Instant::now();
    observability::metrics::increment_reconciliations();

    let operator = &ctx.operator;
    let name = obj.name_any();
    let initial_create = operator.is_initial_create(&obj).await?;

    let mut cr = (*obj).clone();
    let result = operator.desired_state(&mut cr).await;
    observability::metrics::observe_reconciliation_duration(started.elapsed().as_secs_f64());

    if cr.status != obj.status {
        if let Some(status) = &cr.status {
            patch_status(&ctx.client, &name, status).await?;
        }
    }

    match result {
        Ok(objects) => {
            for object in &objects {
                debug!("desired: {}", object.key());
            }
            info!(
                "Computed {} desired objects for {} (initial create: {})",
                objects.len(),
                name,
                initial_create
            );
            Ok(Action::requeue(operator.config().reconcile_requeue_duration()))
        }
        Err(err) => Err(err.into()),
    }
}

async fn patch_status(
    client: &Client,
    name: &str,
    status: &DataImporterStatus,
) -> Result<(), ReconcilerError> {
    let api: Api<DataImporter> = Api::all(client.clone());
    let patch = serde_json::json!({ "status": status });
    api.patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(|source| ReconcilerError::StatusPatch {
            name: name.to_string(),
            source,
        })?;
    debug!("Persisted status of {}", name);
    Ok(())
}

/// Run the controller until a shutdown signal arrives
pub async fn run_watch_loop(
    importers: Api<DataImporter>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    info!("Starting controller watch loop...");

    Controller::new(importers, watcher::Config::default().any_semantic())
        .shutdown_on_signal()
        .run(reconcile, handle_reconciliation_error, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((object, _)) => debug!("Reconciled {}", object.name),
                Err(e) => warn!("Controller stream error: {}", e),
            }
        })
        .await;

    server_state.is_ready.store(false, Ordering::Relaxed);
    info!("Watch loop stopped");
    Ok(())
}
