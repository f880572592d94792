//! # Error Policy
//!
//! Requeue policy for failed reconciliations.

use crate::crd::DataImporter;
use crate::observability;
use crate::runtime::watch_loop::{Reconciler, ReconcilerError};
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::{error, info};

/// Requeue a failed reconciliation after the configured error interval
pub fn handle_reconciliation_error(
    obj: Arc<DataImporter>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.name_any();

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = %name,
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}: {}", name, error);
    observability::metrics::increment_reconciliation_errors();

    let requeue = ctx.operator.config().reconciliation_error_requeue_duration();
    info!("Retrying {} in {}s", name, requeue.as_secs());
    Action::requeue(requeue)
}
