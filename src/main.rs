//! # Data Importer Operator
//!
//! Watches the cluster-scoped `DataImporter` resource and computes the
//! complete set of objects a Data Importer installation requires: operand
//! CRDs and RBAC, the controller, API server and upload proxy deployments,
//! the API service and admission webhooks, and the internal PKI objects.
//!
//! Synthesis failures are reported on the resource's status conditions and
//! as Kubernetes events.

use anyhow::Result;
use data_importer_operator::runtime::{initialization::initialize, watch_loop::run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;
    run_watch_loop(init.importers, init.reconciler, init.server_state).await
}
