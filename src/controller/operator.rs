//! # DataImporter Operator
//!
//! The surface a reconcile engine drives: status access, an empty CR
//! prototype, the dependent kinds to scan, creation-mode detection and the
//! desired state itself.

use crate::config::OperatorConfig;
use crate::controller::assembler::{assemble, SynthesisError};
use crate::controller::cluster::ClusterReader;
use crate::controller::mode;
use crate::controller::status::{mark_failed_healing, mark_recovered, EventRecorder};
use crate::crd::{DataImporter, DataImporterSpec, DataImporterStatus};
use crate::resources::{DependentKind, DesiredObject, ResourceFactory};
use kube::Resource;
use std::sync::Arc;
use tracing::{debug, info};

/// Desired-state synthesis for one operator namespace
pub struct DataImporterOperator {
    config: OperatorConfig,
    cluster: Arc<dyn ClusterReader>,
    factory: Arc<dyn ResourceFactory>,
    recorder: Arc<dyn EventRecorder>,
}

impl std::fmt::Debug for DataImporterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataImporterOperator")
            .field("namespace", &self.config.namespace)
            .field("operator_version", &self.config.operator_version)
            .finish_non_exhaustive()
    }
}

impl DataImporterOperator {
    /// Wire the operator to its cluster reader, resource factory and event sink
    #[must_use]
    pub fn new(
        config: OperatorConfig,
        cluster: Arc<dyn ClusterReader>,
        factory: Arc<dyn ResourceFactory>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        Self {
            config,
            cluster,
            factory,
            recorder,
        }
    }

    #[must_use]
    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    /// Mutable status of the CR, created empty when missing
    pub fn status(cr: &mut DataImporter) -> &mut DataImporterStatus {
        cr.status.get_or_insert_with(Default::default)
    }

    /// A blank CR used as a decode target
    #[must_use]
    pub fn new_empty() -> DataImporter {
        DataImporter::new("", DataImporterSpec::default())
    }

    /// List kinds scanned for objects owned by an installation
    #[must_use]
    pub fn dependent_list_kinds() -> Vec<DependentKind> {
        DependentKind::ALL.to_vec()
    }

    /// Whether this reconciliation should take the initial-install path
    pub async fn is_initial_create(&self, cr: &DataImporter) -> anyhow::Result<bool> {
        let initial = mode::is_initial_create(self.cluster.as_ref(), &self.config.namespace).await;
        debug!(
            "{} initial create: {}",
            cr.metadata.name.as_deref().unwrap_or("unknown"),
            initial
        );
        Ok(initial)
    }

    /// Compute every object the installation requires.
    ///
    /// On failure the CR status is marked degraded with the failing stage's
    /// reason before the error is returned. A success clears an earlier
    /// degraded mark.
    pub async fn desired_state(
        &self,
        cr: &mut DataImporter,
    ) -> Result<Vec<DesiredObject>, SynthesisError> {
        let result = assemble(
            cr,
            &self.config,
            self.cluster.as_ref(),
            self.factory.as_ref(),
        )
        .await;

        match result {
            Ok(objects) => {
                if let Some(status) = cr.status.as_mut() {
                    if mark_recovered(status) {
                        info!(
                            "{} recovered from degraded state",
                            cr.metadata.name.as_deref().unwrap_or("unknown")
                        );
                    }
                }
                info!(
                    "Desired state for {} holds {} objects",
                    cr.metadata.name.as_deref().unwrap_or("unknown"),
                    objects.len()
                );
                Ok(objects)
            }
            Err(err) => {
                let object = cr.object_ref(&());
                mark_failed_healing(
                    &object,
                    Self::status(cr),
                    err.stage.reason(),
                    err.stage.message(),
                    self.recorder.as_ref(),
                )
                .await;
                Err(err)
            }
        }
    }
}
