//! # Resource Set Assembler
//!
//! Computes the full desired state of an installation as an ordered list of
//! stages. Each stage either contributes its objects or stops the whole
//! synthesis; no partial list is ever returned.
//!
//! Stage order:
//! 1. Static cluster resources (only when cluster resources are deployed)
//! 2. Namespaced resources (after override resolution)
//! 3. Dynamic cluster resources
//! 4. Certificate objects (cannot fail)

use crate::config::OperatorConfig;
use crate::controller::certificates::expand_certificate_definitions;
use crate::controller::cluster::ClusterReader;
use crate::controller::overrides::resolve_namespaced_args;
use crate::crd::DataImporter;
use crate::observability;
use crate::resources::{DesiredObject, ResourceFactory};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// A fallible synthesis stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ClusterResources,
    NamespacedResources,
    DynamicResources,
}

impl Stage {
    /// Stable reason code written to the Degraded condition
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Stage::ClusterResources => "CreateResources",
            Stage::NamespacedResources => "CreateNamespaceResources",
            Stage::DynamicResources => "CreateDynamicResources",
        }
    }

    /// Human readable message written alongside the reason
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Stage::ClusterResources => "Unable to create all resources",
            Stage::NamespacedResources => "Unable to create all namespaced resources",
            Stage::DynamicResources => "Unable to create all dynamic resources",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// A stage failed; nothing from the synthesis may be used
#[derive(Debug, Error)]
#[error("{stage}: {source:#}")]
pub struct SynthesisError {
    pub stage: Stage,
    #[source]
    pub source: anyhow::Error,
}

type StageFuture<'a> = BoxFuture<'a, anyhow::Result<Vec<DesiredObject>>>;

/// Compute every object the installation requires, in stage order.
///
/// On a stage failure the remaining stages are not run.
pub async fn assemble(
    cr: &DataImporter,
    config: &OperatorConfig,
    cluster: &dyn ClusterReader,
    factory: &dyn ResourceFactory,
) -> Result<Vec<DesiredObject>, SynthesisError> {
    let started = Instant::now();
    let cluster_args = config.cluster_args();
    let namespaced_defaults = config.namespaced_defaults();

    let mut stages: Vec<(Stage, StageFuture<'_>)> = Vec::with_capacity(3);
    if config.deploy_cluster_resources {
        stages.push((
            Stage::ClusterResources,
            async { factory.cluster_static(&cluster_args) }.boxed(),
        ));
    }
    stages.push((
        Stage::NamespacedResources,
        async {
            let args = resolve_namespaced_args(Some(cr), &namespaced_defaults, cluster).await;
            factory.namespaced(&args)
        }
        .boxed(),
    ));
    stages.push((
        Stage::DynamicResources,
        factory.dynamic(&cluster_args, cluster),
    ));

    let mut resources = Vec::new();
    for (stage, generate) in stages {
        match generate.await {
            Ok(objects) => {
                debug!("{} produced {} objects", stage, objects.len());
                resources.extend(objects);
            }
            Err(source) => {
                warn!("Desired state synthesis failed at {}: {:#}", stage, source);
                observability::metrics::increment_synthesis_failures(stage.reason());
                return Err(SynthesisError { stage, source });
            }
        }
    }

    let definitions =
        factory.certificate_definitions(cr, &config.namespace, &config.operator_version);
    resources.extend(expand_certificate_definitions(&definitions));

    observability::metrics::observe_synthesis_duration(started.elapsed().as_secs_f64());
    observability::metrics::set_desired_objects(resources.len());

    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_reasons_are_stable() {
        assert_eq!(Stage::ClusterResources.reason(), "CreateResources");
        assert_eq!(
            Stage::NamespacedResources.reason(),
            "CreateNamespaceResources"
        );
        assert_eq!(Stage::DynamicResources.reason(), "CreateDynamicResources");
        assert_eq!(
            Stage::DynamicResources.message(),
            "Unable to create all dynamic resources"
        );
    }

    #[test]
    fn test_error_display_names_stage_and_cause() {
        let err = SynthesisError {
            stage: Stage::NamespacedResources,
            source: anyhow::anyhow!("bad affinity"),
        };
        assert_eq!(err.to_string(), "CreateNamespaceResources: bad affinity");
    }
}
