//! # Override Resolution
//!
//! Merges the operator-wide namespaced defaults with the per-installation
//! customization carried by the DataImporter CR.
//!
//! Resolution never fails. The only cluster read is the priority-class
//! existence check, and any failure there degrades to "no priority class"
//! so a dangling reference never blocks synthesis.

use crate::constants::DEFAULT_PRIORITY_CLASS_NAME;
use crate::controller::cluster::{ClusterReader, LookupError};
use crate::crd::DataImporter;
use crate::observability;
use crate::resources::namespaced::NamespacedArgs;
use k8s_openapi::api::scheduling::v1::PriorityClass;
use tracing::debug;

/// Resolve the parameter set for namespaced resource generation.
///
/// With no CR the defaults are returned as-is. Otherwise the CR's pull
/// policy, verbosity, pull secrets, priority class and infra placement are
/// layered on top, and the priority class is checked against the cluster.
pub async fn resolve_namespaced_args(
    cr: Option<&DataImporter>,
    defaults: &NamespacedArgs,
    cluster: &dyn ClusterReader,
) -> NamespacedArgs {
    let mut resolved = defaults.clone();

    let Some(cr) = cr else {
        return resolved;
    };
    let spec = &cr.spec;

    if let Some(policy) = spec.image_pull_policy {
        resolved.pull_policy = policy.as_str().to_string();
    }

    if let Some(config) = &spec.config {
        if let Some(verbosity) = config.log_verbosity {
            resolved.verbosity = verbosity.to_string();
        }
        if !config.image_pull_secrets.is_empty() {
            resolved.image_pull_secrets = config.image_pull_secrets.clone();
        }
    }

    let requested = match spec.priority_class.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_PRIORITY_CLASS_NAME,
    };
    let lookup = cluster.priority_class(requested).await;
    resolved.priority_class_name = validated_priority_class(requested, lookup);

    resolved.infra_node_placement = Some(spec.infra.clone());

    resolved
}

/// Keep the requested priority class only if the lookup proved it exists.
///
/// Any lookup error, not-found or transient, yields an empty name.
pub fn validated_priority_class(
    requested: &str,
    lookup: Result<PriorityClass, LookupError>,
) -> String {
    match lookup {
        Ok(_) => requested.to_string(),
        Err(e) => {
            debug!(
                "Dropping priority class '{}' from operand pods: {}",
                requested, e
            );
            observability::metrics::increment_priority_class_fallbacks();
            String::new()
        }
    }
}
