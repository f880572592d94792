//! # Operator Configuration
//!
//! Operator-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_DOCKER_REPO, DEFAULT_METRICS_PORT, DEFAULT_OPERATOR_NAMESPACE, DEFAULT_PULL_POLICY,
    DEFAULT_RECONCILE_REQUEUE_SECS, DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS, DEFAULT_VERBOSITY,
};
use crate::resources::cluster::ClusterArgs;
use crate::resources::namespaced::NamespacedArgs;
use std::time::Duration;

/// Operator-level configuration
///
/// All settings have defaults and can be overridden via environment variables
/// set on the operator deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Namespace the operator and its operands run in
    pub namespace: String,
    /// Version stamped on generated objects and reported in status
    pub operator_version: String,
    /// Whether static cluster-scoped resources are part of the desired state
    pub deploy_cluster_resources: bool,
    pub docker_repo: String,
    pub docker_tag: String,
    pub controller_image: String,
    pub importer_image: String,
    pub cloner_image: String,
    pub apiserver_image: String,
    pub uploadproxy_image: String,
    pub uploadserver_image: String,
    pub pull_policy: String,
    pub verbosity: String,
    /// Port for the metrics and probe server
    pub metrics_port: u16,
    /// Requeue interval after a successful reconciliation (seconds)
    pub reconcile_requeue_secs: u64,
    /// Requeue interval after a failed reconciliation (seconds)
    pub reconciliation_error_requeue_secs: u64,
    /// Log format (json, text)
    pub log_format: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl OperatorConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Env(&lookup);
        let operator_version =
            env.string("OPERATOR_VERSION", &format!("v{}", env!("CARGO_PKG_VERSION")));
        let namespace = env
            .get("OPERATOR_NAMESPACE")
            .or_else(|| env.get("POD_NAMESPACE"))
            .unwrap_or_else(|| DEFAULT_OPERATOR_NAMESPACE.to_string());

        Self {
            namespace,
            deploy_cluster_resources: env.enabled_unless_false("DEPLOY_CLUSTER_RESOURCES"),
            docker_repo: env.string("DOCKER_REPO", DEFAULT_DOCKER_REPO),
            docker_tag: env.string("DOCKER_TAG", &operator_version),
            controller_image: env.string("CONTROLLER_IMAGE", "data-importer-controller"),
            importer_image: env.string("IMPORTER_IMAGE", "data-importer-importer"),
            cloner_image: env.string("CLONER_IMAGE", "data-importer-cloner"),
            apiserver_image: env.string("APISERVER_IMAGE", "data-importer-apiserver"),
            uploadproxy_image: env.string("UPLOADPROXY_IMAGE", "data-importer-uploadproxy"),
            uploadserver_image: env.string("UPLOADSERVER_IMAGE", "data-importer-uploadserver"),
            pull_policy: env.string("PULL_POLICY", DEFAULT_PULL_POLICY),
            verbosity: env.string("VERBOSITY", DEFAULT_VERBOSITY),
            metrics_port: env.parsed("METRICS_PORT", DEFAULT_METRICS_PORT),
            reconcile_requeue_secs: env
                .parsed("RECONCILE_REQUEUE_SECS", DEFAULT_RECONCILE_REQUEUE_SECS),
            reconciliation_error_requeue_secs: env.parsed(
                "RECONCILIATION_ERROR_REQUEUE_SECS",
                DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS,
            ),
            log_format: env.string("LOG_FORMAT", "text"),
            operator_version,
        }
    }

    /// Defaults for namespaced resource generation, before CR overrides
    #[must_use]
    pub fn namespaced_defaults(&self) -> NamespacedArgs {
        NamespacedArgs {
            namespace: self.namespace.clone(),
            operator_version: self.operator_version.clone(),
            docker_repo: self.docker_repo.clone(),
            docker_tag: self.docker_tag.clone(),
            controller_image: self.controller_image.clone(),
            importer_image: self.importer_image.clone(),
            cloner_image: self.cloner_image.clone(),
            apiserver_image: self.apiserver_image.clone(),
            uploadproxy_image: self.uploadproxy_image.clone(),
            uploadserver_image: self.uploadserver_image.clone(),
            verbosity: self.verbosity.clone(),
            pull_policy: self.pull_policy.clone(),
            image_pull_secrets: Vec::new(),
            priority_class_name: String::new(),
            infra_node_placement: None,
        }
    }

    /// Inputs for the static and dynamic cluster builders
    #[must_use]
    pub fn cluster_args(&self) -> ClusterArgs {
        ClusterArgs {
            namespace: self.namespace.clone(),
            operator_version: self.operator_version.clone(),
        }
    }

    /// Get successful reconciliation requeue duration
    #[must_use]
    pub fn reconcile_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.reconcile_requeue_secs)
    }

    /// Get reconciliation error requeue duration
    #[must_use]
    pub fn reconciliation_error_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.reconciliation_error_requeue_secs)
    }

    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Read variable as string or return default
    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Read variable or return default value
    fn parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Enabled unless the variable is exactly `false`
    fn enabled_unless_false(&self, key: &str) -> bool {
        self.get(key).is_none_or(|v| v != "false")
    }
}
