//! # DataImporter Spec
//!
//! Main CRD specification types and default values.

use serde::{Deserialize, Serialize};

/// DataImporter Custom Resource Definition
///
/// A single cluster-scoped DataImporter describes one installation of the
/// Data Importer. The operator derives every deployment, RBAC object, service,
/// webhook and certificate secret the installation needs from it.
///
/// # Example
///
/// ```yaml
/// apiVersion: dataimporter.io/v1beta1
/// kind: DataImporter
/// metadata:
///   name: data-importer
/// spec:
///   imagePullPolicy: IfNotPresent
///   priorityClass: system-cluster-critical
///   config:
///     logVerbosity: 3
///     imagePullSecrets:
///       - name: registry-creds
///   infra:
///     nodeSelector:
///       kubernetes.io/os: linux
/// ```
#[derive(
    kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema,
)]
#[kube(
    kind = "DataImporter",
    group = "dataimporter.io",
    version = "v1beta1",
    status = "crate::crd::DataImporterStatus",
    shortname = "di",
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}, {"name":"Degraded", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Degraded\")].status"}, {"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DataImporterSpec {
    /// Image pull policy for every operand container
    /// When unset the operator-wide default (PULL_POLICY) is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<ImagePullPolicy>,
    /// Operand runtime configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DataImporterConfig>,
    /// Name of the PriorityClass for operand pods
    /// Defaults to kubevirt-cluster-critical; dropped entirely if the class does not exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class: Option<String>,
    /// Node placement for infrastructure pods (controller, API server, upload proxy)
    #[serde(default)]
    pub infra: crate::crd::NodePlacement,
    /// Certificate lifetimes for the operand's internal PKI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_config: Option<crate::crd::CertConfig>,
}

/// Operand runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataImporterConfig {
    /// Log verbosity passed to operand binaries as `-v=<n>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_verbosity: Option<i32>,
    /// Pull secrets attached to operand pods
    /// A non-empty list replaces the operator defaults entirely
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<ImagePullSecret>,
}

/// Reference to an image pull secret in the operand namespace
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ImagePullSecret {
    pub name: String,
}

impl ImagePullSecret {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Container image pull policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
pub enum ImagePullPolicy {
    Always,
    IfNotPresent,
    Never,
}

impl ImagePullPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImagePullPolicy::Always => "Always",
            ImagePullPolicy::IfNotPresent => "IfNotPresent",
            ImagePullPolicy::Never => "Never",
        }
    }
}

impl std::fmt::Display for ImagePullPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
