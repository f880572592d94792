//! # VolumeImport
//!
//! Operand CRD installed by the operator. Users create VolumeImports to have
//! the Data Importer populate a PersistentVolumeClaim from an external source.

use serde::{Deserialize, Serialize};

#[derive(kube::CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "VolumeImport",
    group = "dataimporter.io",
    version = "v1beta1",
    namespaced,
    status = "VolumeImportStatus",
    shortname = "vi",
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}, {"name":"Progress", "type":"string", "jsonPath":".status.progress"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VolumeImportSpec {
    pub source: ImportSource,
    /// Requested size of the target claim (e.g. "10Gi")
    pub storage: String,
    /// Storage class of the target claim
    #[serde(default)]
    pub storage_class_name: Option<String>,
}

/// Source the data is imported from; exactly one member is expected
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSource {
    /// Plain HTTP(S) download
    #[serde(default)]
    pub http: Option<HttpSource>,
    /// Container disk image in an OCI registry
    #[serde(default)]
    pub registry: Option<RegistrySource>,
    /// Data is pushed through the upload proxy
    #[serde(default)]
    pub upload: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpSource {
    pub url: String,
    /// Secret holding basic-auth credentials
    #[serde(default)]
    pub secret_ref: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySource {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeImportStatus {
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub progress: Option<String>,
}
