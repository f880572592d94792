//! # Cluster Reads
//!
//! The read-only view of the cluster the synthesis core depends on. Every read
//! is a single blocking call against the API server with no retry; callers
//! decide how a failure degrades.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::api::scheduling::v1::PriorityClass;
use kube::{Api, Client};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },
    #[error("Kubernetes API request failed: {0}")]
    Api(#[from] kube::Error),
}

impl LookupError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }
}

#[async_trait]
pub trait ClusterReader: Send + Sync {
    /// Fetch a PriorityClass by name
    async fn priority_class(&self, name: &str) -> Result<PriorityClass, LookupError>;

    /// Fetch a ConfigMap; `Ok(None)` when it does not exist
    async fn config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, LookupError>;
}

/// `ClusterReader` backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeClusterReader {
    client: Client,
}

impl std::fmt::Debug for KubeClusterReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterReader").finish_non_exhaustive()
    }
}

impl KubeClusterReader {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterReader for KubeClusterReader {
    async fn priority_class(&self, name: &str) -> Result<PriorityClass, LookupError> {
        let api: Api<PriorityClass> = Api::all(self.client.clone());
        match api.get(name).await {
            Ok(pc) => Ok(pc),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                debug!("PriorityClass {} not found", name);
                Err(LookupError::NotFound {
                    kind: "PriorityClass",
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, LookupError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }
}
