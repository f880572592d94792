//! # Resource Factory
//!
//! The seam between the assembler and the concrete resource builders.

use super::cluster::{self, ClusterArgs};
use super::namespaced::{self, NamespacedArgs};
use super::{dynamic, DesiredObject};
use crate::controller::certificates::{self, CertificateDefinition};
use crate::controller::cluster::ClusterReader;
use crate::crd::DataImporter;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ResourceFactory: Send + Sync {
    /// Static cluster-scoped resources
    fn cluster_static(&self, args: &ClusterArgs) -> Result<Vec<DesiredObject>>;

    /// Resources in the operand namespace
    fn namespaced(&self, args: &NamespacedArgs) -> Result<Vec<DesiredObject>>;

    /// Cluster-scoped resources that depend on live cluster state
    async fn dynamic(
        &self,
        args: &ClusterArgs,
        cluster: &dyn ClusterReader,
    ) -> Result<Vec<DesiredObject>>;

    /// Certificate definitions for the installation
    fn certificate_definitions(
        &self,
        cr: &DataImporter,
        namespace: &str,
        version: &str,
    ) -> Vec<CertificateDefinition>;
}

/// The builders shipped with the operator
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardResources;

#[async_trait]
impl ResourceFactory for StandardResources {
    fn cluster_static(&self, args: &ClusterArgs) -> Result<Vec<DesiredObject>> {
        cluster::create_static_resources(args)
    }

    fn namespaced(&self, args: &NamespacedArgs) -> Result<Vec<DesiredObject>> {
        namespaced::create_namespaced_resources(args)
    }

    async fn dynamic(
        &self,
        args: &ClusterArgs,
        cluster: &dyn ClusterReader,
    ) -> Result<Vec<DesiredObject>> {
        dynamic::create_dynamic_resources(args, cluster).await
    }

    fn certificate_definitions(
        &self,
        cr: &DataImporter,
        namespace: &str,
        version: &str,
    ) -> Vec<CertificateDefinition> {
        certificates::certificate_definitions(namespace, version, cr.spec.cert_config.as_ref())
    }
}
