//! Common test utilities for desired-state tests
//!
//! In-memory stand-ins for the cluster, the event sink and the resource
//! factory, so the synthesis core can be driven without a live cluster.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use async_trait::async_trait;
use data_importer_operator::prelude::*;
use k8s_openapi::api::core::v1::{ConfigMap, ObjectReference};
use k8s_openapi::api::scheduling::v1::PriorityClass;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn transient_error() -> LookupError {
    let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    LookupError::Api(kube::Error::SerdeError(serde_err))
}

/// Cluster with a fixed set of priority classes and config maps
#[derive(Default)]
pub struct FakeCluster {
    priority_classes: HashSet<String>,
    config_maps: BTreeMap<(String, String), ConfigMap>,
    pub priority_class_unreachable: bool,
    pub config_maps_unreachable: bool,
    pub priority_class_lookups: AtomicUsize,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority_class(mut self, name: &str) -> Self {
        self.priority_classes.insert(name.to_string());
        self
    }

    pub fn with_config_map(mut self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        let config_map = ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: Some(
                data.iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            ..Default::default()
        };
        self.config_maps
            .insert((namespace.to_string(), name.to_string()), config_map);
        self
    }

    pub fn lookups(&self) -> usize {
        self.priority_class_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterReader for FakeCluster {
    async fn priority_class(&self, name: &str) -> Result<PriorityClass, LookupError> {
        self.priority_class_lookups.fetch_add(1, Ordering::SeqCst);
        if self.priority_class_unreachable {
            return Err(transient_error());
        }
        if self.priority_classes.contains(name) {
            Ok(PriorityClass {
                metadata: ObjectMeta {
                    name: Some(name.to_string()),
                    ..Default::default()
                },
                value: 1_000_000,
                ..Default::default()
            })
        } else {
            Err(LookupError::NotFound {
                kind: "PriorityClass",
                name: name.to_string(),
            })
        }
    }

    async fn config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, LookupError> {
        if self.config_maps_unreachable {
            return Err(transient_error());
        }
        Ok(self
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}

/// Captures warning events instead of publishing them
#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingEvents {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRecorder for RecordingEvents {
    async fn warning(&self, _object: &ObjectReference, reason: &str, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push((reason.to_string(), message.to_string()));
    }
}

/// Standard builders with an optional injected failure and a call log
#[derive(Default)]
pub struct FaultyFactory {
    inner: StandardResources,
    fail_at: Option<Stage>,
    calls: Mutex<Vec<Stage>>,
    namespaced_args: Mutex<Option<NamespacedArgs>>,
}

impl FaultyFactory {
    pub fn failing_at(stage: Stage) -> Self {
        Self {
            fail_at: Some(stage),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Stage> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments the namespaced builder last received
    pub fn namespaced_args(&self) -> Option<NamespacedArgs> {
        self.namespaced_args.lock().unwrap().clone()
    }

    fn enter(&self, stage: Stage) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(stage);
        if self.fail_at == Some(stage) {
            anyhow::bail!("injected failure in {stage}");
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceFactory for FaultyFactory {
    fn cluster_static(&self, args: &ClusterArgs) -> anyhow::Result<Vec<DesiredObject>> {
        self.enter(Stage::ClusterResources)?;
        self.inner.cluster_static(args)
    }

    fn namespaced(&self, args: &NamespacedArgs) -> anyhow::Result<Vec<DesiredObject>> {
        *self.namespaced_args.lock().unwrap() = Some(args.clone());
        self.enter(Stage::NamespacedResources)?;
        self.inner.namespaced(args)
    }

    async fn dynamic(
        &self,
        args: &ClusterArgs,
        cluster: &dyn ClusterReader,
    ) -> anyhow::Result<Vec<DesiredObject>> {
        self.enter(Stage::DynamicResources)?;
        self.inner.dynamic(args, cluster).await
    }

    fn certificate_definitions(
        &self,
        cr: &DataImporter,
        namespace: &str,
        version: &str,
    ) -> Vec<CertificateDefinition> {
        self.inner.certificate_definitions(cr, namespace, version)
    }
}

/// Operator configuration with fixed versions so output is predictable
pub fn config(deploy_cluster_resources: bool) -> OperatorConfig {
    OperatorConfig {
        operator_version: "v1.60.0".to_string(),
        docker_tag: "v1.60.0".to_string(),
        deploy_cluster_resources,
        ..OperatorConfig::default()
    }
}

pub struct Harness {
    pub cluster: Arc<FakeCluster>,
    pub factory: Arc<FaultyFactory>,
    pub events: Arc<RecordingEvents>,
    pub operator: DataImporterOperator,
}

pub fn harness(config: OperatorConfig, cluster: FakeCluster, factory: FaultyFactory) -> Harness {
    let cluster = Arc::new(cluster);
    let factory = Arc::new(factory);
    let events = Arc::new(RecordingEvents::default());
    let operator = DataImporterOperator::new(
        config,
        cluster.clone(),
        factory.clone(),
        events.clone(),
    );
    Harness {
        cluster,
        factory,
        events,
        operator,
    }
}

/// Parse a `DataImporter` from YAML
pub fn importer(yaml: &str) -> DataImporter {
    serde_yaml::from_str(yaml).unwrap()
}

/// A `DataImporter` with an empty spec
pub fn bare_importer() -> DataImporter {
    importer(
        r"
apiVersion: dataimporter.io/v1beta1
kind: DataImporter
metadata:
  name: data-importer
spec: {}
",
    )
}
