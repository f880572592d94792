//! # Namespaced Resources
//!
//! Per-component service accounts, RBAC, deployments and services in the
//! operand namespace. Content depends on the resolved [`NamespacedArgs`].

use super::cluster::rule;
use super::{common_labels, object_meta, DesiredObject};
use crate::constants::{
    APISERVER_NAME, APISERVER_SERVICE_NAME, CONTROLLER_NAME, LABEL_COMPONENT, UPLOADPROXY_NAME,
    UPLOADPROXY_SERVICE_NAME,
};
use crate::crd::{ImagePullSecret, NodePlacement};
use anyhow::{ensure, Context, Result};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Affinity, Container, ContainerPort, EnvVar, LocalObjectReference, PodSecurityContext,
    PodSpec, PodTemplateSpec, Service, ServiceAccount, ServicePort, ServiceSpec, Toleration,
};
use k8s_openapi::api::rbac::v1::{PolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

const SERVING_PORT: i32 = 8443;

/// Resolved parameter set for namespaced resource generation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamespacedArgs {
    pub namespace: String,
    pub operator_version: String,
    pub docker_repo: String,
    pub docker_tag: String,
    pub controller_image: String,
    pub importer_image: String,
    pub cloner_image: String,
    pub apiserver_image: String,
    pub uploadproxy_image: String,
    pub uploadserver_image: String,
    /// Operand log verbosity, passed as `-v=<verbosity>`
    pub verbosity: String,
    pub pull_policy: String,
    pub image_pull_secrets: Vec<ImagePullSecret>,
    /// Empty means no priority class is requested
    pub priority_class_name: String,
    pub infra_node_placement: Option<NodePlacement>,
}

impl NamespacedArgs {
    /// Fully qualified reference for an operand image
    #[must_use]
    pub fn image_ref(&self, image: &str) -> String {
        format!("{}/{}:{}", self.docker_repo, image, self.docker_tag)
    }
}

/// Build every namespaced resource, component by component
pub fn create_namespaced_resources(args: &NamespacedArgs) -> Result<Vec<DesiredObject>> {
    ensure!(
        !args.namespace.is_empty(),
        "namespaced resources need the operand namespace"
    );

    let mut resources = Vec::new();

    resources.extend(rbac(args, CONTROLLER_NAME, controller_rules()));
    resources.push(
        controller_deployment(args)
            .context("Failed to build controller deployment")?
            .into(),
    );

    resources.extend(rbac(args, APISERVER_NAME, apiserver_rules()));
    resources.push(
        server_deployment(args, APISERVER_NAME, &args.apiserver_image)
            .context("Failed to build API server deployment")?
            .into(),
    );
    resources.push(service(args, APISERVER_SERVICE_NAME, APISERVER_NAME).into());

    resources.extend(rbac(args, UPLOADPROXY_NAME, uploadproxy_rules()));
    resources.push(
        server_deployment(args, UPLOADPROXY_NAME, &args.uploadproxy_image)
            .context("Failed to build upload proxy deployment")?
            .into(),
    );
    resources.push(service(args, UPLOADPROXY_SERVICE_NAME, UPLOADPROXY_NAME).into());

    Ok(resources)
}

fn rbac(args: &NamespacedArgs, component: &str, rules: Vec<PolicyRule>) -> [DesiredObject; 3] {
    let meta = || {
        object_meta(
            component,
            Some(&args.namespace),
            component,
            &args.operator_version,
        )
    };

    let service_account = ServiceAccount {
        metadata: meta(),
        ..Default::default()
    };
    let role_binding = RoleBinding {
        metadata: meta(),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "Role".to_string(),
            name: component.to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: component.to_string(),
            namespace: Some(args.namespace.clone()),
            ..Default::default()
        }]),
    };
    let role = Role {
        metadata: meta(),
        rules: Some(rules),
    };

    [service_account.into(), role_binding.into(), role.into()]
}

fn controller_rules() -> Vec<PolicyRule> {
    vec![
        rule(
            &[""],
            &["configmaps", "secrets"],
            &["get", "list", "watch", "create", "update", "delete"],
        ),
        rule(
            &["coordination.k8s.io"],
            &["leases"],
            &["get", "create", "update"],
        ),
    ]
}

fn apiserver_rules() -> Vec<PolicyRule> {
    vec![rule(&[""], &["secrets", "configmaps"], &["get", "list", "watch"])]
}

fn uploadproxy_rules() -> Vec<PolicyRule> {
    vec![rule(&[""], &["secrets"], &["get"])]
}

fn controller_deployment(args: &NamespacedArgs) -> Result<Deployment> {
    let env = [
        ("IMPORTER_IMAGE", args.image_ref(&args.importer_image)),
        ("CLONER_IMAGE", args.image_ref(&args.cloner_image)),
        ("UPLOADSERVER_IMAGE", args.image_ref(&args.uploadserver_image)),
        ("PULL_POLICY", args.pull_policy.clone()),
        ("VERBOSITY", args.verbosity.clone()),
    ]
    .into_iter()
    .map(|(name, value)| EnvVar {
        name: name.to_string(),
        value: Some(value),
        ..Default::default()
    })
    .collect();

    let container = Container {
        name: CONTROLLER_NAME.to_string(),
        image: Some(args.image_ref(&args.controller_image)),
        image_pull_policy: Some(args.pull_policy.clone()),
        args: Some(verbosity_args(args)),
        env: Some(env),
        ..Default::default()
    };

    deployment(args, CONTROLLER_NAME, container)
}

fn server_deployment(args: &NamespacedArgs, component: &str, image: &str) -> Result<Deployment> {
    let container = Container {
        name: component.to_string(),
        image: Some(args.image_ref(image)),
        image_pull_policy: Some(args.pull_policy.clone()),
        args: Some(verbosity_args(args)),
        ports: Some(vec![ContainerPort {
            name: Some("https".to_string()),
            container_port: SERVING_PORT,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        ..Default::default()
    };

    deployment(args, component, container)
}

fn verbosity_args(args: &NamespacedArgs) -> Vec<String> {
    vec![format!("-v={}", args.verbosity)]
}

fn deployment(args: &NamespacedArgs, component: &str, container: Container) -> Result<Deployment> {
    let labels = common_labels(component, &args.operator_version);
    let selector = BTreeMap::from([(LABEL_COMPONENT.to_string(), component.to_string())]);

    let mut pod_spec = PodSpec {
        containers: vec![container],
        service_account_name: Some(component.to_string()),
        security_context: Some(PodSecurityContext {
            run_as_non_root: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };

    if !args.image_pull_secrets.is_empty() {
        pod_spec.image_pull_secrets = Some(
            args.image_pull_secrets
                .iter()
                .map(|s| LocalObjectReference {
                    name: s.name.clone(),
                })
                .collect(),
        );
    }

    if !args.priority_class_name.is_empty() {
        pod_spec.priority_class_name = Some(args.priority_class_name.clone());
    }

    if let Some(placement) = &args.infra_node_placement {
        apply_placement(&mut pod_spec, placement)?;
    }

    Ok(Deployment {
        metadata: object_meta(
            component,
            Some(&args.namespace),
            component,
            &args.operator_version,
        ),
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(selector),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(pod_spec),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn apply_placement(pod_spec: &mut PodSpec, placement: &NodePlacement) -> Result<()> {
    if !placement.node_selector.is_empty() {
        pod_spec.node_selector = Some(placement.node_selector.clone());
    }

    if let Some(affinity) = &placement.affinity {
        let affinity: Affinity = serde_json::from_value(affinity.clone())
            .context("infra.affinity is not a valid core/v1 Affinity")?;
        pod_spec.affinity = Some(affinity);
    }

    if !placement.tolerations.is_empty() {
        pod_spec.tolerations = Some(
            placement
                .tolerations
                .iter()
                .map(|t| Toleration {
                    key: t.key.clone(),
                    operator: t.operator.clone(),
                    value: t.value.clone(),
                    effect: t.effect.clone(),
                    toleration_seconds: t.toleration_seconds,
                })
                .collect(),
        );
    }

    Ok(())
}

fn service(args: &NamespacedArgs, name: &str, component: &str) -> Service {
    Service {
        metadata: object_meta(name, Some(&args.namespace), component, &args.operator_version),
        spec: Some(ServiceSpec {
            selector: Some(BTreeMap::from([(
                LABEL_COMPONENT.to_string(),
                component.to_string(),
            )])),
            ports: Some(vec![ServicePort {
                name: Some("https".to_string()),
                port: 443,
                target_port: Some(IntOrString::Int(SERVING_PORT)),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            type_: Some("ClusterIP".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> NamespacedArgs {
        NamespacedArgs {
            namespace: "data-importer".to_string(),
            operator_version: "v1.2.3".to_string(),
            docker_repo: "quay.io/dataimporter".to_string(),
            docker_tag: "v1.2.3".to_string(),
            controller_image: "data-importer-controller".to_string(),
            importer_image: "data-importer-importer".to_string(),
            cloner_image: "data-importer-cloner".to_string(),
            apiserver_image: "data-importer-apiserver".to_string(),
            uploadproxy_image: "data-importer-uploadproxy".to_string(),
            uploadserver_image: "data-importer-uploadserver".to_string(),
            verbosity: "1".to_string(),
            pull_policy: "IfNotPresent".to_string(),
            ..Default::default()
        }
    }

    fn pod_spec(resources: &[DesiredObject], name: &str) -> PodSpec {
        resources
            .iter()
            .find_map(|r| match r {
                DesiredObject::Deployment(d) if r.name() == name => d
                    .spec
                    .as_ref()
                    .and_then(|s| s.template.spec.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_all_objects_live_in_operand_namespace() {
        let resources = create_namespaced_resources(&args()).unwrap();

        assert_eq!(resources.len(), 14);
        assert!(resources
            .iter()
            .all(|r| r.namespace() == Some("data-importer")));
    }

    #[test]
    fn test_component_order() {
        let resources = create_namespaced_resources(&args()).unwrap();
        let keys: Vec<_> = resources.iter().map(DesiredObject::key).collect();

        assert_eq!(
            keys[..4],
            [
                "ServiceAccount/data-importer/data-importer-deployment",
                "RoleBinding/data-importer/data-importer-deployment",
                "Role/data-importer/data-importer-deployment",
                "Deployment/data-importer/data-importer-deployment",
            ]
        );
        assert_eq!(keys[8], "Service/data-importer/data-importer-api");
        assert_eq!(keys[13], "Service/data-importer/data-importer-uploadproxy");
    }

    #[test]
    fn test_empty_priority_class_is_omitted() {
        let resources = create_namespaced_resources(&args()).unwrap();
        assert_eq!(pod_spec(&resources, CONTROLLER_NAME).priority_class_name, None);
    }

    #[test]
    fn test_resolved_overrides_reach_pod_template() {
        let mut args = args();
        args.priority_class_name = "urgent".to_string();
        args.verbosity = "4".to_string();
        args.pull_policy = "Always".to_string();
        args.image_pull_secrets = vec![ImagePullSecret::new("registry-creds")];
        args.infra_node_placement = Some(NodePlacement {
            node_selector: BTreeMap::from([("kubernetes.io/os".into(), "linux".into())]),
            tolerations: vec![crate::crd::Toleration {
                key: Some("infra".into()),
                operator: Some("Exists".into()),
                effect: Some("NoSchedule".into()),
                ..Default::default()
            }],
            affinity: None,
        });

        let resources = create_namespaced_resources(&args).unwrap();
        let spec = pod_spec(&resources, APISERVER_NAME);

        assert_eq!(spec.priority_class_name.as_deref(), Some("urgent"));
        assert_eq!(spec.image_pull_secrets.unwrap()[0].name, "registry-creds");
        assert_eq!(
            spec.node_selector.unwrap().get("kubernetes.io/os").map(String::as_str),
            Some("linux")
        );
        assert_eq!(spec.tolerations.unwrap()[0].key.as_deref(), Some("infra"));

        let container = &spec.containers[0];
        assert_eq!(container.image_pull_policy.as_deref(), Some("Always"));
        assert_eq!(container.args.as_deref(), Some(&["-v=4".to_string()][..]));
        assert_eq!(
            container.image.as_deref(),
            Some("quay.io/dataimporter/data-importer-apiserver:v1.2.3")
        );
    }

    #[test]
    fn test_affinity_is_parsed() {
        let mut args = args();
        args.infra_node_placement = Some(NodePlacement {
            affinity: Some(serde_json::json!({
                "nodeAffinity": {
                    "requiredDuringSchedulingIgnoredDuringExecution": {
                        "nodeSelectorTerms": [{
                            "matchExpressions": [{
                                "key": "node-role.kubernetes.io/infra",
                                "operator": "Exists"
                            }]
                        }]
                    }
                }
            })),
            ..Default::default()
        });

        let resources = create_namespaced_resources(&args).unwrap();
        let affinity = pod_spec(&resources, UPLOADPROXY_NAME).affinity.unwrap();
        assert!(affinity.node_affinity.is_some());
    }

    #[test]
    fn test_malformed_affinity_fails_the_build() {
        let mut args = args();
        args.infra_node_placement = Some(NodePlacement {
            affinity: Some(serde_json::json!({ "nodeAffinity": "everywhere" })),
            ..Default::default()
        });

        let err = create_namespaced_resources(&args).unwrap_err();
        assert!(format!("{err:#}").contains("infra.affinity"));
    }
}
