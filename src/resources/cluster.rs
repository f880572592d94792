//! # Static Cluster Resources
//!
//! Cluster-scoped objects whose content depends only on operator
//! configuration: the operand CRDs and the cluster RBAC of each component.

use super::{object_meta, DesiredObject};
use crate::constants::{API_GROUP, APISERVER_NAME, CONTROLLER_NAME, UPLOADPROXY_NAME};
use crate::crd::VolumeImport;
use anyhow::{ensure, Result};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject};
use kube::CustomResourceExt;

/// Inputs for the static and dynamic cluster builders
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClusterArgs {
    /// Namespace the operand service accounts and services live in
    pub namespace: String,
    pub operator_version: String,
}

/// Build every static cluster-scoped resource, in apply order
pub fn create_static_resources(args: &ClusterArgs) -> Result<Vec<DesiredObject>> {
    ensure!(
        !args.namespace.is_empty(),
        "cluster resources need the operand namespace"
    );

    let mut resources = vec![volume_import_crd(args)];

    for (component, rules) in [
        (CONTROLLER_NAME, controller_rules()),
        (APISERVER_NAME, apiserver_rules()),
        (UPLOADPROXY_NAME, uploadproxy_rules()),
    ] {
        resources.push(cluster_role_binding(args, component).into());
        resources.push(cluster_role(args, component, rules).into());
    }

    Ok(resources)
}

fn volume_import_crd(args: &ClusterArgs) -> DesiredObject {
    let mut crd = VolumeImport::crd();
    let labels = super::common_labels(CONTROLLER_NAME, &args.operator_version);
    crd.metadata.labels.get_or_insert_with(Default::default).extend(labels);
    crd.into()
}

fn cluster_role(args: &ClusterArgs, component: &str, rules: Vec<PolicyRule>) -> ClusterRole {
    ClusterRole {
        metadata: object_meta(component, None, component, &args.operator_version),
        rules: Some(rules),
        ..Default::default()
    }
}

fn cluster_role_binding(args: &ClusterArgs, component: &str) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: object_meta(component, None, component, &args.operator_version),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: component.to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: component.to_string(),
            namespace: Some(args.namespace.clone()),
            ..Default::default()
        }]),
    }
}

pub(crate) fn rule(groups: &[&str], resources: &[&str], verbs: &[&str]) -> PolicyRule {
    let owned = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
    PolicyRule {
        api_groups: Some(owned(groups)),
        resources: Some(owned(resources)),
        verbs: owned(verbs),
        ..Default::default()
    }
}

fn controller_rules() -> Vec<PolicyRule> {
    vec![
        rule(
            &[""],
            &["persistentvolumeclaims", "persistentvolumeclaims/finalizers"],
            &["get", "list", "watch", "create", "update", "patch", "delete"],
        ),
        rule(&[""], &["pods", "services"], &["get", "list", "watch", "create", "delete"]),
        rule(&[""], &["events"], &["create", "patch"]),
        rule(&["storage.k8s.io"], &["storageclasses"], &["get", "list", "watch"]),
        rule(
            &[API_GROUP],
            &["volumeimports", "volumeimports/status", "volumeimports/finalizers"],
            &["get", "list", "watch", "create", "update", "patch", "delete"],
        ),
    ]
}

fn apiserver_rules() -> Vec<PolicyRule> {
    vec![
        rule(
            &["authorization.k8s.io"],
            &["subjectaccessreviews"],
            &["create"],
        ),
        rule(&[API_GROUP], &["volumeimports"], &["get", "list"]),
        rule(&[""], &["persistentvolumeclaims"], &["get"]),
    ]
}

fn uploadproxy_rules() -> Vec<PolicyRule> {
    vec![rule(&[""], &["persistentvolumeclaims"], &["get"])]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ClusterArgs {
        ClusterArgs {
            namespace: "data-importer".to_string(),
            operator_version: "v1.2.3".to_string(),
        }
    }

    #[test]
    fn test_static_resources_are_cluster_scoped() {
        let resources = create_static_resources(&args()).unwrap();

        assert_eq!(resources.len(), 7);
        assert!(resources.iter().all(|r| r.namespace().is_none()));
        assert_eq!(resources[0].kind(), "CustomResourceDefinition");
        assert_eq!(resources[0].name(), "volumeimports.dataimporter.io");
    }

    #[test]
    fn test_binding_precedes_role_per_component() {
        let resources = create_static_resources(&args()).unwrap();
        let kinds: Vec<_> = resources.iter().skip(1).map(DesiredObject::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "ClusterRoleBinding",
                "ClusterRole",
                "ClusterRoleBinding",
                "ClusterRole",
                "ClusterRoleBinding",
                "ClusterRole"
            ]
        );
    }

    #[test]
    fn test_bindings_target_operand_namespace() {
        let binding = cluster_role_binding(&args(), APISERVER_NAME);
        let subject = &binding.subjects.unwrap()[0];
        assert_eq!(subject.namespace.as_deref(), Some("data-importer"));
        assert_eq!(subject.name, APISERVER_NAME);
        assert_eq!(binding.role_ref.name, APISERVER_NAME);
    }

    #[test]
    fn test_missing_namespace_is_an_error() {
        let err = create_static_resources(&ClusterArgs::default()).unwrap_err();
        assert!(err.to_string().contains("namespace"));
    }
}
