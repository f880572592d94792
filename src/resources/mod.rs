//! # Resources
//!
//! The desired-object model and the builders that produce it.
//!
//! - `cluster` - Static cluster-scoped resources (operand CRDs, cluster RBAC)
//! - `namespaced` - Namespaced resources (service accounts, RBAC, deployments, services)
//! - `dynamic` - Cluster-scoped resources that depend on live cluster state (API service, webhooks)
//! - `factory` - The `ResourceFactory` seam and its standard implementation

pub mod cluster;
pub mod dynamic;
pub mod factory;
pub mod namespaced;

pub use factory::{ResourceFactory, StandardResources};

use crate::constants::{
    LABEL_COMPONENT, LABEL_MANAGED_BY, LABEL_PART_OF, LABEL_VERSION, PART_OF_VALUE,
};
use k8s_openapi::api::admissionregistration::v1::{
    MutatingWebhookConfiguration, ValidatingWebhookConfiguration,
};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Secret, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::APIService;
use kube::core::ApiResource;
use serde::Serialize;
use std::collections::BTreeMap;

macro_rules! desired_objects {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// One object the installation requires.
        ///
        /// Serializes untagged, so the JSON form is exactly the Kubernetes
        /// manifest including `apiVersion` and `kind`.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum DesiredObject {
            $($variant($ty)),+
        }

        impl DesiredObject {
            /// Kubernetes kind, e.g. `Deployment`
            #[must_use]
            pub fn kind(&self) -> &'static str {
                match self {
                    $(DesiredObject::$variant(_) => <$ty as k8s_openapi::Resource>::KIND),+
                }
            }

            /// Kubernetes apiVersion, e.g. `apps/v1`
            #[must_use]
            pub fn api_version(&self) -> &'static str {
                match self {
                    $(DesiredObject::$variant(_) => <$ty as k8s_openapi::Resource>::API_VERSION),+
                }
            }

            #[must_use]
            pub fn metadata(&self) -> &ObjectMeta {
                match self {
                    $(DesiredObject::$variant(o) => &o.metadata),+
                }
            }
        }

        $(
            impl From<$ty> for DesiredObject {
                fn from(object: $ty) -> Self {
                    DesiredObject::$variant(object)
                }
            }
        )+
    };
}

desired_objects! {
    CustomResourceDefinition(CustomResourceDefinition),
    ClusterRole(ClusterRole),
    ClusterRoleBinding(ClusterRoleBinding),
    Role(Role),
    RoleBinding(RoleBinding),
    ServiceAccount(ServiceAccount),
    Deployment(Deployment),
    Service(Service),
    ApiService(APIService),
    ValidatingWebhookConfiguration(ValidatingWebhookConfiguration),
    MutatingWebhookConfiguration(MutatingWebhookConfiguration),
    Secret(Secret),
    ConfigMap(ConfigMap),
}

impl DesiredObject {
    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    /// Namespace, `None` for cluster-scoped objects
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    /// Stable identity used in logs: `Kind/namespace/name` or `Kind/name`
    #[must_use]
    pub fn key(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{}/{}/{}", self.kind(), ns, self.name()),
            None => format!("{}/{}", self.kind(), self.name()),
        }
    }

    /// Full manifest as JSON
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Object list kinds an installation may own.
///
/// The reconcile engine scans these for garbage collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentKind {
    CustomResourceDefinition,
    ClusterRoleBinding,
    ClusterRole,
    Deployment,
    Service,
    RoleBinding,
    Role,
    ServiceAccount,
    ApiService,
    ValidatingWebhookConfiguration,
    MutatingWebhookConfiguration,
}

impl DependentKind {
    /// The fixed set, in scan order
    pub const ALL: [DependentKind; 11] = [
        DependentKind::CustomResourceDefinition,
        DependentKind::ClusterRoleBinding,
        DependentKind::ClusterRole,
        DependentKind::Deployment,
        DependentKind::Service,
        DependentKind::RoleBinding,
        DependentKind::Role,
        DependentKind::ServiceAccount,
        DependentKind::ApiService,
        DependentKind::ValidatingWebhookConfiguration,
        DependentKind::MutatingWebhookConfiguration,
    ];

    /// Name of the list kind, e.g. `DeploymentList`
    #[must_use]
    pub fn list_kind(self) -> String {
        format!("{}List", self.api_resource().kind)
    }

    /// API resource usable with `kube::Api::<DynamicObject>::all_with`
    #[must_use]
    pub fn api_resource(self) -> ApiResource {
        match self {
            DependentKind::CustomResourceDefinition => {
                ApiResource::erase::<CustomResourceDefinition>(&())
            }
            DependentKind::ClusterRoleBinding => ApiResource::erase::<ClusterRoleBinding>(&()),
            DependentKind::ClusterRole => ApiResource::erase::<ClusterRole>(&()),
            DependentKind::Deployment => ApiResource::erase::<Deployment>(&()),
            DependentKind::Service => ApiResource::erase::<Service>(&()),
            DependentKind::RoleBinding => ApiResource::erase::<RoleBinding>(&()),
            DependentKind::Role => ApiResource::erase::<Role>(&()),
            DependentKind::ServiceAccount => ApiResource::erase::<ServiceAccount>(&()),
            DependentKind::ApiService => ApiResource::erase::<APIService>(&()),
            DependentKind::ValidatingWebhookConfiguration => {
                ApiResource::erase::<ValidatingWebhookConfiguration>(&())
            }
            DependentKind::MutatingWebhookConfiguration => {
                ApiResource::erase::<MutatingWebhookConfiguration>(&())
            }
        }
    }
}

/// Labels stamped on every generated object
#[must_use]
pub fn common_labels(component: &str, version: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_COMPONENT.to_string(), component.to_string()),
        (LABEL_PART_OF.to_string(), PART_OF_VALUE.to_string()),
        (
            LABEL_MANAGED_BY.to_string(),
            crate::constants::FIELD_MANAGER.to_string(),
        ),
        (LABEL_VERSION.to_string(), version.to_string()),
    ])
}

/// Object metadata with the common labels
#[must_use]
pub fn object_meta(
    name: &str,
    namespace: Option<&str>,
    component: &str,
    version: &str,
) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        labels: Some(common_labels(component, version)),
        ..Default::default()
    }
}
