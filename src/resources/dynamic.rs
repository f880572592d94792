//! # Dynamic Cluster Resources
//!
//! Cluster-scoped objects whose content depends on live cluster state. The
//! API service registration and the admission webhooks all trust the API
//! server's CA, which is only known once the signer bundle config map exists.

use super::cluster::ClusterArgs;
use super::{object_meta, DesiredObject};
use crate::constants::{
    API_GROUP, APISERVER_NAME, APISERVER_SERVICE_NAME, APISERVER_SIGNER_BUNDLE_NAME,
    CA_BUNDLE_KEY,
};
use crate::controller::cluster::ClusterReader;
use anyhow::{ensure, Context, Result};
use k8s_openapi::api::admissionregistration::v1::{
    MutatingWebhook, MutatingWebhookConfiguration, RuleWithOperations, ServiceReference,
    ValidatingWebhook, ValidatingWebhookConfiguration, WebhookClientConfig,
};
use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::{
    APIService, APIServiceSpec, ServiceReference as ApiServiceReference,
};
use k8s_openapi::ByteString;
use tracing::debug;

const UPLOAD_API_VERSION: &str = "v1beta1";
const VALIDATING_WEBHOOK_NAME: &str = "data-importer-api-volumeimport-validate";
const MUTATING_WEBHOOK_NAME: &str = "data-importer-api-volumeimport-mutate";

/// Build the dynamic resources, reading the CA bundle from the cluster
pub async fn create_dynamic_resources(
    args: &ClusterArgs,
    cluster: &dyn ClusterReader,
) -> Result<Vec<DesiredObject>> {
    ensure!(
        !args.namespace.is_empty(),
        "dynamic resources need the operand namespace"
    );

    let ca_bundle = api_server_ca_bundle(&args.namespace, cluster).await?;

    Ok(vec![
        api_service(args, &ca_bundle).into(),
        validating_webhook(args, &ca_bundle).into(),
        mutating_webhook(args, &ca_bundle).into(),
    ])
}

/// PEM bundle for the API server signer; empty until the bundle is published
async fn api_server_ca_bundle(namespace: &str, cluster: &dyn ClusterReader) -> Result<Vec<u8>> {
    let config_map = cluster
        .config_map(namespace, APISERVER_SIGNER_BUNDLE_NAME)
        .await
        .with_context(|| {
            format!("Failed to read CA bundle config map {namespace}/{APISERVER_SIGNER_BUNDLE_NAME}")
        })?;

    let Some(config_map) = config_map else {
        debug!(
            "CA bundle config map {}/{} not published yet",
            namespace, APISERVER_SIGNER_BUNDLE_NAME
        );
        return Ok(Vec::new());
    };

    Ok(config_map
        .data
        .and_then(|mut data| data.remove(CA_BUNDLE_KEY))
        .map(String::into_bytes)
        .unwrap_or_default())
}

fn api_service(args: &ClusterArgs, ca_bundle: &[u8]) -> APIService {
    let group = format!("upload.{API_GROUP}");
    APIService {
        metadata: object_meta(
            &format!("{UPLOAD_API_VERSION}.{group}"),
            None,
            APISERVER_NAME,
            &args.operator_version,
        ),
        spec: Some(APIServiceSpec {
            ca_bundle: Some(ByteString(ca_bundle.to_vec())),
            group: Some(group),
            group_priority_minimum: 1000,
            service: Some(ApiServiceReference {
                name: Some(APISERVER_SERVICE_NAME.to_string()),
                namespace: Some(args.namespace.clone()),
                port: Some(443),
            }),
            version: Some(UPLOAD_API_VERSION.to_string()),
            version_priority: 15,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn client_config(args: &ClusterArgs, ca_bundle: &[u8], path: &str) -> WebhookClientConfig {
    WebhookClientConfig {
        ca_bundle: Some(ByteString(ca_bundle.to_vec())),
        service: Some(ServiceReference {
            name: APISERVER_SERVICE_NAME.to_string(),
            namespace: args.namespace.clone(),
            path: Some(path.to_string()),
            port: Some(443),
        }),
        ..Default::default()
    }
}

fn volume_import_rule(operations: &[&str]) -> RuleWithOperations {
    RuleWithOperations {
        api_groups: Some(vec![API_GROUP.to_string()]),
        api_versions: Some(vec!["v1beta1".to_string()]),
        operations: Some(operations.iter().map(|o| (*o).to_string()).collect()),
        resources: Some(vec!["volumeimports".to_string()]),
        scope: Some("*".to_string()),
    }
}

fn validating_webhook(args: &ClusterArgs, ca_bundle: &[u8]) -> ValidatingWebhookConfiguration {
    ValidatingWebhookConfiguration {
        metadata: object_meta(
            VALIDATING_WEBHOOK_NAME,
            None,
            APISERVER_NAME,
            &args.operator_version,
        ),
        webhooks: Some(vec![ValidatingWebhook {
            name: format!("volumeimport-validate.{API_GROUP}"),
            admission_review_versions: vec!["v1".to_string()],
            client_config: client_config(args, ca_bundle, "/volumeimport-validate"),
            rules: Some(vec![volume_import_rule(&["CREATE", "UPDATE"])]),
            failure_policy: Some("Fail".to_string()),
            side_effects: "None".to_string(),
            ..Default::default()
        }]),
    }
}

fn mutating_webhook(args: &ClusterArgs, ca_bundle: &[u8]) -> MutatingWebhookConfiguration {
    MutatingWebhookConfiguration {
        metadata: object_meta(
            MUTATING_WEBHOOK_NAME,
            None,
            APISERVER_NAME,
            &args.operator_version,
        ),
        webhooks: Some(vec![MutatingWebhook {
            name: format!("volumeimport-mutate.{API_GROUP}"),
            admission_review_versions: vec!["v1".to_string()],
            client_config: client_config(args, ca_bundle, "/volumeimport-mutate"),
            rules: Some(vec![volume_import_rule(&["CREATE"])]),
            failure_policy: Some("Fail".to_string()),
            side_effects: "None".to_string(),
            ..Default::default()
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::cluster::LookupError;
    use async_trait::async_trait;
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::api::scheduling::v1::PriorityClass;
    use std::collections::BTreeMap;

    enum Bundle {
        Published(&'static str),
        Missing,
        Broken,
    }

    #[async_trait]
    impl ClusterReader for Bundle {
        async fn priority_class(&self, name: &str) -> Result<PriorityClass, LookupError> {
            Err(LookupError::NotFound {
                kind: "PriorityClass",
                name: name.to_string(),
            })
        }

        async fn config_map(
            &self,
            _namespace: &str,
            _name: &str,
        ) -> Result<Option<ConfigMap>, LookupError> {
            match self {
                Bundle::Published(pem) => Ok(Some(ConfigMap {
                    data: Some(BTreeMap::from([(CA_BUNDLE_KEY.to_string(), pem.to_string())])),
                    ..Default::default()
                })),
                Bundle::Missing => Ok(None),
                Bundle::Broken => {
                    let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                    Err(LookupError::Api(kube::Error::SerdeError(serde_err)))
                }
            }
        }
    }

    fn args() -> ClusterArgs {
        ClusterArgs {
            namespace: "data-importer".to_string(),
            operator_version: "v1.2.3".to_string(),
        }
    }

    fn api_service_ca(resources: &[DesiredObject]) -> Vec<u8> {
        match &resources[0] {
            DesiredObject::ApiService(svc) => svc
                .spec
                .as_ref()
                .and_then(|s| s.ca_bundle.clone())
                .map(|b| b.0)
                .unwrap_or_default(),
            other => panic!("expected APIService first, got {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_bundle_is_injected_everywhere() {
        let resources = create_dynamic_resources(&args(), &Bundle::Published("PEM"))
            .await
            .unwrap();

        let kinds: Vec<_> = resources.iter().map(DesiredObject::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "APIService",
                "ValidatingWebhookConfiguration",
                "MutatingWebhookConfiguration"
            ]
        );
        assert_eq!(api_service_ca(&resources), b"PEM");

        let DesiredObject::ValidatingWebhookConfiguration(validating) = &resources[1] else {
            panic!("expected validating webhook");
        };
        let webhook = &validating.webhooks.as_ref().unwrap()[0];
        assert_eq!(
            webhook.client_config.ca_bundle.as_ref().map(|b| b.0.as_slice()),
            Some(&b"PEM"[..])
        );
        assert_eq!(
            webhook.client_config.service.as_ref().unwrap().namespace,
            "data-importer"
        );
    }

    #[tokio::test]
    async fn test_missing_bundle_yields_empty_ca() {
        let resources = create_dynamic_resources(&args(), &Bundle::Missing)
            .await
            .unwrap();
        assert_eq!(resources.len(), 3);
        assert!(api_service_ca(&resources).is_empty());
    }

    #[tokio::test]
    async fn test_lookup_error_fails() {
        let err = create_dynamic_resources(&args(), &Bundle::Broken)
            .await
            .unwrap_err();
        assert!(err.to_string().contains(APISERVER_SIGNER_BUNDLE_NAME));
    }

    #[test]
    fn test_api_service_name_matches_group_and_version() {
        let svc = api_service(&args(), b"");
        assert_eq!(
            svc.metadata.name.as_deref(),
            Some("v1beta1.upload.dataimporter.io")
        );
    }
}
