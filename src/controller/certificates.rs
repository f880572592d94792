//! # Certificate Definitions
//!
//! Describes the signer/bundle/target triples the operand's internal PKI is
//! built from, and flattens them into desired objects.
//!
//! The objects produced here are placeholders: secrets and bundles are
//! created empty and annotated with their lifetime, and the certificate
//! rotation machinery fills them in.

use crate::constants::{
    ANNOTATION_CERT_LIFETIME, ANNOTATION_CERT_REFRESH, ANNOTATION_CERT_SERVICE,
    ANNOTATION_CERT_USER, API_GROUP, APISERVER_NAME, APISERVER_SERVICE_NAME,
    APISERVER_SIGNER_BUNDLE_NAME, CONTROLLER_NAME, DEFAULT_CA_LIFETIME, DEFAULT_CA_RENEW_BEFORE,
    DEFAULT_LEAF_LIFETIME, DEFAULT_LEAF_RENEW_BEFORE, UPLOADPROXY_NAME, UPLOADPROXY_SERVICE_NAME,
};
use crate::crd::{CertConfig, CertLifetime};
use crate::resources::{object_meta, DesiredObject};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use std::collections::BTreeMap;

/// Lifetime and refresh window of one certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateConfig {
    pub lifetime: String,
    pub refresh: String,
}

impl CertificateConfig {
    /// Overlay the CR's lifetime on the given defaults
    fn resolve(overrides: Option<&CertLifetime>, lifetime: &str, refresh: &str) -> Self {
        let pick = |value: Option<&String>, default: &str| match value {
            Some(v) if !v.is_empty() => v.clone(),
            _ => default.to_string(),
        };
        Self {
            lifetime: pick(overrides.and_then(|o| o.duration.as_ref()), lifetime),
            refresh: pick(overrides.and_then(|o| o.renew_before.as_ref()), refresh),
        }
    }

    fn annotations(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (ANNOTATION_CERT_LIFETIME.to_string(), self.lifetime.clone()),
            (ANNOTATION_CERT_REFRESH.to_string(), self.refresh.clone()),
        ])
    }
}

/// A signer, its published bundle and an optional leaf certificate.
///
/// Every populated object field becomes exactly one desired object.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateDefinition {
    pub signer_secret: Option<Secret>,
    pub signer_config: CertificateConfig,
    pub cert_bundle_config_map: Option<ConfigMap>,
    pub target_secret: Option<Secret>,
    pub target_config: CertificateConfig,
    /// Service the target certificate is issued for
    pub target_service: Option<String>,
    /// User the target client certificate is issued for
    pub target_user: Option<String>,
}

enum Target<'a> {
    Service(&'a str),
    User(&'a str),
}

struct DefinitionInput<'a> {
    component: &'a str,
    signer: &'a str,
    bundle: &'a str,
    target: Option<(&'a str, Target<'a>)>,
    target_config: &'a CertificateConfig,
}

/// Build the fixed set of certificate definitions for an installation.
///
/// Order: API server, upload proxy, upload server, upload server client.
#[must_use]
pub fn certificate_definitions(
    namespace: &str,
    version: &str,
    cert_config: Option<&CertConfig>,
) -> Vec<CertificateDefinition> {
    let ca = CertificateConfig::resolve(
        cert_config.and_then(|c| c.ca.as_ref()),
        DEFAULT_CA_LIFETIME,
        DEFAULT_CA_RENEW_BEFORE,
    );
    let server = CertificateConfig::resolve(
        cert_config.and_then(|c| c.server.as_ref()),
        DEFAULT_LEAF_LIFETIME,
        DEFAULT_LEAF_RENEW_BEFORE,
    );
    let client = CertificateConfig::resolve(
        cert_config.and_then(|c| c.client.as_ref()),
        DEFAULT_LEAF_LIFETIME,
        DEFAULT_LEAF_RENEW_BEFORE,
    );
    let client_user = format!("client.upload-server.{API_GROUP}");

    [
        DefinitionInput {
            component: APISERVER_NAME,
            signer: "data-importer-apiserver-signer",
            bundle: APISERVER_SIGNER_BUNDLE_NAME,
            target: Some((
                "data-importer-apiserver-server-cert",
                Target::Service(APISERVER_SERVICE_NAME),
            )),
            target_config: &server,
        },
        DefinitionInput {
            component: UPLOADPROXY_NAME,
            signer: "data-importer-uploadproxy-signer",
            bundle: "data-importer-uploadproxy-signer-bundle",
            target: Some((
                "data-importer-uploadproxy-server-cert",
                Target::Service(UPLOADPROXY_SERVICE_NAME),
            )),
            target_config: &server,
        },
        // Upload server certs are minted per pod by the controller
        DefinitionInput {
            component: CONTROLLER_NAME,
            signer: "data-importer-uploadserver-signer",
            bundle: "data-importer-uploadserver-signer-bundle",
            target: None,
            target_config: &server,
        },
        DefinitionInput {
            component: UPLOADPROXY_NAME,
            signer: "data-importer-uploadserver-client-signer",
            bundle: "data-importer-uploadserver-client-signer-bundle",
            target: Some((
                "data-importer-uploadserver-client-cert",
                Target::User(&client_user),
            )),
            target_config: &client,
        },
    ]
    .into_iter()
    .map(|input| definition(namespace, version, &ca, input))
    .collect()
}

fn definition(
    namespace: &str,
    version: &str,
    ca: &CertificateConfig,
    input: DefinitionInput<'_>,
) -> CertificateDefinition {
    let secret = |name: &str, annotations: BTreeMap<String, String>| {
        let mut metadata = object_meta(name, Some(namespace), input.component, version);
        metadata.annotations = Some(annotations);
        Secret {
            metadata,
            type_: Some("kubernetes.io/tls".to_string()),
            ..Default::default()
        }
    };

    let (target_secret, target_service, target_user) = match input.target {
        Some((name, target)) => {
            let mut annotations = input.target_config.annotations();
            let (service, user) = match target {
                Target::Service(svc) => {
                    annotations.insert(ANNOTATION_CERT_SERVICE.to_string(), svc.to_string());
                    (Some(svc.to_string()), None)
                }
                Target::User(user) => {
                    annotations.insert(ANNOTATION_CERT_USER.to_string(), user.to_string());
                    (None, Some(user.to_string()))
                }
            };
            (Some(secret(name, annotations)), service, user)
        }
        None => (None, None, None),
    };

    CertificateDefinition {
        signer_secret: Some(secret(input.signer, ca.annotations())),
        signer_config: ca.clone(),
        cert_bundle_config_map: Some(ConfigMap {
            metadata: object_meta(input.bundle, Some(namespace), input.component, version),
            ..Default::default()
        }),
        target_secret,
        target_config: input.target_config.clone(),
        target_service,
        target_user,
    }
}

/// Flatten definitions into desired objects.
///
/// Per definition: signer secret, bundle config map, target secret. Absent
/// fields are skipped; definition order is kept.
#[must_use]
pub fn expand_certificate_definitions(defs: &[CertificateDefinition]) -> Vec<DesiredObject> {
    let mut objects = Vec::new();
    for def in defs {
        if let Some(signer) = &def.signer_secret {
            objects.push(signer.clone().into());
        }
        if let Some(bundle) = &def.cert_bundle_config_map {
            objects.push(bundle.clone().into());
        }
        if let Some(target) = &def.target_secret {
            objects.push(target.clone().into());
        }
    }
    objects
}
