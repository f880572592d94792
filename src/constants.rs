//! # Constants
//!
//! Shared constants used throughout the operator.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default namespace the operator and its operands are deployed into
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "data-importer";

/// Priority class requested for operand pods when the CR does not name one
pub const DEFAULT_PRIORITY_CLASS_NAME: &str = "kubevirt-cluster-critical";

/// Auxiliary config map whose absence marks an initial-install reconciliation
pub const OPERATOR_CONFIG_MAP_NAME: &str = "data-importer-config";

/// Field manager used for server-side apply and status patches
pub const FIELD_MANAGER: &str = "data-importer-operator";

/// Controller name reported on Kubernetes events
pub const EVENT_REPORTER: &str = "data-importer-operator";

/// API group served by the operand CRDs and webhooks
pub const API_GROUP: &str = "dataimporter.io";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default requeue interval after a successful reconciliation (seconds)
pub const DEFAULT_RECONCILE_REQUEUE_SECS: u64 = 300;

/// Default requeue interval for reconciliation errors (seconds)
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 60;

/// Default container registry for operand images
pub const DEFAULT_DOCKER_REPO: &str = "quay.io/dataimporter";

/// Default image pull policy for operand containers
pub const DEFAULT_PULL_POLICY: &str = "IfNotPresent";

/// Default operand log verbosity
pub const DEFAULT_VERBOSITY: &str = "1";

// Operand component names
pub const CONTROLLER_NAME: &str = "data-importer-deployment";
pub const APISERVER_NAME: &str = "data-importer-apiserver";
pub const UPLOADPROXY_NAME: &str = "data-importer-uploadproxy";

/// Service fronting the API server (APIService and webhooks target it)
pub const APISERVER_SERVICE_NAME: &str = "data-importer-api";

/// Service fronting the upload proxy
pub const UPLOADPROXY_SERVICE_NAME: &str = "data-importer-uploadproxy";

// Labels stamped on every generated object
pub const LABEL_COMPONENT: &str = "dataimporter.io/component";
pub const LABEL_PART_OF: &str = "app.kubernetes.io/part-of";
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const LABEL_VERSION: &str = "app.kubernetes.io/version";
pub const PART_OF_VALUE: &str = "data-importer";

// Certificate annotations read by the certificate rotation machinery
pub const ANNOTATION_CERT_LIFETIME: &str = "dataimporter.io/cert.lifetime";
pub const ANNOTATION_CERT_REFRESH: &str = "dataimporter.io/cert.refresh";
pub const ANNOTATION_CERT_SERVICE: &str = "dataimporter.io/cert.service";
pub const ANNOTATION_CERT_USER: &str = "dataimporter.io/cert.user";

/// Key holding the PEM bundle inside a signer bundle config map
pub const CA_BUNDLE_KEY: &str = "ca-bundle.crt";

/// Default CA certificate lifetime and refresh window
pub const DEFAULT_CA_LIFETIME: &str = "48h";
pub const DEFAULT_CA_RENEW_BEFORE: &str = "24h";

/// Default leaf (server and client) certificate lifetime and refresh window
pub const DEFAULT_LEAF_LIFETIME: &str = "24h";
pub const DEFAULT_LEAF_RENEW_BEFORE: &str = "12h";

/// Config map holding the API server CA bundle, injected into the APIService and webhooks
pub const APISERVER_SIGNER_BUNDLE_NAME: &str = "data-importer-apiserver-signer-bundle";

/// How long startup waits for the probe server to bind (seconds)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Poll interval while waiting for the probe server (milliseconds)
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;
