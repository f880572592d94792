//! # Certificate Configuration
//!
//! Lifetimes for the CA and leaf certificates the operand uses internally.

use serde::{Deserialize, Serialize};

/// Certificate lifetimes per certificate class
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertConfig {
    /// Signer (CA) certificates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<CertLifetime>,
    /// Serving certificates (API server, upload proxy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<CertLifetime>,
    /// Client certificates (upload server client)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<CertLifetime>,
}

/// Lifetime of one certificate class
///
/// Both values are Go-style durations such as `48h` or `90m`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertLifetime {
    /// Total validity of an issued certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// How long before expiry the certificate is rotated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_before: Option<String>,
}
