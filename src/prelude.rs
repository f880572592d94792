//! # Prelude
//!
//! Re-exports commonly used types and traits.
//!
//! ```rust
//! use data_importer_operator::prelude::*;
//! ```

// CRD types
pub use crate::crd::*;

// Collaborator seams
pub use crate::controller::cluster::{ClusterReader, KubeClusterReader, LookupError};
pub use crate::controller::status::{EventRecorder, KubeEventRecorder};
pub use crate::resources::{ResourceFactory, StandardResources};

// Synthesis
pub use crate::controller::assembler::{Stage, SynthesisError};
pub use crate::controller::certificates::{CertificateConfig, CertificateDefinition};
pub use crate::controller::operator::DataImporterOperator;
pub use crate::resources::cluster::ClusterArgs;
pub use crate::resources::namespaced::NamespacedArgs;
pub use crate::resources::{DependentKind, DesiredObject};

// Config types
pub use crate::config::OperatorConfig;
