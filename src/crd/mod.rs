//! # Custom Resource Definitions
//!
//! CRD types for the Data Importer operator.
//!
//! ## Module Structure
//!
//! - `spec.rs` - The `DataImporter` installation CR and its configuration types
//! - `placement.rs` - Node placement copied onto operand pods
//! - `certs.rs` - Certificate lifetime configuration
//! - `status.rs` - Status and condition types
//! - `volume_import.rs` - The `VolumeImport` operand CRD the operator installs

mod certs;
mod placement;
mod spec;
mod status;
mod volume_import;

pub use certs::{CertConfig, CertLifetime};
pub use placement::{NodePlacement, Toleration};
pub use spec::{DataImporter, DataImporterConfig, DataImporterSpec, ImagePullPolicy, ImagePullSecret};
pub use status::{
    Condition, DataImporterStatus, CONDITION_AVAILABLE, CONDITION_DEGRADED, CONDITION_PROGRESSING,
};
pub use volume_import::{
    HttpSource, ImportSource, RegistrySource, VolumeImport, VolumeImportSpec, VolumeImportStatus,
};
