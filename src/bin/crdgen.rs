//! # CRD Generator
//!
//! Prints the `DataImporter` and `VolumeImport` CustomResourceDefinitions as
//! a multi-document YAML stream.
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/dataimporter.yaml
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use data_importer_operator::crd::{DataImporter, VolumeImport};
use kube::core::CustomResourceExt;

fn main() {
    println!("# This file is auto-generated by crdgen");
    println!("# DO NOT EDIT THIS FILE MANUALLY");
    println!("# Change the CRD types under src/crd and regenerate");

    for crd in [DataImporter::crd(), VolumeImport::crd()] {
        match serde_yaml::to_string(&crd) {
            Ok(yaml) => {
                println!("---");
                print!("{yaml}");
            }
            Err(e) => {
                eprintln!("Failed to serialize CRD to YAML: {e}");
                std::process::exit(1);
            }
        }
    }
}
