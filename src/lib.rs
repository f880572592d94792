//! Data Importer Operator Library
//!
//! Desired-state synthesis for a Data Importer installation, plus the host
//! runtime that drives it from a Kubernetes watch.
//!
//! ## Quick Start
//!
//! ```rust
//! use data_importer_operator::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod resources;
pub mod runtime;
