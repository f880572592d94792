//! # Controller
//!
//! Desired-state synthesis for a Data Importer installation.
//!
//! - `cluster`: Read-only cluster access (priority classes, config maps)
//! - `overrides`: Resolves per-installation overrides onto operator defaults
//! - `certificates`: Certificate definitions and their expansion into objects
//! - `assembler`: Staged, fail-fast synthesis of the full desired state
//! - `status`: Failure reporting onto status conditions and events
//! - `mode`: Initial-install detection
//! - `operator`: The surface a reconcile engine drives
//! - `server`: HTTP server for metrics and health checks

pub mod assembler;
pub mod certificates;
pub mod cluster;
pub mod mode;
pub mod operator;
pub mod overrides;
pub mod server;
pub mod status;
