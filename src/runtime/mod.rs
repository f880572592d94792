//! # Runtime
//!
//! Host process around the synthesis core.
//!
//! - `initialization`: rustls, tracing, metrics, probe server and client setup
//! - `watch_loop`: kube-runtime controller over `DataImporter` resources
//! - `error_policy`: Requeue policy for failed reconciliations

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;
