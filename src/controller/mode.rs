//! # Mode Detection
//!
//! Decides whether a reconciliation is an initial install by probing for the
//! operator's auxiliary config map.

use crate::constants::OPERATOR_CONFIG_MAP_NAME;
use crate::controller::cluster::ClusterReader;
use tracing::debug;

/// True when the auxiliary config map is absent.
///
/// A failed probe is treated as absent as well, so an unreachable API server
/// makes the engine take the creation path.
pub async fn is_initial_create(cluster: &dyn ClusterReader, namespace: &str) -> bool {
    match cluster.config_map(namespace, OPERATOR_CONFIG_MAP_NAME).await {
        Ok(Some(_)) => false,
        Ok(None) => {
            debug!(
                "Config map {}/{} not found, treating as initial create",
                namespace, OPERATOR_CONFIG_MAP_NAME
            );
            true
        }
        Err(e) => {
            debug!(
                "Probing config map {}/{} failed, treating as initial create: {}",
                namespace, OPERATOR_CONFIG_MAP_NAME, e
            );
            true
        }
    }
}
