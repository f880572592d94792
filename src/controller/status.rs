//! # Failure Reporting
//!
//! Records a synthesis failure on the installation status and as a
//! Kubernetes event. Status is mutated in place; persisting it is the
//! caller's job.

use crate::crd::{DataImporterStatus, CONDITION_AVAILABLE, CONDITION_DEGRADED, CONDITION_PROGRESSING};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::Client;
use tracing::{info, warn};

/// Publishes Kubernetes events. Publishing never fails the caller.
#[async_trait]
pub trait EventRecorder: Send + Sync {
    /// Publish a `Warning` event on the given object
    async fn warning(&self, object: &ObjectReference, reason: &str, message: &str);
}

/// `EventRecorder` backed by `kube::runtime::events::Recorder`
pub struct KubeEventRecorder {
    recorder: Recorder,
}

impl std::fmt::Debug for KubeEventRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeEventRecorder").finish_non_exhaustive()
    }
}

impl KubeEventRecorder {
    /// The controller name shows up as the event's reporting component
    #[must_use]
    pub fn new(client: Client, controller_name: &str) -> Self {
        let reporter = Reporter {
            controller: controller_name.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventRecorder for KubeEventRecorder {
    async fn warning(&self, object: &ObjectReference, reason: &str, message: &str) {
        let event = Event {
            type_: EventType::Warning,
            reason: reason.to_string(),
            note: Some(message.to_string()),
            action: "Reconcile".to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, object).await {
            warn!(
                "Failed to publish {} event on {}: {}",
                reason,
                object.name.as_deref().unwrap_or("unknown"),
                e
            );
        }
    }
}

/// Mark the installation as degraded but still serving.
///
/// Sets `Available=True`, `Progressing=False` and `Degraded=True` with the
/// given reason and message, then emits a warning event with the same text.
pub async fn mark_failed_healing(
    object: &ObjectReference,
    status: &mut DataImporterStatus,
    reason: &str,
    message: &str,
    recorder: &dyn EventRecorder,
) {
    status.set_condition(CONDITION_AVAILABLE, true, None, None);
    status.set_condition(CONDITION_PROGRESSING, false, None, None);
    status.set_condition(CONDITION_DEGRADED, true, Some(reason), Some(message));

    info!(
        "Marked {} degraded: {} ({})",
        object.name.as_deref().unwrap_or("unknown"),
        reason,
        message
    );
    recorder.warning(object, reason, message).await;
}

/// Clear a previously reported failure.
///
/// Only acts when `Degraded=True` is recorded; a status that never failed is
/// left as it is. Returns whether anything changed.
pub fn mark_recovered(status: &mut DataImporterStatus) -> bool {
    if !status.is_condition_true(CONDITION_DEGRADED) {
        return false;
    }
    status.set_condition(CONDITION_AVAILABLE, true, None, None);
    status.set_condition(CONDITION_PROGRESSING, false, None, None);
    status.set_condition(CONDITION_DEGRADED, false, None, None);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Captured(Mutex<Vec<(String, String)>>);

    #[async_trait]
    impl EventRecorder for Captured {
        async fn warning(&self, _object: &ObjectReference, reason: &str, message: &str) {
            self.0
                .lock()
                .unwrap()
                .push((reason.to_string(), message.to_string()));
        }
    }

    fn object() -> ObjectReference {
        ObjectReference {
            kind: Some("DataImporter".to_string()),
            name: Some("data-importer".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sets_failed_healing_conditions() {
        let recorder = Captured::default();
        let mut status = DataImporterStatus::default();

        mark_failed_healing(
            &object(),
            &mut status,
            "CreateDynamicResources",
            "Unable to create all dynamic resources",
            &recorder,
        )
        .await;

        assert!(status.is_condition_true(CONDITION_AVAILABLE));
        assert!(!status.is_condition_true(CONDITION_PROGRESSING));
        let degraded = status.condition(CONDITION_DEGRADED).unwrap();
        assert_eq!(degraded.status, "True");
        assert_eq!(degraded.reason.as_deref(), Some("CreateDynamicResources"));

        let events = recorder.0.lock().unwrap();
        assert_eq!(
            *events,
            vec![(
                "CreateDynamicResources".to_string(),
                "Unable to create all dynamic resources".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_repeated_failure_does_not_duplicate_conditions() {
        let recorder = Captured::default();
        let mut status = DataImporterStatus::default();

        for reason in ["CreateResources", "CreateNamespaceResources"] {
            mark_failed_healing(&object(), &mut status, reason, "failed", &recorder).await;
        }

        assert_eq!(status.conditions.len(), 3);
        assert_eq!(
            status.condition(CONDITION_DEGRADED).unwrap().reason.as_deref(),
            Some("CreateNamespaceResources")
        );
    }

    #[tokio::test]
    async fn test_recovery_clears_degraded() {
        let recorder = Captured::default();
        let mut status = DataImporterStatus::default();
        mark_failed_healing(&object(), &mut status, "CreateResources", "failed", &recorder).await;

        assert!(mark_recovered(&mut status));

        assert!(status.is_condition_true(CONDITION_AVAILABLE));
        assert!(!status.is_condition_true(CONDITION_PROGRESSING));
        let degraded = status.condition(CONDITION_DEGRADED).unwrap();
        assert_eq!(degraded.status, "False");
        assert_eq!(degraded.reason, None);
        assert!(!mark_recovered(&mut status));
    }

    #[test]
    fn test_recovery_ignores_healthy_status() {
        let mut status = DataImporterStatus::default();
        assert!(!mark_recovered(&mut status));
        assert!(status.conditions.is_empty());
    }
}
