//! # DataImporter Status
//!
//! Status types for tracking reconciliation state and conditions.

use serde::{Deserialize, Serialize};

pub const CONDITION_AVAILABLE: &str = "Available";
pub const CONDITION_PROGRESSING: &str = "Progressing";
pub const CONDITION_DEGRADED: &str = "Degraded";

/// Status of the DataImporter resource
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataImporterStatus {
    /// Current phase of the installation
    /// Values: Deploying, Deployed, Deleting, Deleted, Error, Upgrading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Version of the operator that last reconciled this resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_version: Option<String>,
    /// Version being rolled out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
    /// Version observed as fully deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_version: Option<String>,
    /// Observed generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last time the status flipped
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Last time the condition was written
    #[serde(default)]
    pub last_heartbeat_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

impl DataImporterStatus {
    /// Upsert a condition by type.
    ///
    /// An existing condition of the same type is updated in place; its
    /// transition time only moves when `status` changes. Writing the same
    /// status, reason and message again leaves the condition untouched.
    pub fn set_condition(
        &mut self,
        condition_type: &str,
        status: bool,
        reason: Option<&str>,
        message: Option<&str>,
    ) {
        let now = chrono::Utc::now().to_rfc3339();
        let status = if status { "True" } else { "False" };

        match self
            .conditions
            .iter_mut()
            .find(|c| c.r#type == condition_type)
        {
            Some(existing) => {
                if existing.status == status
                    && existing.reason.as_deref() == reason
                    && existing.message.as_deref() == message
                {
                    return;
                }
                if existing.status != status {
                    existing.status = status.to_string();
                    existing.last_transition_time = Some(now.clone());
                }
                existing.reason = reason.map(str::to_string);
                existing.message = message.map(str::to_string);
                existing.last_heartbeat_time = Some(now);
            }
            None => self.conditions.push(Condition {
                r#type: condition_type.to_string(),
                status: status.to_string(),
                last_transition_time: Some(now.clone()),
                last_heartbeat_time: Some(now),
                reason: reason.map(str::to_string),
                message: message.map(str::to_string),
            }),
        }
    }

    /// Look up a condition by type
    #[must_use]
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.r#type == condition_type)
    }

    /// Returns true when the condition exists and is `True`
    #[must_use]
    pub fn is_condition_true(&self, condition_type: &str) -> bool {
        self.condition(condition_type)
            .is_some_and(|c| c.status == "True")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_condition_appends_new_type() {
        let mut status = DataImporterStatus::default();
        status.set_condition(CONDITION_DEGRADED, true, Some("CreateResources"), Some("boom"));

        assert_eq!(status.conditions.len(), 1);
        let c = status.condition(CONDITION_DEGRADED).unwrap();
        assert_eq!(c.status, "True");
        assert_eq!(c.reason.as_deref(), Some("CreateResources"));
        assert_eq!(c.message.as_deref(), Some("boom"));
        assert!(c.last_transition_time.is_some());
    }

    #[test]
    fn test_set_condition_updates_in_place() {
        let mut status = DataImporterStatus::default();
        status.set_condition(CONDITION_DEGRADED, true, Some("CreateResources"), Some("first"));
        status.set_condition(
            CONDITION_DEGRADED,
            true,
            Some("CreateDynamicResources"),
            Some("second"),
        );

        assert_eq!(status.conditions.len(), 1);
        let c = status.condition(CONDITION_DEGRADED).unwrap();
        assert_eq!(c.reason.as_deref(), Some("CreateDynamicResources"));
        assert_eq!(c.message.as_deref(), Some("second"));
    }

    #[test]
    fn test_transition_time_kept_when_status_unchanged() {
        let mut status = DataImporterStatus::default();
        status.set_condition(CONDITION_AVAILABLE, true, None, None);
        let first = status.conditions[0].last_transition_time.clone();

        status.set_condition(CONDITION_AVAILABLE, true, Some("Again"), None);
        assert_eq!(status.conditions[0].last_transition_time, first);
    }

    #[test]
    fn test_identical_upsert_leaves_condition_untouched() {
        let mut status = DataImporterStatus::default();
        status.set_condition(CONDITION_DEGRADED, true, Some("CreateResources"), Some("boom"));
        status.conditions[0].last_heartbeat_time = Some("2020-01-01T00:00:00+00:00".into());
        let before = status.clone();

        status.set_condition(CONDITION_DEGRADED, true, Some("CreateResources"), Some("boom"));
        assert_eq!(status, before);

        status.set_condition(CONDITION_DEGRADED, true, Some("CreateResources"), Some("other"));
        assert_ne!(
            status.conditions[0].last_heartbeat_time.as_deref(),
            Some("2020-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_transition_time_moves_on_flip() {
        let mut status = DataImporterStatus::default();
        status.set_condition(CONDITION_PROGRESSING, true, None, None);
        status.conditions[0].last_transition_time = Some("2020-01-01T00:00:00+00:00".into());

        status.set_condition(CONDITION_PROGRESSING, false, None, None);
        let c = status.condition(CONDITION_PROGRESSING).unwrap();
        assert_eq!(c.status, "False");
        assert_ne!(
            c.last_transition_time.as_deref(),
            Some("2020-01-01T00:00:00+00:00")
        );
        assert!(!status.is_condition_true(CONDITION_PROGRESSING));
    }
}
