//! # Metrics
//!
//! Prometheus metrics for monitoring the operator.
//!
//! ## Metrics Exposed
//!
//! - `data_importer_operator_reconciliations_total` - Total number of reconciliations
//! - `data_importer_operator_reconciliation_errors_total` - Total number of reconciliation errors
//! - `data_importer_operator_reconciliation_duration_seconds` - Duration of reconciliations
//! - `data_importer_operator_synthesis_duration_seconds` - Duration of desired-state synthesis
//! - `data_importer_operator_synthesis_failures_total` - Synthesis failures by stage reason
//! - `data_importer_operator_priority_class_fallbacks_total` - Priority class lookups that fell back to none
//! - `data_importer_operator_desired_objects` - Objects in the most recent desired state

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, IntGauge, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "data_importer_operator_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "data_importer_operator_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "data_importer_operator_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static SYNTHESIS_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "data_importer_operator_synthesis_duration_seconds",
            "Duration of desired-state synthesis in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
    )
    .expect("Failed to create SYNTHESIS_DURATION metric - this should never happen")
});

static SYNTHESIS_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "data_importer_operator_synthesis_failures_total",
            "Total number of desired-state synthesis failures by stage",
        ),
        &["stage"],
    )
    .expect("Failed to create SYNTHESIS_FAILURES_TOTAL metric - this should never happen")
});

static PRIORITY_CLASS_FALLBACKS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "data_importer_operator_priority_class_fallbacks_total",
        "Total number of priority class lookups that fell back to no priority class",
    )
    .expect("Failed to create PRIORITY_CLASS_FALLBACKS_TOTAL metric - this should never happen")
});

static DESIRED_OBJECTS: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "data_importer_operator_desired_objects",
        "Number of objects in the most recent desired state",
    )
    .expect("Failed to create DESIRED_OBJECTS metric - this should never happen")
});

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(SYNTHESIS_DURATION.clone()))?;
    REGISTRY.register(Box::new(SYNTHESIS_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PRIORITY_CLASS_FALLBACKS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DESIRED_OBJECTS.clone()))?;

    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn observe_synthesis_duration(duration: f64) {
    SYNTHESIS_DURATION.observe(duration);
}

pub fn increment_synthesis_failures(stage: &str) {
    SYNTHESIS_FAILURES_TOTAL.with_label_values(&[stage]).inc();
}

pub fn increment_priority_class_fallbacks() {
    PRIORITY_CLASS_FALLBACKS_TOTAL.inc();
}

pub fn set_desired_objects(count: usize) {
    DESIRED_OBJECTS.set(i64::try_from(count).unwrap_or(i64::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_reconciliations() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        assert_eq!(RECONCILIATIONS_TOTAL.get(), before + 1u64);
    }

    #[test]
    fn test_increment_reconciliation_errors() {
        let before = RECONCILIATION_ERRORS_TOTAL.get();
        increment_reconciliation_errors();
        assert_eq!(RECONCILIATION_ERRORS_TOTAL.get(), before + 1u64);
    }

    #[test]
    fn test_synthesis_failures_are_labelled_by_stage() {
        let before = SYNTHESIS_FAILURES_TOTAL
            .with_label_values(&["CreateDynamicResources"])
            .get();
        increment_synthesis_failures("CreateDynamicResources");
        let after = SYNTHESIS_FAILURES_TOTAL
            .with_label_values(&["CreateDynamicResources"])
            .get();
        assert_eq!(after, before + 1u64);
    }

    #[test]
    fn test_increment_priority_class_fallbacks() {
        let before = PRIORITY_CLASS_FALLBACKS_TOTAL.get();
        increment_priority_class_fallbacks();
        assert!(PRIORITY_CLASS_FALLBACKS_TOTAL.get() > before);
    }

    #[test]
    fn test_set_desired_objects() {
        set_desired_objects(10);
        assert_eq!(DESIRED_OBJECTS.get(), 10);
        set_desired_objects(32);
        assert_eq!(DESIRED_OBJECTS.get(), 32);
    }

    #[test]
    fn test_observe_durations() {
        observe_synthesis_duration(0.02);
        observe_reconciliation_duration(0.5);
        // Just verify it doesn't panic
    }
}
