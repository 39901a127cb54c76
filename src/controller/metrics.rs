//! Prometheus metrics for the mesh operator
//!
//! # Exported metrics
//! The `/metrics` endpoint (when built with `--features metrics`) exports the following metrics:
//! - `mesh_reconcile_duration_seconds` (histogram): reconcile duration labeled by controller.
//! - `mesh_reconcile_errors_total` (counter): reconcile errors labeled by controller and kind.
//! - `mesh_control_plane_unready_components` (gauge): unready components per control plane,
//!   as of the last pass that listed every workload kind.
//! - `mesh_readiness_probe_errors_total` (counter): failed readiness probes per control plane.
//! - `mesh_ready_transitions_total` (counter): changes of the Ready status labeled by new status.

use std::sync::atomic::{AtomicI64, AtomicU64};

use once_cell::sync::Lazy;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Labels identifying a control plane
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ControlPlaneLabels {
    pub namespace: String,
    pub name: String,
}

/// Labels for Ready transitions
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TransitionLabels {
    pub namespace: String,
    pub name: String,
    /// "True", "False" or "Unknown"
    pub status: String,
}

/// Labels for operator reconcile metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ReconcileLabels {
    /// Controller name, e.g. "servicemeshcontrolplane"
    pub controller: String,
}

/// Labels for operator error metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub controller: String,
    /// Error kind, e.g. "probe", "persistence"
    pub kind: String,
}

/// Histogram tracking reconcile duration (seconds)
pub static RECONCILE_DURATION_SECONDS: Lazy<Family<ReconcileLabels, Histogram>> = Lazy::new(|| {
    fn reconcile_histogram() -> Histogram {
        // 1ms .. ~32s across 16 buckets.
        Histogram::new(exponential_buckets(0.001, 2.0, 16))
    }

    Family::new_with_constructor(reconcile_histogram)
});

/// Counter tracking reconcile errors
pub static RECONCILE_ERRORS_TOTAL: Lazy<Family<ErrorLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Gauge tracking how many components of a control plane are unready
pub static UNREADY_COMPONENTS: Lazy<Family<ControlPlaneLabels, Gauge<i64, AtomicI64>>> =
    Lazy::new(Family::default);

/// Counter tracking readiness probes that could not complete
pub static PROBE_ERRORS_TOTAL: Lazy<Family<ControlPlaneLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Counter tracking changes of the Ready status
pub static READY_TRANSITIONS_TOTAL: Lazy<Family<TransitionLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();

    registry.register(
        "mesh_reconcile_duration_seconds",
        "Duration of reconcile loops in seconds",
        RECONCILE_DURATION_SECONDS.clone(),
    );
    registry.register(
        "mesh_reconcile_errors",
        "Total number of reconcile errors",
        RECONCILE_ERRORS_TOTAL.clone(),
    );
    registry.register(
        "mesh_control_plane_unready_components",
        "Number of control plane components that are not fully available",
        UNREADY_COMPONENTS.clone(),
    );
    registry.register(
        "mesh_readiness_probe_errors",
        "Readiness probes that failed to list workloads",
        PROBE_ERRORS_TOTAL.clone(),
    );
    registry.register(
        "mesh_ready_transitions",
        "Ready status changes by resulting status",
        READY_TRANSITIONS_TOTAL.clone(),
    );

    registry
});

/// Observe reconcile duration (seconds).
pub fn observe_reconcile_duration_seconds(controller: &str, seconds: f64) {
    let labels = ReconcileLabels {
        controller: controller.to_string(),
    };
    RECONCILE_DURATION_SECONDS
        .get_or_create(&labels)
        .observe(seconds);
}

/// Increment the reconcile error counter.
pub fn inc_reconcile_error(controller: &str, kind: &str) {
    let labels = ErrorLabels {
        controller: controller.to_string(),
        kind: kind.to_string(),
    };
    RECONCILE_ERRORS_TOTAL.get_or_create(&labels).inc();
}

pub fn set_unready_components(namespace: &str, name: &str, count: i64) {
    let labels = ControlPlaneLabels {
        namespace: namespace.to_string(),
        name: name.to_string(),
    };
    UNREADY_COMPONENTS.get_or_create(&labels).set(count);
}

pub fn inc_probe_error(namespace: &str, name: &str) {
    let labels = ControlPlaneLabels {
        namespace: namespace.to_string(),
        name: name.to_string(),
    };
    PROBE_ERRORS_TOTAL.get_or_create(&labels).inc();
}

pub fn inc_ready_transition(namespace: &str, name: &str, status: &str) {
    let labels = TransitionLabels {
        namespace: namespace.to_string(),
        name: name.to_string(),
        status: status.to_string(),
    };
    READY_TRANSITIONS_TOTAL.get_or_create(&labels).inc();
}
