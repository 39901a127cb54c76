//! Controller module for ServiceMeshControlPlane readiness
//! This module contains the controller loop and the readiness engine:
//! workload probes, the owned resource scanner, aggregation across kinds,
//! and the Ready condition transitions.

pub mod aggregator;
pub mod client;
pub mod conditions;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod readiness;
mod reconciler;
pub mod scanner;
pub mod transition;
pub mod workload;

/// Label tying a workload to the namespace of its control plane
pub const OWNER_LABEL: &str = "maistra.io/owner";
/// Label naming the control plane component a workload belongs to
pub const COMPONENT_LABEL: &str = "app.kubernetes.io/component";

pub use aggregator::{calculate_not_ready_state, AggregateOutcome};
pub use conditions::{
    CONDITION_TYPE_READY, REASON_COMPONENTS_NOT_READY, REASON_COMPONENTS_READY,
    REASON_PROBE_ERROR,
};
pub use client::{
    EventRecorder, EventType, KubeEventRecorder, KubeResourceStore, KubeStatusStore,
    ResourceQuery, ResourceStore, StatusStore,
};
pub use readiness::{ReadinessEngine, ReadinessOptions};
pub use reconciler::{run_controller, ControllerState};
pub use scanner::{ReadinessMap, CNI_COMPONENT, PROBE_TABLE};
pub use transition::{update_readiness_status, Notification, ReconcileOutcome};
pub use workload::WorkloadKind;
