//! Folding an aggregation pass into the Ready condition
//!
//! Probe failures are written and announced on every pass. The success
//! paths only fire when the Ready status actually changes.

use tracing::info;

use crate::crd::{ConditionStatus, ControlPlaneStatus};
use crate::error::Error;

use super::aggregator::AggregateOutcome;
use super::client::EventType;
use super::conditions::{
    components_not_ready_condition, components_ready_condition, probe_error_condition,
    EVENT_REASON_NOT_READY, EVENT_REASON_READY, MESSAGE_COMPONENTS_READY,
};

/// An event to record against the control plane
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub event_type: EventType,
    pub reason: &'static str,
    pub message: String,
}

/// What the orchestrator has to do after a transition
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub should_persist: bool,
    pub notification: Option<Notification>,
    /// Probe error from the aggregation, if any
    pub error: Option<Error>,
}

/// Apply the result of an aggregation pass to the status conditions
pub fn update_readiness_status(
    status: &mut ControlPlaneStatus,
    outcome: AggregateOutcome,
) -> ReconcileOutcome {
    if let Some(err) = outcome.error {
        let condition = probe_error_condition(&err);
        let notification = Notification {
            event_type: EventType::Warning,
            reason: EVENT_REASON_NOT_READY,
            message: condition.message.clone(),
        };
        status.set_condition(condition);
        return ReconcileOutcome {
            should_persist: true,
            notification: Some(notification),
            error: Some(err),
        };
    }

    let unready = outcome.unready_components();
    for component in &unready {
        info!("{} resources are not fully available", component);
    }

    let current = status.ready_status();

    if !unready.is_empty() {
        if current == Some(ConditionStatus::False) {
            return ReconcileOutcome::default();
        }
        status.set_condition(components_not_ready_condition(&unready));
        return ReconcileOutcome {
            should_persist: true,
            notification: Some(Notification {
                event_type: EventType::Warning,
                reason: EVENT_REASON_NOT_READY,
                message: format!(
                    "The following components are not fully available: [{}]",
                    unready.join(", ")
                ),
            }),
            error: None,
        };
    }

    if current == Some(ConditionStatus::True) {
        return ReconcileOutcome::default();
    }
    status.set_condition(components_ready_condition());
    ReconcileOutcome {
        should_persist: true,
        notification: Some(Notification {
            event_type: EventType::Normal,
            reason: EVENT_REASON_READY,
            message: MESSAGE_COMPONENTS_READY.to_string(),
        }),
        error: None,
    }
}
