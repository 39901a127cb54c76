//! Condition management helpers following Kubernetes API conventions

use crate::crd::{Condition, ConditionStatus};

/// Condition type owned by the readiness engine
pub const CONDITION_TYPE_READY: &str = "Ready";

// Reasons set on the Ready condition
pub const REASON_COMPONENTS_READY: &str = "ComponentsReady";
pub const REASON_COMPONENTS_NOT_READY: &str = "ComponentsNotReady";
pub const REASON_PROBE_ERROR: &str = "ProbeError";

/// Event reason recorded when the control plane becomes ready
pub const EVENT_REASON_READY: &str = "Ready";
/// Event reason recorded when components are unavailable or the probe failed
pub const EVENT_REASON_NOT_READY: &str = "NotReady";

pub const MESSAGE_COMPONENTS_READY: &str = "All components available";

/// Update or add a condition in the conditions list
///
/// A condition of the same type is replaced as a whole. When the status did
/// not change, the previous transition time is kept. Returns false if an
/// identical condition was already present.
pub fn set_condition(conditions: &mut Vec<Condition>, mut condition: Condition) -> bool {
    if let Some(existing) = conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        if existing.same_state(&condition) {
            return false;
        }
        // Transition time only moves when status changes
        if existing.status == condition.status {
            condition.last_transition_time = existing.last_transition_time.clone();
        }
        *existing = condition;
    } else {
        conditions.push(condition);
    }
    true
}

/// Find a condition by type
pub fn find_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Ready=True, every component is available
pub fn components_ready_condition() -> Condition {
    Condition::ready(
        ConditionStatus::True,
        REASON_COMPONENTS_READY,
        MESSAGE_COMPONENTS_READY,
    )
}

/// Ready=False naming the unavailable components
pub fn components_not_ready_condition(unready: &[String]) -> Condition {
    Condition::ready(
        ConditionStatus::False,
        REASON_COMPONENTS_NOT_READY,
        &format!(
            "Some components are not fully available: {}",
            unready.join(", ")
        ),
    )
}

/// Ready=Unknown, readiness could not be collected
pub fn probe_error_condition(error: &impl std::fmt::Display) -> Condition {
    Condition::ready(
        ConditionStatus::Unknown,
        REASON_PROBE_ERROR,
        &format!("Error collecting ready state: {error}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_condition_adds_new() {
        let mut conditions = Vec::new();
        assert!(set_condition(&mut conditions, components_ready_condition()));

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].type_, CONDITION_TYPE_READY);
        assert_eq!(conditions[0].status, ConditionStatus::True);
    }

    #[test]
    fn test_set_condition_updates_existing() {
        let mut conditions = vec![Condition {
            last_transition_time: "2024-01-01T00:00:00Z".to_string(),
            ..components_not_ready_condition(&["istiod".to_string()])
        }];

        let old_time = conditions[0].last_transition_time.clone();
        set_condition(&mut conditions, components_ready_condition());

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].status, ConditionStatus::True);
        assert_ne!(conditions[0].last_transition_time, old_time);
    }

    #[test]
    fn test_set_condition_keeps_transition_time_for_same_status() {
        let mut conditions = vec![Condition {
            last_transition_time: "2024-01-01T00:00:00Z".to_string(),
            ..probe_error_condition(&"timeout")
        }];

        assert!(set_condition(
            &mut conditions,
            probe_error_condition(&"connection refused")
        ));
        assert_eq!(conditions[0].last_transition_time, "2024-01-01T00:00:00Z");
        assert_eq!(
            conditions[0].message,
            "Error collecting ready state: connection refused"
        );
    }

    #[test]
    fn test_set_condition_leaves_other_types_alone() {
        let installed = Condition {
            type_: "Installed".to_string(),
            status: ConditionStatus::True,
            reason: Some("UpdateSuccessful".to_string()),
            message: "Successfully installed version v2.6".to_string(),
            last_transition_time: "2024-01-01T00:00:00Z".to_string(),
        };
        let mut conditions = vec![installed.clone()];

        assert!(set_condition(&mut conditions, components_ready_condition()));

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0], installed);
        assert_eq!(
            find_condition(&conditions, CONDITION_TYPE_READY).map(|c| c.status),
            Some(ConditionStatus::True)
        );
    }

    #[test]
    fn test_not_ready_condition_lists_components() {
        let condition =
            components_not_ready_condition(&["galley".to_string(), "istiod".to_string()]);

        assert_eq!(condition.reason.as_deref(), Some(REASON_COMPONENTS_NOT_READY));
        assert_eq!(
            condition.message,
            "Some components are not fully available: galley, istiod"
        );
    }
}
