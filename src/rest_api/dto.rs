//! Response types for the REST API

use serde::{Deserialize, Serialize};

use crate::controller::CONDITION_TYPE_READY;
use crate::crd::ServiceMeshControlPlane;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Ready condition of a single control plane
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneReadiness {
    pub name: String,
    pub namespace: String,
    /// "True", "False" or "Unknown"; "Unknown" when never evaluated
    pub ready: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&ServiceMeshControlPlane> for ControlPlaneReadiness {
    fn from(smcp: &ServiceMeshControlPlane) -> Self {
        let condition = smcp
            .status
            .as_ref()
            .and_then(|s| s.get_condition(CONDITION_TYPE_READY));
        Self {
            name: smcp.metadata.name.clone().unwrap_or_default(),
            namespace: smcp.metadata.namespace.clone().unwrap_or_default(),
            ready: condition
                .map(|c| c.status.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            reason: condition.and_then(|c| c.reason.clone()),
            message: condition.map(|c| c.message.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ControlPlaneListResponse {
    pub items: Vec<ControlPlaneReadiness>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::conditions::components_not_ready_condition;
    use crate::crd::{ControlPlaneStatus, ServiceMeshControlPlaneSpec};

    #[test]
    fn test_readiness_from_unevaluated_control_plane() {
        let mut smcp = ServiceMeshControlPlane::new("basic", ServiceMeshControlPlaneSpec::default());
        smcp.metadata.namespace = Some("istio-system".to_string());

        let readiness = ControlPlaneReadiness::from(&smcp);
        assert_eq!(readiness.ready, "Unknown");
        assert!(readiness.reason.is_none());
    }

    #[test]
    fn test_readiness_reflects_ready_condition() {
        let mut smcp = ServiceMeshControlPlane::new("basic", ServiceMeshControlPlaneSpec::default());
        let mut status = ControlPlaneStatus::default();
        status.set_condition(components_not_ready_condition(&["istiod".to_string()]));
        smcp.status = Some(status);

        let readiness = ControlPlaneReadiness::from(&smcp);
        assert_eq!(readiness.ready, "False");
        assert_eq!(readiness.reason.as_deref(), Some("ComponentsNotReady"));
        assert!(readiness.message.unwrap().contains("istiod"));
    }
}
