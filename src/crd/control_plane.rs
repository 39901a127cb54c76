//! ServiceMeshControlPlane Custom Resource Definition
//!
//! The control plane spec is translated into deployment configuration by a
//! separate layer; this crate only needs the identity of the instance and its
//! status, so the spec is kept deliberately small.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{Condition, ConditionStatus};
use crate::controller::conditions::{find_condition, set_condition, CONDITION_TYPE_READY};

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "maistra.io",
    version = "v2",
    kind = "ServiceMeshControlPlane",
    namespaced,
    status = "ControlPlaneStatus",
    shortname = "smcp",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Reason","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].reason"}"#,
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMeshControlPlaneSpec {
    /// Control plane version, e.g. "v2.6"
    #[serde(default)]
    pub version: String,

    /// Profiles applied in order before the spec itself
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,

    /// Free-form tech preview settings passed through to the config layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_preview: Option<BTreeMap<String, serde_json::Value>>,
}

/// Observed state of a ServiceMeshControlPlane
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneStatus {
    /// Conditions, at most one per type
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ControlPlaneStatus {
    /// Find a condition by type
    pub fn get_condition(&self, type_: &str) -> Option<&Condition> {
        find_condition(&self.conditions, type_)
    }

    /// Status of the Ready condition, `None` when it was never set
    pub fn ready_status(&self) -> Option<ConditionStatus> {
        self.get_condition(CONDITION_TYPE_READY).map(|c| c.status)
    }

    /// Upsert a condition by type; returns false when nothing changed
    pub fn set_condition(&mut self, condition: Condition) -> bool {
        set_condition(&mut self.conditions, condition)
    }
}
