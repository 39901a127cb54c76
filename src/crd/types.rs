//! Shared types for the ServiceMeshControlPlane status
//!
//! Conditions follow the Kubernetes API conventions: one entry per type,
//! each carrying a tri-state status, a machine-readable reason and a
//! human-readable message. Types and reasons are kept as strings since
//! other controllers write conditions to the same status.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::controller::conditions::CONDITION_TYPE_READY;

/// Tri-state condition status
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    /// Used only when the state could not be determined
    #[default]
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single status condition
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g., "Ready", "Installed", "Reconciled")
    #[serde(rename = "type")]
    pub type_: String,
    /// Status of the condition: "True", "False", or "Unknown"
    pub status: ConditionStatus,
    /// Machine-readable reason for the condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Last time the condition transitioned
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_transition_time: String,
}

impl Condition {
    /// Create a Ready condition with the given status
    pub fn ready(status: ConditionStatus, reason: &str, message: &str) -> Self {
        Self {
            type_: CONDITION_TYPE_READY.to_string(),
            status,
            reason: Some(reason.to_string()),
            message: message.to_string(),
            last_transition_time: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// True when type, status, reason and message all match
    pub fn same_state(&self, other: &Condition) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}
