//! Readiness predicates for the workload kinds a control plane owns
//!
//! Resources are read as generic documents so that one code path can handle
//! every kind. Each kind has its own policy for missing status data:
//!
//! - Deployment: ready only with an `Available=True` condition
//! - StatefulSet: ready only when `readyReplicas >= replicas`, both present
//! - DaemonSet: ready unless `numberUnavailable` is present and non-zero
//!
//! The DaemonSet policy treats missing data as ready while the other two
//! treat it as not ready. Existing installations depend on this, keep it.

use std::fmt;

use kube::api::DynamicObject;
use kube::ResourceExt;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// Workload kinds whose readiness is evaluated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
        }
    }

    /// Evaluate the readiness of a single resource of this kind
    ///
    /// A status document that cannot be read is logged and reported as not
    /// ready.
    pub fn is_ready(&self, resource: &DynamicObject) -> bool {
        let result = match self {
            WorkloadKind::Deployment => deployment_ready(&resource.data),
            WorkloadKind::StatefulSet => stateful_set_ready(&resource.data),
            WorkloadKind::DaemonSet => daemon_set_ready(&resource.data),
        };
        result.unwrap_or_else(|e| {
            error!(
                "error reading {}.Status for {}: {}",
                self,
                resource.name_any(),
                e
            );
            false
        })
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status field exists but has the wrong shape
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{path} accessor error: {found} is not of the expected type {expected}")]
pub struct StatusFieldError {
    pub path: String,
    pub found: String,
    pub expected: &'static str,
}

impl StatusFieldError {
    fn new(path: &[&str], found: &Value, expected: &'static str) -> Self {
        Self {
            path: format!(".{}", path.join(".")),
            found: found.to_string(),
            expected,
        }
    }
}

/// Walk a path of object keys; `Ok(None)` when any segment is missing or null
fn nested_field<'a>(doc: &'a Value, path: &[&str]) -> Result<Option<&'a Value>, StatusFieldError> {
    let mut current = doc;
    for (depth, key) in path.iter().enumerate() {
        let Some(object) = current.as_object() else {
            return Err(StatusFieldError::new(&path[..depth], current, "map"));
        };
        match object.get(*key) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => current = value,
        }
    }
    Ok(Some(current))
}

fn nested_i64(doc: &Value, path: &[&str]) -> Result<Option<i64>, StatusFieldError> {
    match nested_field(doc, path)? {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| StatusFieldError::new(path, value, "int64")),
    }
}

fn nested_slice<'a>(doc: &'a Value, path: &[&str]) -> Result<Option<&'a [Value]>, StatusFieldError> {
    match nested_field(doc, path)? {
        None => Ok(None),
        Some(value) => value
            .as_array()
            .map(|items| Some(items.as_slice()))
            .ok_or_else(|| StatusFieldError::new(path, value, "slice")),
    }
}

/// Ready iff the first `Available` condition has status `True`
pub fn deployment_ready(doc: &Value) -> Result<bool, StatusFieldError> {
    let Some(conditions) = nested_slice(doc, &["status", "conditions"])? else {
        return Ok(false);
    };

    for condition in conditions {
        let Some(condition) = condition.as_object() else {
            error!("cannot convert Deployment condition: {}", condition);
            continue;
        };
        if condition.get("type").and_then(Value::as_str) == Some("Available") {
            return Ok(condition.get("status").and_then(Value::as_str) == Some("True"));
        }
    }

    Ok(false)
}

/// Ready iff both replica counts are present and `readyReplicas >= replicas`
pub fn stateful_set_ready(doc: &Value) -> Result<bool, StatusFieldError> {
    let Some(replicas) = nested_i64(doc, &["status", "replicas"])? else {
        return Ok(false);
    };
    let Some(ready_replicas) = nested_i64(doc, &["status", "readyReplicas"])? else {
        return Ok(false);
    };
    Ok(ready_replicas >= replicas)
}

/// Ready unless `numberUnavailable` is present and non-zero
pub fn daemon_set_ready(doc: &Value) -> Result<bool, StatusFieldError> {
    let unavailable = nested_i64(doc, &["status", "numberUnavailable"])?;
    Ok(unavailable.map_or(true, |n| n == 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;
    use serde_json::json;

    fn resource(name: &str, data: Value) -> DynamicObject {
        DynamicObject {
            types: None,
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data,
        }
    }

    #[test]
    fn test_deployment_available_true_is_ready() {
        let doc = json!({"status": {"conditions": [
            {"type": "Progressing", "status": "True"},
            {"type": "Available", "status": "True"}
        ]}});
        assert_eq!(deployment_ready(&doc), Ok(true));
    }

    #[test]
    fn test_deployment_available_false_is_not_ready() {
        let doc = json!({"status": {"conditions": [{"type": "Available", "status": "False"}]}});
        assert_eq!(deployment_ready(&doc), Ok(false));
    }

    #[test]
    fn test_deployment_missing_or_empty_conditions_is_not_ready() {
        assert_eq!(deployment_ready(&json!({})), Ok(false));
        assert_eq!(deployment_ready(&json!({"status": {}})), Ok(false));
        assert_eq!(
            deployment_ready(&json!({"status": {"conditions": []}})),
            Ok(false)
        );
        assert_eq!(
            deployment_ready(&json!({"status": {"conditions": [
                {"type": "Progressing", "status": "True"}
            ]}})),
            Ok(false)
        );
    }

    #[test]
    fn test_deployment_skips_malformed_condition_entries() {
        let doc = json!({"status": {"conditions": [
            "garbage",
            {"type": "Available", "status": "True"}
        ]}});
        assert_eq!(deployment_ready(&doc), Ok(true));
    }

    #[test]
    fn test_deployment_conditions_of_wrong_type_is_error() {
        let doc = json!({"status": {"conditions": "Available"}});
        assert!(deployment_ready(&doc).is_err());

        let kind = WorkloadKind::Deployment;
        assert!(!kind.is_ready(&resource("istiod", doc)));
    }

    #[test]
    fn test_statefulset_ready_replicas() {
        let ready = json!({"status": {"replicas": 3, "readyReplicas": 3}});
        let scaling = json!({"status": {"replicas": 3, "readyReplicas": 1}});
        let over = json!({"status": {"replicas": 1, "readyReplicas": 2}});

        assert_eq!(stateful_set_ready(&ready), Ok(true));
        assert_eq!(stateful_set_ready(&scaling), Ok(false));
        assert_eq!(stateful_set_ready(&over), Ok(true));
    }

    #[test]
    fn test_statefulset_missing_fields_is_not_ready() {
        assert_eq!(
            stateful_set_ready(&json!({"status": {"replicas": 1}})),
            Ok(false)
        );
        assert_eq!(
            stateful_set_ready(&json!({"status": {"readyReplicas": 1}})),
            Ok(false)
        );
        assert_eq!(stateful_set_ready(&json!({})), Ok(false));
    }

    #[test]
    fn test_statefulset_non_integer_replicas_is_error() {
        let doc = json!({"status": {"replicas": "three", "readyReplicas": 3}});
        let err = stateful_set_ready(&doc).unwrap_err();
        assert_eq!(err.path, ".status.replicas");
        assert!(!WorkloadKind::StatefulSet.is_ready(&resource("elasticsearch", doc)));
    }

    #[test]
    fn test_daemonset_absent_unavailable_is_ready() {
        assert_eq!(daemon_set_ready(&json!({"status": {}})), Ok(true));
        assert_eq!(daemon_set_ready(&json!({})), Ok(true));
        assert!(WorkloadKind::DaemonSet.is_ready(&resource("istio-cni", json!({}))));
    }

    #[test]
    fn test_daemonset_unavailable_count() {
        assert_eq!(
            daemon_set_ready(&json!({"status": {"numberUnavailable": 0}})),
            Ok(true)
        );
        assert_eq!(
            daemon_set_ready(&json!({"status": {"numberUnavailable": 2}})),
            Ok(false)
        );
    }

    #[test]
    fn test_status_that_is_not_a_map_is_error() {
        let doc = json!({"status": 7});
        let err = daemon_set_ready(&doc).unwrap_err();
        assert_eq!(err.path, ".status");
        assert!(!WorkloadKind::DaemonSet.is_ready(&resource("istio-cni", doc)));
    }
}
