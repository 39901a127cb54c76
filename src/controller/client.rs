//! Collaborators used by the readiness engine
//!
//! The engine only talks to the cluster through these traits so that a
//! readiness pass can be exercised without an API server.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Event;
use kube::api::{Api, DynamicObject, ListParams, Patch, PatchParams, PostParams};
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;
use kube::{Client, Resource, ResourceExt};
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use crate::crd::ServiceMeshControlPlane;
use crate::error::{Error, Result};

use super::workload::WorkloadKind;

/// Field manager used for status patches
pub const FIELD_MANAGER: &str = "mesh-operator";

/// Severity of a recorded event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Normal => "Normal",
            EventType::Warning => "Warning",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single listing request against the resource store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceQuery {
    pub kind: WorkloadKind,
    pub namespace: String,
    /// Value of the owner label, when results must belong to an instance
    pub owner: Option<String>,
    /// Additional label constraints
    pub labels: BTreeMap<String, String>,
}

impl ResourceQuery {
    /// Render the query as a Kubernetes label selector
    pub fn label_selector(&self) -> String {
        let mut selector: Vec<String> = Vec::new();
        if let Some(owner) = &self.owner {
            selector.push(format!("{}={}", super::OWNER_LABEL, owner));
        }
        selector.extend(self.labels.iter().map(|(k, v)| format!("{k}={v}")));
        selector.join(",")
    }
}

/// Lists workload resources
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> Result<Vec<DynamicObject>>;
}

/// Persists the status of a control plane
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Write the whole status subresource of the instance
    async fn post_status(&self, instance: &ServiceMeshControlPlane) -> Result<()>;
}

/// Records events against a control plane
///
/// Delivery is best effort; implementations must not fail the caller.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventRecorder: Send + Sync {
    async fn event(
        &self,
        instance: &ServiceMeshControlPlane,
        event_type: EventType,
        reason: &str,
        message: &str,
    );
}

/// Resource store backed by the Kubernetes API
pub struct KubeResourceStore {
    client: Client,
}

impl KubeResourceStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn list(&self, query: &ResourceQuery) -> Result<Vec<DynamicObject>> {
        let gvk = GroupVersionKind::gvk("apps", "v1", query.kind.as_str());
        let api_resource = ApiResource::from_gvk(&gvk);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), &query.namespace, &api_resource);

        let selector = query.label_selector();
        debug!(
            "Listing {} in {} with selector '{}'",
            query.kind, query.namespace, selector
        );
        let list = api
            .list(&ListParams::default().labels(&selector))
            .await
            .map_err(Error::KubeError)?;
        Ok(list.items)
    }
}

/// Status store backed by the status subresource
pub struct KubeStatusStore {
    client: Client,
}

impl KubeStatusStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusStore for KubeStatusStore {
    async fn post_status(&self, instance: &ServiceMeshControlPlane) -> Result<()> {
        let namespace = instance.namespace().unwrap_or_else(|| "default".to_string());
        let api: Api<ServiceMeshControlPlane> = Api::namespaced(self.client.clone(), &namespace);

        let patch = serde_json::json!({ "status": instance.status });
        api.patch_status(
            &instance.name_any(),
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Merge(&patch),
        )
        .await
        .map_err(Error::KubeError)?;

        Ok(())
    }
}

/// Event recorder creating core/v1 Events
pub struct KubeEventRecorder {
    client: Client,
}

impl KubeEventRecorder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventRecorder for KubeEventRecorder {
    async fn event(
        &self,
        instance: &ServiceMeshControlPlane,
        event_type: EventType,
        reason: &str,
        message: &str,
    ) {
        let namespace = instance.namespace().unwrap_or_else(|| "default".to_string());
        let events: Api<Event> = Api::namespaced(self.client.clone(), &namespace);

        let time = chrono::Utc::now();
        let event = Event {
            metadata: kube::api::ObjectMeta {
                generate_name: Some(format!("{}-", instance.name_any())),
                ..Default::default()
            },
            type_: Some(event_type.to_string()),
            reason: Some(reason.to_string()),
            message: Some(message.to_string()),
            involved_object: instance.object_ref(&()),
            first_timestamp: Some(k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(time)),
            last_timestamp: Some(k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(time)),
            count: Some(1),
            ..Default::default()
        };

        if let Err(e) = events.create(&PostParams::default(), &event).await {
            warn!(
                "Failed to record {} event {} for {}/{}: {:?}",
                event_type,
                reason,
                namespace,
                instance.name_any(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_query_selector_includes_owner() {
        let query = ResourceQuery {
            kind: WorkloadKind::Deployment,
            namespace: "istio-system".to_string(),
            owner: Some("istio-system".to_string()),
            labels: BTreeMap::new(),
        };
        assert_eq!(query.label_selector(), "maistra.io/owner=istio-system");
    }

    #[test]
    fn test_cni_query_selector_has_only_extra_labels() {
        let query = ResourceQuery {
            kind: WorkloadKind::DaemonSet,
            namespace: "openshift-operators".to_string(),
            owner: None,
            labels: BTreeMap::from([("istio".to_string(), "cni".to_string())]),
        };
        assert_eq!(query.label_selector(), "istio=cni");
    }

    #[test]
    fn test_event_type_strings() {
        assert_eq!(EventType::Normal.to_string(), "Normal");
        assert_eq!(EventType::Warning.as_str(), "Warning");
    }
}
