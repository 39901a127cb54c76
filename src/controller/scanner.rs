//! Scanning owned workloads and grouping them by component
//!
//! Each entry of [`PROBE_TABLE`] names a workload kind, where to look for it
//! and how results are attributed. The table order is the evaluation order.

use std::collections::BTreeMap;

use kube::ResourceExt;
use tracing::{debug, error};

use crate::error::{Error, Result};

use super::client::{ResourceQuery, ResourceStore};
use super::workload::WorkloadKind;
use super::COMPONENT_LABEL;

/// Component name the CNI daemon sets are reported under
pub const CNI_COMPONENT: &str = "cni";

/// Component name -> not-ready flag
pub type ReadinessMap = BTreeMap<String, bool>;

/// Namespace a probe lists resources in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchScope {
    /// Namespace of the control plane, restricted to resources it owns
    Instance,
    /// Namespace the operator runs in, not restricted by owner
    Operator,
}

/// How listed resources map onto components
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribution {
    /// Use the component label of each resource
    ComponentLabel,
    /// Every resource counts towards one fixed component
    Fixed(&'static str),
}

/// One row of the probe table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeSpec {
    pub kind: WorkloadKind,
    pub scope: FetchScope,
    pub labels: &'static [(&'static str, &'static str)],
    pub attribution: Attribution,
    /// Only evaluated when CNI is enabled for the operator
    pub requires_cni: bool,
}

impl ProbeSpec {
    /// Build the listing request for this probe
    pub fn query(&self, instance_namespace: &str, operator_namespace: &str) -> ResourceQuery {
        let (namespace, owner) = match self.scope {
            FetchScope::Instance => (instance_namespace, Some(instance_namespace.to_string())),
            FetchScope::Operator => (operator_namespace, None),
        };
        ResourceQuery {
            kind: self.kind,
            namespace: namespace.to_string(),
            owner,
            labels: self
                .labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

pub const PROBE_TABLE: [ProbeSpec; 4] = [
    ProbeSpec {
        kind: WorkloadKind::Deployment,
        scope: FetchScope::Instance,
        labels: &[],
        attribution: Attribution::ComponentLabel,
        requires_cni: false,
    },
    ProbeSpec {
        kind: WorkloadKind::StatefulSet,
        scope: FetchScope::Instance,
        labels: &[],
        attribution: Attribution::ComponentLabel,
        requires_cni: false,
    },
    ProbeSpec {
        kind: WorkloadKind::DaemonSet,
        scope: FetchScope::Instance,
        labels: &[],
        attribution: Attribution::ComponentLabel,
        requires_cni: false,
    },
    ProbeSpec {
        kind: WorkloadKind::DaemonSet,
        scope: FetchScope::Operator,
        labels: &[("istio", "cni")],
        attribution: Attribution::Fixed(CNI_COMPONENT),
        requires_cni: true,
    },
];

/// List the resources for one probe and OR their not-ready flags into `state`
///
/// A listing failure is returned before anything is merged. Resources
/// without a component label are logged and skipped.
pub async fn scan(
    store: &dyn ResourceStore,
    probe: &ProbeSpec,
    query: &ResourceQuery,
    state: &mut ReadinessMap,
) -> Result<()> {
    let resources = store
        .list(query)
        .await
        .map_err(|e| Error::probe_fetch(probe.kind.as_str(), e))?;

    debug!(
        "Evaluating {} {} resources in {}",
        resources.len(),
        probe.kind,
        query.namespace
    );

    if let Attribution::Fixed(component) = probe.attribution {
        let not_ready = resources.iter().any(|r| !probe.kind.is_ready(r));
        let entry = state.entry(component.to_string()).or_insert(false);
        *entry = *entry || not_ready;
        return Ok(());
    }

    for resource in &resources {
        match resource.labels().get(COMPONENT_LABEL) {
            Some(component) => {
                let not_ready = !probe.kind.is_ready(resource);
                let entry = state.entry(component.clone()).or_insert(false);
                *entry = *entry || not_ready;
            }
            None => {
                error!(
                    "skipping {} {} for readiness check: resource has no component label",
                    probe.kind,
                    resource.name_any()
                );
            }
        }
    }

    Ok(())
}
