//! Readiness reconciliation for a ServiceMeshControlPlane
//!
//! One pass runs the aggregation, folds it into the Ready condition, records
//! the resulting event and writes the status at most once.

use std::sync::Arc;

use kube::ResourceExt;
use tracing::{error, info, instrument};

use crate::crd::ServiceMeshControlPlane;
use crate::error::{Error, Result};

use super::aggregator::calculate_not_ready_state;
use super::client::{EventRecorder, ResourceStore, StatusStore};
use super::transition::update_readiness_status;

/// Operator-wide inputs to a readiness pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadinessOptions {
    /// Whether the CNI daemon sets are part of the control plane
    pub cni_enabled: bool,
    /// Namespace the operator and the CNI daemon sets run in
    pub operator_namespace: String,
    /// Never write status, only compute it
    pub skip_status_update: bool,
}

impl Default for ReadinessOptions {
    fn default() -> Self {
        Self {
            cni_enabled: false,
            operator_namespace: "default".to_string(),
            skip_status_update: false,
        }
    }
}

/// Computes and publishes the Ready condition of control planes
pub struct ReadinessEngine {
    resources: Arc<dyn ResourceStore>,
    status: Arc<dyn StatusStore>,
    events: Arc<dyn EventRecorder>,
    options: ReadinessOptions,
}

impl ReadinessEngine {
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        status: Arc<dyn StatusStore>,
        events: Arc<dyn EventRecorder>,
        options: ReadinessOptions,
    ) -> Self {
        Self {
            resources,
            status,
            events,
            options,
        }
    }

    pub fn options(&self) -> &ReadinessOptions {
        &self.options
    }

    fn skip_status_update(&self, instance: &ServiceMeshControlPlane) -> bool {
        self.options.skip_status_update || instance.metadata.deletion_timestamp.is_some()
    }

    /// Run one readiness pass for `instance`
    ///
    /// `instance.status` is updated in place. A probe error takes precedence
    /// over a failure to persist the status; the latter is then only logged.
    #[instrument(skip(self, instance), fields(name = %instance.name_any(), namespace = instance.namespace()))]
    pub async fn update_readiness(&self, instance: &mut ServiceMeshControlPlane) -> Result<()> {
        let namespace = instance.namespace().unwrap_or_else(|| "default".to_string());
        let name = instance.name_any();
        info!(
            "Updating ServiceMeshControlPlane readiness state for {}/{}",
            namespace, name
        );

        let aggregate = calculate_not_ready_state(
            self.resources.as_ref(),
            &namespace,
            &self.options.operator_namespace,
            self.options.cni_enabled,
        )
        .await;

        #[cfg(feature = "metrics")]
        record_metrics(&namespace, &name, &aggregate);

        let status = instance.status.get_or_insert_with(Default::default);
        #[cfg(feature = "metrics")]
        let previous = status.ready_status();
        let outcome = update_readiness_status(status, aggregate);

        #[cfg(feature = "metrics")]
        if let Some(ready) = status.ready_status().filter(|s| Some(*s) != previous) {
            super::metrics::inc_ready_transition(&namespace, &name, ready.as_str());
        }

        if let Some(notification) = &outcome.notification {
            self.events
                .event(
                    instance,
                    notification.event_type,
                    notification.reason,
                    &notification.message,
                )
                .await;
        }

        if outcome.should_persist && !self.skip_status_update(instance) {
            if let Err(status_err) = self.status.post_status(instance).await {
                let status_err = Error::persistence(status_err);
                match outcome.error {
                    None => return Err(status_err),
                    Some(_) => error!("Error updating status: {}", status_err),
                }
            }
        }

        match outcome.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// The unready gauge keeps its last value while probes fail
#[cfg(feature = "metrics")]
fn record_metrics(namespace: &str, name: &str, aggregate: &super::aggregator::AggregateOutcome) {
    if aggregate.error.is_some() {
        super::metrics::inc_probe_error(namespace, name);
    } else {
        super::metrics::set_unready_components(
            namespace,
            name,
            aggregate.unready_components().len() as i64,
        );
    }
}
