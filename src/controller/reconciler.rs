//! Main reconciler for ServiceMeshControlPlane resources
//!
//! Implements the controller pattern using kube-rs runtime. Each reconcile
//! runs one readiness pass; retries are left to the requeue policy.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use kube::{
    api::Api,
    client::Client,
    runtime::{
        controller::{Action, Controller},
        watcher::Config,
    },
    ResourceExt,
};
use tracing::{error, info, instrument};

use crate::crd::{ConditionStatus, ServiceMeshControlPlane};
use crate::error::{Error, Result};

use super::client::{KubeEventRecorder, KubeResourceStore, KubeStatusStore};
use super::readiness::{ReadinessEngine, ReadinessOptions};

#[cfg(feature = "metrics")]
const CONTROLLER_NAME: &str = "servicemeshcontrolplane";

/// Shared state for the controller
pub struct ControllerState {
    pub client: Client,
    pub readiness: ReadinessEngine,
}

impl ControllerState {
    /// Wire the readiness engine to the Kubernetes API
    pub fn new(client: Client, options: ReadinessOptions) -> Self {
        let readiness = ReadinessEngine::new(
            Arc::new(KubeResourceStore::new(client.clone())),
            Arc::new(KubeStatusStore::new(client.clone())),
            Arc::new(KubeEventRecorder::new(client.clone())),
            options,
        );
        Self { client, readiness }
    }
}

/// Main entry point to start the controller
pub async fn run_controller(state: Arc<ControllerState>) -> Result<()> {
    let client = state.client.clone();
    let control_planes: Api<ServiceMeshControlPlane> = Api::all(client.clone());

    info!("Starting ServiceMeshControlPlane controller");

    // Verify CRD exists
    match control_planes.list(&Default::default()).await {
        Ok(_) => info!("ServiceMeshControlPlane CRD is available"),
        Err(e) => {
            error!(
                "ServiceMeshControlPlane CRD not found. Please install the CRD first: {:?}",
                e
            );
            return Err(Error::ConfigError(
                "ServiceMeshControlPlane CRD not installed".to_string(),
            ));
        }
    }

    Controller::new(control_planes, Config::default())
        // Watch owned workloads so readiness changes trigger a pass
        .owns::<Deployment>(Api::all(client.clone()), Config::default())
        .owns::<StatefulSet>(Api::all(client.clone()), Config::default())
        .owns::<DaemonSet>(Api::all(client.clone()), Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, state)
        .for_each(|res| async move {
            match res {
                Ok(obj) => info!("Reconciled: {:?}", obj),
                Err(e) => error!("Reconcile error: {:?}", e),
            }
        })
        .await;

    Ok(())
}

/// The main reconciliation function
///
/// This function is called whenever:
/// - A ServiceMeshControlPlane is created or updated
/// - An owned Deployment, StatefulSet or DaemonSet changes
/// - The requeue timer expires
#[instrument(skip(ctx), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile(obj: Arc<ServiceMeshControlPlane>, ctx: Arc<ControllerState>) -> Result<Action> {
    #[cfg(feature = "metrics")]
    let started = std::time::Instant::now();

    let mut instance = (*obj).clone();
    let result = ctx.readiness.update_readiness(&mut instance).await;

    #[cfg(feature = "metrics")]
    {
        super::metrics::observe_reconcile_duration_seconds(
            CONTROLLER_NAME,
            started.elapsed().as_secs_f64(),
        );
        if let Err(e) = &result {
            super::metrics::inc_reconcile_error(CONTROLLER_NAME, e.kind());
        }
    }

    result?;

    let ready = instance
        .status
        .as_ref()
        .and_then(|s| s.ready_status())
        .map(|s| s == ConditionStatus::True)
        .unwrap_or(false);

    Ok(Action::requeue(requeue_interval(ready)))
}

/// How long to wait before the next pass
fn requeue_interval(ready: bool) -> Duration {
    if ready {
        // Check less frequently when ready
        Duration::from_secs(60)
    } else {
        Duration::from_secs(15)
    }
}

/// Error policy determines how to handle reconciliation errors
fn error_policy(
    instance: Arc<ServiceMeshControlPlane>,
    error: &Error,
    _ctx: Arc<ControllerState>,
) -> Action {
    error!(
        "Reconciliation error for {}: {:?}",
        instance.name_any(),
        error
    );
    Action::requeue(retry_interval(error))
}

fn retry_interval(error: &Error) -> Duration {
    // Use shorter retry for retriable errors
    if error.is_retriable() {
        Duration::from_secs(15)
    } else {
        Duration::from_secs(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requeue_interval_backs_off_when_ready() {
        assert_eq!(requeue_interval(true), Duration::from_secs(60));
        assert_eq!(requeue_interval(false), Duration::from_secs(15));
    }

    #[test]
    fn test_retry_interval_by_error_kind() {
        let probe = Error::probe_fetch("Deployment", Error::StoreError("timeout".to_string()));
        let config = Error::ConfigError("missing namespace".to_string());

        assert_eq!(retry_interval(&probe), Duration::from_secs(15));
        assert_eq!(retry_interval(&config), Duration::from_secs(60));
    }
}
