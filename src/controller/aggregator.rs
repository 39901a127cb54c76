//! Aggregating workload readiness across all probed kinds

use tracing::debug;

use crate::error::Error;

use super::client::ResourceStore;
use super::scanner::{scan, Attribution, ReadinessMap, PROBE_TABLE};

/// Result of one aggregation pass
///
/// When `error` is set the map is partial: kinds after the failing one
/// were not evaluated.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub not_ready: ReadinessMap,
    pub error: Option<Error>,
}

impl AggregateOutcome {
    /// Components flagged not ready, sorted by name
    pub fn unready_components(&self) -> Vec<String> {
        self.not_ready
            .iter()
            .filter(|(_, not_ready)| **not_ready)
            .map(|(component, _)| component.clone())
            .collect()
    }
}

/// Evaluate every row of the probe table in order, stopping at the first failure
///
/// The map is rebuilt from scratch on every call. Probes that require CNI
/// contribute a ready entry when CNI is disabled, and a not-ready entry when
/// their listing fails.
pub async fn calculate_not_ready_state(
    store: &dyn ResourceStore,
    instance_namespace: &str,
    operator_namespace: &str,
    cni_enabled: bool,
) -> AggregateOutcome {
    let mut not_ready = ReadinessMap::new();

    for probe in PROBE_TABLE.iter() {
        if probe.requires_cni && !cni_enabled {
            if let Attribution::Fixed(component) = probe.attribution {
                not_ready.entry(component.to_string()).or_insert(false);
            }
            continue;
        }

        let query = probe.query(instance_namespace, operator_namespace);
        if let Err(e) = scan(store, probe, &query, &mut not_ready).await {
            debug!("Readiness probe stopped at {}: {}", probe.kind, e);
            // A fixed component that could not be listed counts as not ready
            if let Attribution::Fixed(component) = probe.attribution {
                not_ready.insert(component.to_string(), true);
            }
            return AggregateOutcome {
                not_ready,
                error: Some(e),
            };
        }
    }

    AggregateOutcome {
        not_ready,
        error: None,
    }
}
