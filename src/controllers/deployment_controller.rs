use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::models::{Event, PlatformState};
use crate::Storage;

/// Simulated rollout convergence.
///
/// Each tick moves every unconverged deployment up to `step` replicas closer
/// to its desired count. Returns the next state and the number of deployments
/// that progressed, or `None` when everything is already converged.
pub fn advance_rollouts(state: &PlatformState, step: u32) -> Option<(PlatformState, usize)> {
    let step = step.max(1);
    let pending = state
        .clusters
        .iter()
        .flat_map(|c| c.namespaces.iter())
        .flat_map(|ns| ns.deployments.iter())
        .any(|d| !d.is_converged());
    if !pending {
        return None;
    }

    let mut next = state.clone();
    let mut events = Vec::new();
    let mut total = 0;

    for cluster in next.clusters.iter_mut() {
        let mut progressed = Vec::new();
        for namespace in cluster.namespaces.iter_mut() {
            for deployment in namespace.deployments.iter_mut() {
                if deployment.advance_rollout(step) {
                    debug!(
                        "Deployment {}/{} now has {}/{} replicas available",
                        namespace.name, deployment.name, deployment.available_replicas, deployment.replicas
                    );
                    progressed.push(format!(
                        "{}/{} ({}/{})",
                        namespace.name, deployment.name, deployment.available_replicas, deployment.replicas
                    ));
                }
            }
        }

        if !progressed.is_empty() {
            total += progressed.len();
            let message = format!("Rollout progressed in cluster '{}': {}", cluster.name, progressed.join(", "));
            events.push(Event::info("deployment-controller", message).with_cluster(&cluster.id));
        }
    }

    for event in events {
        next.events.append(event);
    }
    Some((next, total))
}

/// Drives [`Storage::reconcile`] on a fixed interval.
pub struct DeploymentController {
    storage: Storage,
    interval: Duration,
}

impl DeploymentController {
    pub fn new(storage: Storage, interval: Duration) -> Self {
        Self { storage, interval }
    }

    pub async fn run(&self) {
        info!("Starting deployment controller (interval {:?})", self.interval);

        loop {
            sleep(self.interval).await;
            let progressed = self.storage.reconcile();
            if progressed > 0 {
                debug!("Deployment controller advanced {} rollouts", progressed);
            }
        }
    }
}
