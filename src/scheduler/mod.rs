use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{Cluster, Deployment};

/// Free capacity and current load of one node, detached from the cluster so
/// deployments can be mutated while placing pods.
#[derive(Debug, Clone)]
struct NodeSlot {
    id: String,
    schedulable: bool,
    capacity: u64,
    load: u64,
}

/// Spreads deployment replicas across the nodes of a cluster.
///
/// New pods go to the least-loaded schedulable node with room left; pods that
/// fit nowhere stay pending. Shrinking removes pods from unschedulable nodes
/// first, then from the busiest node. Existing pods are never moved off a node
/// just because it was cordoned.
pub struct Scheduler {
    slots: Vec<NodeSlot>,
}

impl Scheduler {
    pub fn for_cluster(cluster: &Cluster) -> Self {
        let mut load: BTreeMap<&str, u64> = BTreeMap::new();
        for namespace in &cluster.namespaces {
            for deployment in &namespace.deployments {
                for (node_id, pods) in &deployment.placements {
                    *load.entry(node_id.as_str()).or_default() += u64::from(*pods);
                }
            }
        }

        let slots = cluster
            .nodes
            .iter()
            .map(|node| NodeSlot {
                id: node.id.clone(),
                schedulable: node.is_schedulable(),
                capacity: node.metrics.pod_capacity,
                load: load.get(node.id.as_str()).copied().unwrap_or(0),
            })
            .collect();

        Self { slots }
    }

    /// Brings `deployment.placements` in line with `deployment.replicas`.
    pub fn reconcile(&mut self, deployment: &mut Deployment) {
        // Placements on nodes that no longer exist are dropped.
        deployment
            .placements
            .retain(|node_id, _| self.slots.iter().any(|s| &s.id == node_id));

        while deployment.scheduled_replicas() > deployment.replicas {
            if !self.remove_one(deployment) {
                break;
            }
        }

        while deployment.scheduled_replicas() < deployment.replicas {
            let Some(slot) = self
                .slots
                .iter_mut()
                .filter(|s| s.schedulable && s.load < s.capacity)
                .min_by_key(|s| s.load)
            else {
                debug!(
                    "Deployment {} has {} pending pods: no schedulable capacity",
                    deployment.name,
                    deployment.replicas - deployment.scheduled_replicas()
                );
                break;
            };
            slot.load += 1;
            *deployment.placements.entry(slot.id.clone()).or_default() += 1;
        }
    }

    fn remove_one(&mut self, deployment: &mut Deployment) -> bool {
        let victim = deployment
            .placements
            .keys()
            .filter_map(|node_id| self.slots.iter().position(|s| &s.id == node_id))
            .max_by_key(|&i| (!self.slots[i].schedulable, self.slots[i].load));

        let Some(index) = victim else {
            return false;
        };
        let slot = &mut self.slots[index];
        slot.load = slot.load.saturating_sub(1);

        if let Some(pods) = deployment.placements.get_mut(&slot.id) {
            *pods -= 1;
            if *pods == 0 {
                deployment.placements.remove(&slot.id);
            }
        }
        true
    }
}

/// Reconciles the placements of every deployment in the cluster, in
/// namespace and deployment order.
pub fn schedule_cluster(cluster: &mut Cluster) {
    let mut scheduler = Scheduler::for_cluster(cluster);
    for namespace in cluster.namespaces.iter_mut() {
        for deployment in namespace.deployments.iter_mut() {
            scheduler.reconcile(deployment);
        }
    }
}
