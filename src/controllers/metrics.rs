//! Derived utilization figures.
//!
//! [`recompute`] is a pure function of the cluster it is given: node usage is
//! estimated from scheduled pods, namespace usage from deployment replicas, and
//! cluster totals from both. Nothing is carried over between calls.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{Cluster, ClusterMetrics, NamespaceUsage, Node, NodeRole};

pub const POD_CPU_MILLICORES: u64 = 100;
pub const POD_MEMORY_MIB: u64 = 128;

const WORKER_OVERHEAD_CPU: u64 = 250;
const WORKER_OVERHEAD_MEMORY: u64 = 512;
const CONTROL_PLANE_OVERHEAD_CPU: u64 = 500;
const CONTROL_PLANE_OVERHEAD_MEMORY: u64 = 1024;

pub fn recompute(cluster: &mut Cluster) {
    let mut scheduled: BTreeMap<String, u64> = BTreeMap::new();
    let mut pod_count = 0u64;

    for namespace in cluster.namespaces.iter_mut() {
        let mut usage = NamespaceUsage::default();
        for deployment in &namespace.deployments {
            usage.deployments += 1;
            usage.replicas += u64::from(deployment.replicas);
            for (node_id, pods) in &deployment.placements {
                *scheduled.entry(node_id.clone()).or_default() += u64::from(*pods);
            }
        }
        usage.cpu_millicores = usage.replicas * POD_CPU_MILLICORES;
        usage.memory_mib = usage.replicas * POD_MEMORY_MIB;
        pod_count += usage.replicas;
        namespace.usage = usage;
    }

    let mut totals = ClusterMetrics {
        pod_count,
        ..ClusterMetrics::default()
    };

    for node in cluster.nodes.iter_mut() {
        let pods = scheduled.get(&node.id).copied().unwrap_or(0);
        apply_node_usage(node, pods);

        totals.cpu_usage += node.metrics.cpu_usage;
        totals.cpu_capacity += node.metrics.cpu_capacity;
        totals.memory_usage += node.metrics.memory_usage;
        totals.memory_capacity += node.metrics.memory_capacity;
        totals.pod_capacity += node.metrics.pod_capacity;
    }

    debug!(
        cluster = %cluster.name,
        cpu_usage = totals.cpu_usage,
        memory_usage = totals.memory_usage,
        pod_count = totals.pod_count,
        "Recomputed cluster metrics"
    );
    cluster.metrics = totals;
}

fn apply_node_usage(node: &mut Node, pods: u64) {
    let (cpu_overhead, memory_overhead) = match node.role {
        NodeRole::ControlPlane => (CONTROL_PLANE_OVERHEAD_CPU, CONTROL_PLANE_OVERHEAD_MEMORY),
        NodeRole::Worker => (WORKER_OVERHEAD_CPU, WORKER_OVERHEAD_MEMORY),
    };

    let metrics = &mut node.metrics;
    metrics.pod_count = pods;
    metrics.cpu_usage = (cpu_overhead + pods * POD_CPU_MILLICORES).min(metrics.cpu_capacity);
    metrics.memory_usage = (memory_overhead + pods * POD_MEMORY_MIB).min(metrics.memory_capacity);
}
