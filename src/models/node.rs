use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::HealthStatus;

pub const UNSCHEDULABLE_TAINT: &str = "node.kubernetes.io/unschedulable:NoSchedule";
pub const CONTROL_PLANE_TAINT: &str = "node-role.kubernetes.io/control-plane:NoSchedule";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    ControlPlane,
    Worker,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    /// Millicores.
    pub cpu_usage: u64,
    pub cpu_capacity: u64,
    /// MiB.
    pub memory_usage: u64,
    pub memory_capacity: u64,
    pub pod_count: u64,
    pub pod_capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub role: NodeRole,
    pub status: HealthStatus,
    pub internal_ip: String,
    pub operating_system: String,
    pub taints: BTreeSet<String>,
    pub metrics: NodeMetrics,
}

impl Node {
    pub fn new(name: String, role: NodeRole, internal_ip: String) -> Self {
        let mut taints = BTreeSet::new();
        if role == NodeRole::ControlPlane {
            taints.insert(CONTROL_PLANE_TAINT.to_string());
        }

        Self {
            id: Uuid::new_v4().to_string(),
            name,
            role,
            status: HealthStatus::Healthy,
            internal_ip,
            operating_system: "Ubuntu 22.04 LTS".to_string(),
            taints,
            metrics: NodeMetrics {
                cpu_capacity: 4000,
                memory_capacity: 16384,
                pod_capacity: 110,
                ..NodeMetrics::default()
            },
        }
    }

    pub fn is_cordoned(&self) -> bool {
        self.taints.contains(UNSCHEDULABLE_TAINT)
    }

    /// Any `NoSchedule` taint keeps new pods off the node.
    pub fn is_schedulable(&self) -> bool {
        !self.taints.iter().any(|t| t.ends_with(":NoSchedule"))
    }
}
