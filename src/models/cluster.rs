use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{HealthStatus, Namespace, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    K8s,
    K3s,
    K0s,
    Openshift,
    Aks,
    Eks,
    Gke,
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::K8s
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Distribution::K8s => "k8s",
            Distribution::K3s => "k3s",
            Distribution::K0s => "k0s",
            Distribution::Openshift => "openshift",
            Distribution::Aks => "aks",
            Distribution::Eks => "eks",
            Distribution::Gke => "gke",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub control_plane_endpoint: String,
    pub pod_cidr: String,
    pub cni_provider: String,
    #[serde(default)]
    pub addons: Vec<String>,
}

/// Cluster-wide utilization. Percentages are left to the viewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMetrics {
    pub cpu_usage: u64,
    pub cpu_capacity: u64,
    pub memory_usage: u64,
    pub memory_capacity: u64,
    pub pod_count: u64,
    pub pod_capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub distribution: Distribution,
    pub version: String,
    pub status: HealthStatus,
    pub description: String,
    pub network: NetworkConfig,
    pub labels: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub nodes: Vec<Node>,
    pub namespaces: Vec<Namespace>,
    pub metrics: ClusterMetrics,
}

impl Cluster {
    pub fn new(name: String, distribution: Distribution, version: String, network: NetworkConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            distribution,
            version,
            status: HealthStatus::Healthy,
            description: String::new(),
            network,
            labels: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            nodes: Vec::new(),
            namespaces: Vec::new(),
            metrics: ClusterMetrics::default(),
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn namespace(&self, namespace_id: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.id == namespace_id)
    }

    pub fn namespace_mut(&mut self, namespace_id: &str) -> Option<&mut Namespace> {
        self.namespaces.iter_mut().find(|ns| ns.id == namespace_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
