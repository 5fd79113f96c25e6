pub mod cluster;
pub mod deployment;
pub mod event;
pub mod namespace;
pub mod node;
pub mod service;
pub mod state;

use serde::{Deserialize, Serialize};

pub use cluster::{Cluster, ClusterMetrics, Distribution, NetworkConfig};
pub use deployment::{Container, Deployment, DeploymentStrategy, StrategyType};
pub use event::{Event, EventLevel};
pub use namespace::{Namespace, NamespaceUsage, ResourceQuota};
pub use node::{Node, NodeMetrics, NodeRole};
pub use service::{ConfigMap, Service};
pub use state::PlatformState;

/// Health reported for clusters, nodes, namespaces and deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Degraded,
    Critical,
    Unknown,
}

impl Default for HealthStatus {
    fn default() -> Self {
        HealthStatus::Healthy
    }
}
