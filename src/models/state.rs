use serde::Serialize;

use super::Cluster;
use crate::storage::AuditLog;

/// Aggregate root. Everything else is reached through `clusters`.
///
/// Outbound only; the engine never reads a state document back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformState {
    pub clusters: Vec<Cluster>,
    pub events: AuditLog,
}

impl PlatformState {
    pub fn new(audit_capacity: usize) -> Self {
        Self {
            clusters: Vec::new(),
            events: AuditLog::with_capacity(audit_capacity),
        }
    }

    pub fn cluster(&self, cluster_id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == cluster_id)
    }

    pub fn cluster_mut(&mut self, cluster_id: &str) -> Option<&mut Cluster> {
        self.clusters.iter_mut().find(|c| c.id == cluster_id)
    }
}
