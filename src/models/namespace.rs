use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConfigMap, Deployment, HealthStatus, Service};

/// Namespace limits. Only `pods` is enforced: it caps the number of deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceQuota {
    pub cpu: String,
    pub memory: String,
    pub storage: String,
    pub pods: u32,
}

impl Default for ResourceQuota {
    fn default() -> Self {
        Self {
            cpu: "4".to_string(),
            memory: "8Gi".to_string(),
            storage: "50Gi".to_string(),
            pods: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceUsage {
    pub deployments: u32,
    pub replicas: u64,
    pub cpu_millicores: u64,
    pub memory_mib: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub id: String,
    pub cluster_id: String,
    pub name: String,
    pub status: HealthStatus,
    pub labels: BTreeSet<String>,
    pub resource_quota: ResourceQuota,
    pub usage: NamespaceUsage,
    pub deployments: Vec<Deployment>,
    pub services: Vec<Service>,
    pub config_maps: Vec<ConfigMap>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Namespace {
    pub fn new(cluster_id: String, name: String, resource_quota: ResourceQuota) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            cluster_id,
            name,
            status: HealthStatus::Healthy,
            labels: BTreeSet::new(),
            resource_quota,
            usage: NamespaceUsage::default(),
            deployments: Vec::new(),
            services: Vec::new(),
            config_maps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deployment(&self, deployment_id: &str) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.id == deployment_id)
    }

    pub fn deployment_mut(&mut self, deployment_id: &str) -> Option<&mut Deployment> {
        self.deployments.iter_mut().find(|d| d.id == deployment_id)
    }

    pub fn has_quota_for_deployment(&self) -> bool {
        (self.deployments.len() as u64) < u64::from(self.resource_quota.pods)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
