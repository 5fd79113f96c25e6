use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::HealthStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub image: String,
    #[serde(default)]
    pub ports: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyType {
    RollingUpdate,
    Recreate,
}

impl Default for StrategyType {
    fn default() -> Self {
        StrategyType::RollingUpdate
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStrategy {
    #[serde(rename = "type")]
    pub strategy_type: StrategyType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub namespace_id: String,
    pub name: String,
    pub version: String,
    pub status: HealthStatus,
    pub replicas: u32,
    pub available_replicas: u32,
    pub containers: Vec<Container>,
    pub strategy: DeploymentStrategy,
    /// Scheduled pods per node id. Replicas beyond the sum are pending.
    #[serde(default)]
    pub placements: BTreeMap<String, u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deployment {
    pub fn new(
        namespace_id: String,
        name: String,
        version: String,
        replicas: u32,
        containers: Vec<Container>,
        strategy: DeploymentStrategy,
    ) -> Self {
        let now = Utc::now();
        let mut deployment = Self {
            id: Uuid::new_v4().to_string(),
            namespace_id,
            name,
            version,
            status: HealthStatus::Warning,
            replicas,
            available_replicas: 0,
            containers,
            strategy,
            placements: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        };
        deployment.refresh_status();
        deployment
    }

    pub fn scheduled_replicas(&self) -> u32 {
        self.placements.values().sum()
    }

    pub fn is_converged(&self) -> bool {
        self.available_replicas >= self.replicas
    }

    /// Warning while rolling out, Healthy once every replica is available.
    pub fn refresh_status(&mut self) {
        self.status = if self.is_converged() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Warning
        };
    }

    pub fn scale(&mut self, replicas: u32) {
        self.replicas = replicas;
        self.available_replicas = self.available_replicas.min(replicas);
        self.refresh_status();
        self.updated_at = Utc::now();
    }

    pub fn restart(&mut self) {
        self.available_replicas = self.replicas;
        self.refresh_status();
        self.updated_at = Utc::now();
    }

    /// Moves availability up to `step` replicas closer to the desired count.
    /// Returns whether anything changed.
    pub fn advance_rollout(&mut self, step: u32) -> bool {
        if self.is_converged() {
            return false;
        }
        let remaining = self.replicas - self.available_replicas;
        self.available_replicas += step.min(remaining);
        self.refresh_status();
        self.updated_at = Utc::now();
        true
    }
}
