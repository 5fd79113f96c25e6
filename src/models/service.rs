use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub namespace_id: String,
    pub name: String,
    pub service_type: String,
    pub port: u32,
    pub created_at: DateTime<Utc>,
}

impl Service {
    pub fn new(namespace_id: String, name: String, service_type: String, port: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            namespace_id,
            name,
            service_type,
            port,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    pub id: String,
    pub namespace_id: String,
    pub name: String,
    pub data: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl ConfigMap {
    pub fn new(namespace_id: String, name: String, data: BTreeMap<String, String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            namespace_id,
            name,
            data,
            created_at: Utc::now(),
        }
    }
}
