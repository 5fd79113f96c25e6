//! Error taxonomy for the control-plane engine.
//!
//! Every variant is recoverable and reported to the caller as a structured
//! failure; none of them is fatal to the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    /// Unknown cluster, namespace, deployment or node id
    #[error("{0}")]
    NotFound(String),

    /// Malformed or out-of-range input
    #[error("{0}")]
    InvalidArgument(String),

    /// Duplicate name within a scope
    #[error("{0}")]
    Conflict(String),

    /// Namespace deployment quota is exhausted
    #[error("{0}")]
    QuotaExceeded(String),
}

/// Stable machine-readable code, serialized as `NOT_FOUND` etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    QuotaExceeded,
}

impl ControlPlaneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControlPlaneError::NotFound(_) => ErrorKind::NotFound,
            ControlPlaneError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ControlPlaneError::Conflict(_) => ErrorKind::Conflict,
            ControlPlaneError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
        }
    }

    pub fn cluster_not_found(cluster_id: &str) -> Self {
        ControlPlaneError::NotFound(format!("Cluster '{}' not found", cluster_id))
    }

    pub fn namespace_not_found(namespace_id: &str) -> Self {
        ControlPlaneError::NotFound(format!("Namespace '{}' not found", namespace_id))
    }

    pub fn deployment_not_found(deployment_id: &str) -> Self {
        ControlPlaneError::NotFound(format!("Deployment '{}' not found", deployment_id))
    }

    pub fn node_not_found(node_id: &str) -> Self {
        ControlPlaneError::NotFound(format!("Node '{}' not found", node_id))
    }
}

pub type ControlPlaneResult<T> = std::result::Result<T, ControlPlaneError>;
