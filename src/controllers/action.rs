use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ControlPlaneError, ControlPlaneResult, ErrorKind};
use crate::models::{Container, DeploymentStrategy, Distribution, PlatformState, ResourceQuota};

/// Inbound mutating command: `{ "action": "<kind>", "payload": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum ActionRequest {
    CreateCluster(CreateClusterPayload),
    DeleteCluster(ClusterRef),
    CreateNamespace(CreateNamespacePayload),
    DeleteNamespace(NamespaceRef),
    CreateDeployment(CreateDeploymentPayload),
    ScaleDeployment(ScaleDeploymentPayload),
    RestartDeployment(DeploymentRef),
    DeleteDeployment(DeploymentRef),
    CreateService(CreateServicePayload),
    CreateConfigMap(CreateConfigMapPayload),
    CordonNode(NodeRef),
    UncordonNode(NodeRef),
}

impl ActionRequest {
    /// Decodes a raw request. Shape errors surface as `InvalidArgument`.
    pub fn from_json(value: Value) -> ControlPlaneResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ControlPlaneError::InvalidArgument(format!("Invalid action request: {}", e)))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ActionRequest::CreateCluster(_) => "createCluster",
            ActionRequest::DeleteCluster(_) => "deleteCluster",
            ActionRequest::CreateNamespace(_) => "createNamespace",
            ActionRequest::DeleteNamespace(_) => "deleteNamespace",
            ActionRequest::CreateDeployment(_) => "createDeployment",
            ActionRequest::ScaleDeployment(_) => "scaleDeployment",
            ActionRequest::RestartDeployment(_) => "restartDeployment",
            ActionRequest::DeleteDeployment(_) => "deleteDeployment",
            ActionRequest::CreateService(_) => "createService",
            ActionRequest::CreateConfigMap(_) => "createConfigMap",
            ActionRequest::CordonNode(_) => "cordonNode",
            ActionRequest::UncordonNode(_) => "uncordonNode",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub distribution: Distribution,
    pub version: Option<String>,
    pub description: Option<String>,
    pub control_plane_endpoint: Option<String>,
    pub pod_cidr: Option<String>,
    pub cni_provider: Option<String>,
    #[serde(default)]
    pub addons: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub worker_nodes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRef {
    #[serde(default)]
    pub cluster_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNamespacePayload {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub resource_quota: Option<ResourceQuota>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRef {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub namespace_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentPayload {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default)]
    pub name: String,
    pub version: Option<String>,
    #[serde(default = "default_replicas")]
    pub replicas: i64,
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub strategy: DeploymentStrategy,
}

fn default_replicas() -> i64 {
    1
}

impl Default for CreateDeploymentPayload {
    fn default() -> Self {
        Self {
            cluster_id: String::new(),
            namespace_id: String::new(),
            name: String::new(),
            version: None,
            replicas: default_replicas(),
            containers: Vec::new(),
            strategy: DeploymentStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRef {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default)]
    pub deployment_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleDeploymentPayload {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default)]
    pub deployment_id: String,
    pub replicas: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePayload {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default)]
    pub name: String,
    pub service_type: Option<String>,
    pub port: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfigMapPayload {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub node_id: String,
}

/// Outbound result of a write: `{ success, message, error?, state? }`.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Arc<PlatformState>>,
}

impl ActionResponse {
    pub fn accepted(message: String, state: Arc<PlatformState>) -> Self {
        Self {
            success: true,
            message,
            error: None,
            state: Some(state),
        }
    }

    pub fn rejected(err: &ControlPlaneError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            error: Some(err.kind()),
            state: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_scale_request() {
        let request = ActionRequest::from_json(json!({
            "action": "scaleDeployment",
            "payload": {
                "clusterId": "c1",
                "namespaceId": "n1",
                "deploymentId": "d1",
                "replicas": 5
            }
        }))
        .unwrap();

        match request {
            ActionRequest::ScaleDeployment(p) => {
                assert_eq!(p.deployment_id, "d1");
                assert_eq!(p.replicas, 5);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_decode_create_cluster_defaults() {
        let request = ActionRequest::from_json(json!({
            "action": "createCluster",
            "payload": { "name": "edge-1", "distribution": "k3s" }
        }))
        .unwrap();
        assert_eq!(request.kind(), "createCluster");

        if let ActionRequest::CreateCluster(p) = request {
            assert_eq!(p.distribution, Distribution::K3s);
            assert!(p.version.is_none());
            assert!(p.labels.is_empty());
        }
    }

    #[test]
    fn test_unknown_action_is_invalid_argument() {
        let err = ActionRequest::from_json(json!({ "action": "explode", "payload": {} })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_missing_scale_target_is_invalid_argument() {
        let err = ActionRequest::from_json(json!({
            "action": "scaleDeployment",
            "payload": { "clusterId": "c1", "namespaceId": "n1", "deploymentId": "d1" }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_rejected_response_has_no_state() {
        let err = ControlPlaneError::QuotaExceeded("full".to_string());
        let response = serde_json::to_value(ActionResponse::rejected(&err)).unwrap();
        assert_eq!(response["success"], false);
        assert_eq!(response["error"], "QUOTA_EXCEEDED");
        assert!(response.get("state").is_none());
    }
}
