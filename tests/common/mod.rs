// Common test utilities and helpers
#![allow(dead_code)]

use kubeboard::config::EngineConfig;
use kubeboard::controllers::action::*;
use kubeboard::models::{Container, Deployment, Distribution, ResourceQuota};
use kubeboard::{ActionRequest, ActionResponse, Storage};

pub struct Fixture {
    pub storage: Storage,
    pub cluster_id: String,
    pub namespace_id: String,
}

pub fn storage() -> Storage {
    Storage::new(EngineConfig::default())
}

pub fn create_cluster(storage: &Storage, name: &str) -> String {
    let response = storage.execute_action(ActionRequest::CreateCluster(CreateClusterPayload {
        name: name.to_string(),
        distribution: Distribution::K3s,
        version: Some("v1.30.5".to_string()),
        ..CreateClusterPayload::default()
    }));
    assert!(response.success, "cluster creation failed: {}", response.message);
    let state = storage.get_state();
    state.clusters.last().expect("cluster was created").id.clone()
}

pub fn create_namespace(storage: &Storage, cluster_id: &str, name: &str, pods: u32) -> String {
    let response = storage.execute_action(ActionRequest::CreateNamespace(CreateNamespacePayload {
        cluster_id: cluster_id.to_string(),
        name: name.to_string(),
        resource_quota: Some(ResourceQuota { pods, ..ResourceQuota::default() }),
        ..CreateNamespacePayload::default()
    }));
    assert!(response.success, "namespace creation failed: {}", response.message);
    storage
        .get_state()
        .cluster(cluster_id)
        .and_then(|c| c.namespaces.iter().find(|ns| ns.name == name))
        .expect("namespace was created")
        .id
        .clone()
}

pub fn create_deployment(
    storage: &Storage,
    cluster_id: &str,
    namespace_id: &str,
    name: &str,
    replicas: i64,
) -> ActionResponse {
    storage.execute_action(ActionRequest::CreateDeployment(CreateDeploymentPayload {
        cluster_id: cluster_id.to_string(),
        namespace_id: namespace_id.to_string(),
        name: name.to_string(),
        replicas,
        containers: vec![Container { image: format!("registry.local/{}:1.0", name), ports: vec![8080] }],
        ..CreateDeploymentPayload::default()
    }))
}

pub fn find_deployment(storage: &Storage, cluster_id: &str, namespace_id: &str, name: &str) -> Option<Deployment> {
    storage
        .get_state()
        .cluster(cluster_id)
        .and_then(|c| c.namespace(namespace_id))
        .and_then(|ns| ns.deployments.iter().find(|d| d.name == name).cloned())
}

pub fn deployment_ref(cluster_id: &str, namespace_id: &str, deployment_id: &str) -> DeploymentRef {
    DeploymentRef {
        cluster_id: cluster_id.to_string(),
        namespace_id: namespace_id.to_string(),
        deployment_id: deployment_id.to_string(),
    }
}

/// Cluster "edge-1" with namespace "prod" limited to `pods` deployments.
pub fn fixture(pods: u32) -> Fixture {
    let storage = storage();
    let cluster_id = create_cluster(&storage, "edge-1");
    let namespace_id = create_namespace(&storage, &cluster_id, "prod", pods);
    Fixture {
        storage,
        cluster_id,
        namespace_id,
    }
}
