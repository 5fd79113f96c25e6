//! Precondition checks for every action.
//!
//! All functions here are pure predicates over a [`PlatformState`] snapshot.
//! The executor runs them to completion before it touches any state.

use crate::controllers::action::*;
use crate::error::{ControlPlaneError, ControlPlaneResult};
use crate::models::{Cluster, Container, Deployment, Namespace, Node, PlatformState, ResourceQuota};

pub const MAX_NAME_LENGTH: usize = 253;
pub const MAX_RESOURCE_NAME_LENGTH: usize = 63;
pub const MAX_WORKER_NODES: u32 = 50;
pub const MAX_REPLICAS: i64 = 10_000;

pub fn validate(state: &PlatformState, request: &ActionRequest) -> ControlPlaneResult<()> {
    match request {
        ActionRequest::CreateCluster(p) => validate_create_cluster(p),
        ActionRequest::DeleteCluster(p) => find_cluster(state, &p.cluster_id).map(|_| ()),
        ActionRequest::CreateNamespace(p) => validate_create_namespace(state, p),
        ActionRequest::DeleteNamespace(p) => find_namespace(state, &p.cluster_id, &p.namespace_id).map(|_| ()),
        ActionRequest::CreateDeployment(p) => validate_create_deployment(state, p),
        ActionRequest::ScaleDeployment(p) => {
            find_deployment(state, &p.cluster_id, &p.namespace_id, &p.deployment_id)?;
            validate_replicas(p.replicas)
        }
        ActionRequest::RestartDeployment(p) | ActionRequest::DeleteDeployment(p) => {
            find_deployment(state, &p.cluster_id, &p.namespace_id, &p.deployment_id).map(|_| ())
        }
        ActionRequest::CreateService(p) => validate_create_service(state, p),
        ActionRequest::CreateConfigMap(p) => validate_create_config_map(state, p),
        ActionRequest::CordonNode(p) | ActionRequest::UncordonNode(p) => {
            find_node(state, &p.cluster_id, &p.node_id).map(|_| ())
        }
    }
}

/// Lookups reject blank ids as `InvalidArgument` before searching.
pub fn find_cluster<'a>(state: &'a PlatformState, cluster_id: &str) -> ControlPlaneResult<&'a Cluster> {
    validate_required("Cluster id", cluster_id)?;
    state
        .cluster(cluster_id)
        .ok_or_else(|| ControlPlaneError::cluster_not_found(cluster_id))
}

pub fn find_namespace<'a>(
    state: &'a PlatformState,
    cluster_id: &str,
    namespace_id: &str,
) -> ControlPlaneResult<&'a Namespace> {
    let cluster = find_cluster(state, cluster_id)?;
    validate_required("Namespace id", namespace_id)?;
    cluster
        .namespace(namespace_id)
        .ok_or_else(|| ControlPlaneError::namespace_not_found(namespace_id))
}

pub fn find_deployment<'a>(
    state: &'a PlatformState,
    cluster_id: &str,
    namespace_id: &str,
    deployment_id: &str,
) -> ControlPlaneResult<&'a Deployment> {
    let namespace = find_namespace(state, cluster_id, namespace_id)?;
    validate_required("Deployment id", deployment_id)?;
    namespace
        .deployment(deployment_id)
        .ok_or_else(|| ControlPlaneError::deployment_not_found(deployment_id))
}

pub fn find_node<'a>(state: &'a PlatformState, cluster_id: &str, node_id: &str) -> ControlPlaneResult<&'a Node> {
    let cluster = find_cluster(state, cluster_id)?;
    validate_required("Node id", node_id)?;
    cluster
        .node(node_id)
        .ok_or_else(|| ControlPlaneError::node_not_found(node_id))
}

pub fn validate_required(field: &str, value: &str) -> ControlPlaneResult<()> {
    if value.trim().is_empty() {
        return Err(ControlPlaneError::InvalidArgument(format!("{} is required", field)));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ControlPlaneError::InvalidArgument(format!(
            "{} too long (max {} characters)",
            field, MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Namespace, deployment, service and config map names follow the
/// RFC 1123 label rules: lowercase alphanumerics and '-', alphanumeric at
/// both ends, at most 63 characters.
pub fn validate_resource_name(field: &str, name: &str) -> ControlPlaneResult<()> {
    validate_required(field, name)?;

    if name.len() > MAX_RESOURCE_NAME_LENGTH {
        return Err(ControlPlaneError::InvalidArgument(format!(
            "{} too long (max {} characters)",
            field, MAX_RESOURCE_NAME_LENGTH
        )));
    }

    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_edges = !name.starts_with('-') && !name.ends_with('-');
    if !valid_chars || !valid_edges {
        return Err(ControlPlaneError::InvalidArgument(format!(
            "{} '{}' must consist of lowercase alphanumeric characters or '-', and start and end with an alphanumeric character",
            field, name
        )));
    }
    Ok(())
}

pub fn validate_labels(labels: &[String]) -> ControlPlaneResult<()> {
    for label in labels {
        match label.split_once('=') {
            Some((key, _)) if !key.trim().is_empty() => {}
            _ => {
                return Err(ControlPlaneError::InvalidArgument(format!(
                    "Label '{}' must have the form key=value",
                    label
                )))
            }
        }
    }
    Ok(())
}

pub fn validate_replicas(replicas: i64) -> ControlPlaneResult<()> {
    if replicas < 0 {
        return Err(ControlPlaneError::InvalidArgument(format!(
            "Replicas must be a non-negative integer, got {}",
            replicas
        )));
    }
    if replicas > MAX_REPLICAS {
        return Err(ControlPlaneError::InvalidArgument(format!(
            "Replicas must not exceed {}, got {}",
            MAX_REPLICAS, replicas
        )));
    }
    Ok(())
}

pub fn validate_port(port: u32) -> ControlPlaneResult<()> {
    if port == 0 || port > 65535 {
        return Err(ControlPlaneError::InvalidArgument(format!(
            "Port must be between 1 and 65535, got {}",
            port
        )));
    }
    Ok(())
}

pub fn validate_quota(quota: &ResourceQuota) -> ControlPlaneResult<()> {
    if quota.pods == 0 {
        return Err(ControlPlaneError::InvalidArgument(
            "Resource quota pods must be at least 1".to_string(),
        ));
    }
    validate_required("Quota cpu", &quota.cpu)?;
    validate_required("Quota memory", &quota.memory)?;
    validate_required("Quota storage", &quota.storage)
}

pub fn validate_containers(containers: &[Container]) -> ControlPlaneResult<()> {
    if containers.is_empty() {
        return Err(ControlPlaneError::InvalidArgument(
            "At least one container is required".to_string(),
        ));
    }
    for container in containers {
        validate_required("Container image", &container.image)?;
        for port in &container.ports {
            validate_port(*port)?;
        }
    }
    Ok(())
}

fn validate_optional(field: &str, value: &Option<String>) -> ControlPlaneResult<()> {
    match value {
        Some(v) => validate_required(field, v),
        None => Ok(()),
    }
}

fn validate_create_cluster(p: &CreateClusterPayload) -> ControlPlaneResult<()> {
    validate_required("Cluster name", &p.name)?;
    validate_optional("Cluster version", &p.version)?;
    validate_optional("Control plane endpoint", &p.control_plane_endpoint)?;
    validate_optional("Pod CIDR", &p.pod_cidr)?;
    validate_optional("CNI provider", &p.cni_provider)?;
    validate_labels(&p.labels)?;
    if let Some(workers) = p.worker_nodes {
        if workers > MAX_WORKER_NODES {
            return Err(ControlPlaneError::InvalidArgument(format!(
                "Worker node count must not exceed {}, got {}",
                MAX_WORKER_NODES, workers
            )));
        }
    }
    Ok(())
}

fn validate_create_namespace(state: &PlatformState, p: &CreateNamespacePayload) -> ControlPlaneResult<()> {
    let cluster = find_cluster(state, &p.cluster_id)?;
    validate_resource_name("Namespace name", &p.name)?;
    validate_labels(&p.labels)?;
    if let Some(quota) = &p.resource_quota {
        validate_quota(quota)?;
    }
    if cluster.namespaces.iter().any(|ns| ns.name == p.name) {
        return Err(ControlPlaneError::Conflict(format!(
            "Namespace '{}' already exists in cluster '{}'",
            p.name, cluster.name
        )));
    }
    Ok(())
}

fn validate_create_deployment(state: &PlatformState, p: &CreateDeploymentPayload) -> ControlPlaneResult<()> {
    let namespace = find_namespace(state, &p.cluster_id, &p.namespace_id)?;
    validate_resource_name("Deployment name", &p.name)?;
    validate_optional("Deployment version", &p.version)?;
    validate_replicas(p.replicas)?;
    validate_containers(&p.containers)?;

    if namespace.deployments.iter().any(|d| d.name == p.name) {
        return Err(ControlPlaneError::Conflict(format!(
            "Deployment '{}' already exists in namespace '{}'",
            p.name, namespace.name
        )));
    }
    if !namespace.has_quota_for_deployment() {
        return Err(ControlPlaneError::QuotaExceeded(format!(
            "Namespace '{}' has reached its quota of {} deployments",
            namespace.name, namespace.resource_quota.pods
        )));
    }
    Ok(())
}

fn validate_create_service(state: &PlatformState, p: &CreateServicePayload) -> ControlPlaneResult<()> {
    let namespace = find_namespace(state, &p.cluster_id, &p.namespace_id)?;
    validate_resource_name("Service name", &p.name)?;
    validate_optional("Service type", &p.service_type)?;
    validate_port(p.port)?;
    if namespace.services.iter().any(|s| s.name == p.name) {
        return Err(ControlPlaneError::Conflict(format!(
            "Service '{}' already exists in namespace '{}'",
            p.name, namespace.name
        )));
    }
    Ok(())
}

fn validate_create_config_map(state: &PlatformState, p: &CreateConfigMapPayload) -> ControlPlaneResult<()> {
    let namespace = find_namespace(state, &p.cluster_id, &p.namespace_id)?;
    validate_resource_name("ConfigMap name", &p.name)?;
    if namespace.config_maps.iter().any(|c| c.name == p.name) {
        return Err(ControlPlaneError::Conflict(format!(
            "ConfigMap '{}' already exists in namespace '{}'",
            p.name, namespace.name
        )));
    }
    Ok(())
}
