use std::collections::BTreeSet;

use tracing::debug;

use crate::config::EngineConfig;
use crate::controllers::action::*;
use crate::controllers::{metrics, validator};
use crate::error::{ControlPlaneError, ControlPlaneResult};
use crate::models::node::UNSCHEDULABLE_TAINT;
use crate::models::{
    Cluster, ConfigMap, Deployment, Distribution, Event, Namespace, NetworkConfig, Node, NodeRole,
    PlatformState, Service,
};
use crate::scheduler;

const DEFAULT_DEPLOYMENT_VERSION: &str = "1.0.0";
const DEFAULT_SERVICE_TYPE: &str = "ClusterIP";

/// Result of an accepted action: the next root state and a summary message.
#[derive(Debug)]
pub struct Applied {
    pub state: PlatformState,
    pub message: String,
}

/// What a transition did, before the shared post-processing runs.
struct Change {
    message: String,
    event: Event,
    /// Cluster whose placements and metrics need refreshing.
    cluster_id: Option<String>,
}

impl Change {
    fn new(source: &str, message: String, cluster_id: &str) -> Self {
        Self {
            event: Event::info(source, message.clone()).with_cluster(cluster_id),
            message,
            cluster_id: Some(cluster_id.to_string()),
        }
    }

    fn in_namespace(mut self, namespace_id: &str) -> Self {
        self.event = self.event.with_namespace(namespace_id);
        self
    }
}

/// Applies validated commands to a copy of the platform state.
///
/// The input state is never modified: validation runs first against it, then
/// every mutation happens on a clone that is only handed back on success.
pub struct ActionExecutor<'a> {
    config: &'a EngineConfig,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, current: &PlatformState, request: &ActionRequest) -> ControlPlaneResult<Applied> {
        validator::validate(current, request)?;

        let mut next = current.clone();
        let change = self.apply(&mut next, request)?;

        if let Some(cluster) = change.cluster_id.as_deref().and_then(|id| next.cluster_mut(id)) {
            scheduler::schedule_cluster(cluster);
            metrics::recompute(cluster);
        }
        next.events.append(change.event);

        Ok(Applied {
            state: next,
            message: change.message,
        })
    }

    fn apply(&self, state: &mut PlatformState, request: &ActionRequest) -> ControlPlaneResult<Change> {
        debug!(action = request.kind(), "Applying action");
        match request {
            ActionRequest::CreateCluster(p) => Ok(self.create_cluster(state, p)),
            ActionRequest::DeleteCluster(p) => delete_cluster(state, p),
            ActionRequest::CreateNamespace(p) => self.create_namespace(state, p),
            ActionRequest::DeleteNamespace(p) => delete_namespace(state, p),
            ActionRequest::CreateDeployment(p) => create_deployment(state, p),
            ActionRequest::ScaleDeployment(p) => scale_deployment(state, p),
            ActionRequest::RestartDeployment(p) => restart_deployment(state, p),
            ActionRequest::DeleteDeployment(p) => delete_deployment(state, p),
            ActionRequest::CreateService(p) => create_service(state, p),
            ActionRequest::CreateConfigMap(p) => create_config_map(state, p),
            ActionRequest::CordonNode(p) => set_cordon(state, p, true),
            ActionRequest::UncordonNode(p) => set_cordon(state, p, false),
        }
    }

    fn create_cluster(&self, state: &mut PlatformState, p: &CreateClusterPayload) -> Change {
        let version = p.version.clone().unwrap_or_else(|| self.config.default_version.clone());
        let network = NetworkConfig {
            control_plane_endpoint: p
                .control_plane_endpoint
                .clone()
                .unwrap_or_else(|| "https://10.0.0.10:6443".to_string()),
            pod_cidr: p.pod_cidr.clone().unwrap_or_else(|| default_pod_cidr(p.distribution).to_string()),
            cni_provider: p
                .cni_provider
                .clone()
                .unwrap_or_else(|| default_cni(p.distribution).to_string()),
            addons: p.addons.clone(),
        };

        let mut cluster = Cluster::new(p.name.clone(), p.distribution, version, network);
        cluster.description = p.description.clone().unwrap_or_default();
        cluster.labels = p.labels.iter().cloned().collect::<BTreeSet<_>>();

        let workers = p.worker_nodes.unwrap_or(self.config.default_worker_nodes);
        cluster.nodes.push(Node::new(
            format!("{}-control-plane", p.name),
            NodeRole::ControlPlane,
            "10.0.0.10".to_string(),
        ));
        for n in 1..=workers {
            cluster.nodes.push(Node::new(
                format!("{}-worker-{}", p.name, n),
                NodeRole::Worker,
                format!("10.0.0.{}", 10 + n),
            ));
        }

        let message = format!(
            "Cluster '{}' created ({} {}) with {} nodes",
            cluster.name,
            cluster.distribution,
            cluster.version,
            cluster.nodes.len()
        );
        let change = Change::new("cluster", message, &cluster.id);
        state.clusters.push(cluster);
        change
    }

    fn create_namespace(&self, state: &mut PlatformState, p: &CreateNamespacePayload) -> ControlPlaneResult<Change> {
        let cluster = cluster_mut(state, &p.cluster_id)?;
        let quota = p
            .resource_quota
            .clone()
            .unwrap_or_else(|| self.config.default_quota.clone());

        let mut namespace = Namespace::new(cluster.id.clone(), p.name.clone(), quota);
        namespace.labels = p.labels.iter().cloned().collect();

        let message = format!(
            "Namespace '{}' created in cluster '{}' (quota: {} deployments)",
            namespace.name, cluster.name, namespace.resource_quota.pods
        );
        let change = Change::new("namespace", message, &cluster.id).in_namespace(&namespace.id);
        cluster.namespaces.push(namespace);
        cluster.touch();
        Ok(change)
    }
}

fn default_pod_cidr(distribution: Distribution) -> &'static str {
    match distribution {
        Distribution::K3s => "10.42.0.0/16",
        Distribution::Openshift => "10.128.0.0/14",
        _ => "10.244.0.0/16",
    }
}

fn default_cni(distribution: Distribution) -> &'static str {
    match distribution {
        Distribution::K3s => "flannel",
        Distribution::K0s => "kube-router",
        Distribution::Openshift => "ovn-kubernetes",
        Distribution::Aks => "azure-cni",
        Distribution::Eks => "aws-vpc-cni",
        Distribution::Gke => "gke-dataplane-v2",
        Distribution::K8s => "calico",
    }
}

fn cluster_mut<'s>(state: &'s mut PlatformState, cluster_id: &str) -> ControlPlaneResult<&'s mut Cluster> {
    state
        .cluster_mut(cluster_id)
        .ok_or_else(|| ControlPlaneError::cluster_not_found(cluster_id))
}

fn namespace_mut<'s>(
    state: &'s mut PlatformState,
    cluster_id: &str,
    namespace_id: &str,
) -> ControlPlaneResult<&'s mut Namespace> {
    cluster_mut(state, cluster_id)?
        .namespace_mut(namespace_id)
        .ok_or_else(|| ControlPlaneError::namespace_not_found(namespace_id))
}

fn deployment_mut<'s>(state: &'s mut PlatformState, r: &DeploymentRef) -> ControlPlaneResult<&'s mut Deployment> {
    namespace_mut(state, &r.cluster_id, &r.namespace_id)?
        .deployment_mut(&r.deployment_id)
        .ok_or_else(|| ControlPlaneError::deployment_not_found(&r.deployment_id))
}

fn delete_cluster(state: &mut PlatformState, p: &ClusterRef) -> ControlPlaneResult<Change> {
    let index = state
        .clusters
        .iter()
        .position(|c| c.id == p.cluster_id)
        .ok_or_else(|| ControlPlaneError::cluster_not_found(&p.cluster_id))?;
    let cluster = state.clusters.remove(index);

    let message = format!(
        "Cluster '{}' deleted with {} nodes and {} namespaces",
        cluster.name,
        cluster.nodes.len(),
        cluster.namespaces.len()
    );
    Ok(Change {
        event: Event::info("cluster", message.clone()).with_cluster(&cluster.id),
        message,
        cluster_id: None,
    })
}

fn delete_namespace(state: &mut PlatformState, p: &NamespaceRef) -> ControlPlaneResult<Change> {
    let cluster = cluster_mut(state, &p.cluster_id)?;
    let index = cluster
        .namespaces
        .iter()
        .position(|ns| ns.id == p.namespace_id)
        .ok_or_else(|| ControlPlaneError::namespace_not_found(&p.namespace_id))?;
    let namespace = cluster.namespaces.remove(index);
    cluster.touch();

    let message = format!(
        "Namespace '{}' deleted from cluster '{}' with {} deployments",
        namespace.name,
        cluster.name,
        namespace.deployments.len()
    );
    Ok(Change::new("namespace", message, &cluster.id).in_namespace(&namespace.id))
}

fn create_deployment(state: &mut PlatformState, p: &CreateDeploymentPayload) -> ControlPlaneResult<Change> {
    let namespace = namespace_mut(state, &p.cluster_id, &p.namespace_id)?;
    let replicas = u32::try_from(p.replicas)
        .map_err(|_| ControlPlaneError::InvalidArgument(format!("Invalid replica count {}", p.replicas)))?;

    let deployment = Deployment::new(
        namespace.id.clone(),
        p.name.clone(),
        p.version.clone().unwrap_or_else(|| DEFAULT_DEPLOYMENT_VERSION.to_string()),
        replicas,
        p.containers.clone(),
        p.strategy,
    );

    let message = format!(
        "Deployment '{}' created in namespace '{}' with {} replicas",
        deployment.name, namespace.name, deployment.replicas
    );
    let change = Change::new("deployment", message, &p.cluster_id).in_namespace(&namespace.id);
    namespace.deployments.push(deployment);
    namespace.touch();
    Ok(change)
}

fn scale_deployment(state: &mut PlatformState, p: &ScaleDeploymentPayload) -> ControlPlaneResult<Change> {
    let replicas = u32::try_from(p.replicas)
        .map_err(|_| ControlPlaneError::InvalidArgument(format!("Invalid replica count {}", p.replicas)))?;
    let target = DeploymentRef {
        cluster_id: p.cluster_id.clone(),
        namespace_id: p.namespace_id.clone(),
        deployment_id: p.deployment_id.clone(),
    };
    let deployment = deployment_mut(state, &target)?;
    let previous = deployment.replicas;
    deployment.scale(replicas);

    let message = format!(
        "Deployment '{}' scaled from {} to {} replicas ({} available)",
        deployment.name, previous, deployment.replicas, deployment.available_replicas
    );
    Ok(Change::new("deployment", message, &p.cluster_id).in_namespace(&p.namespace_id))
}

fn restart_deployment(state: &mut PlatformState, p: &DeploymentRef) -> ControlPlaneResult<Change> {
    let deployment = deployment_mut(state, p)?;
    deployment.restart();

    let message = format!(
        "Deployment '{}' restarted ({}/{} available)",
        deployment.name, deployment.available_replicas, deployment.replicas
    );
    Ok(Change::new("deployment", message, &p.cluster_id).in_namespace(&p.namespace_id))
}

fn delete_deployment(state: &mut PlatformState, p: &DeploymentRef) -> ControlPlaneResult<Change> {
    let namespace = namespace_mut(state, &p.cluster_id, &p.namespace_id)?;
    let index = namespace
        .deployments
        .iter()
        .position(|d| d.id == p.deployment_id)
        .ok_or_else(|| ControlPlaneError::deployment_not_found(&p.deployment_id))?;
    let deployment = namespace.deployments.remove(index);
    namespace.touch();

    let message = format!(
        "Deployment '{}' deleted from namespace '{}'",
        deployment.name, namespace.name
    );
    Ok(Change::new("deployment", message, &p.cluster_id).in_namespace(&p.namespace_id))
}

fn create_service(state: &mut PlatformState, p: &CreateServicePayload) -> ControlPlaneResult<Change> {
    let namespace = namespace_mut(state, &p.cluster_id, &p.namespace_id)?;
    let service = Service::new(
        namespace.id.clone(),
        p.name.clone(),
        p.service_type.clone().unwrap_or_else(|| DEFAULT_SERVICE_TYPE.to_string()),
        p.port,
    );

    let message = format!(
        "Service '{}' ({}, port {}) created in namespace '{}'",
        service.name, service.service_type, service.port, namespace.name
    );
    let change = Change::new("service", message, &p.cluster_id).in_namespace(&namespace.id);
    namespace.services.push(service);
    namespace.touch();
    Ok(change)
}

fn create_config_map(state: &mut PlatformState, p: &CreateConfigMapPayload) -> ControlPlaneResult<Change> {
    let namespace = namespace_mut(state, &p.cluster_id, &p.namespace_id)?;
    let config_map = ConfigMap::new(namespace.id.clone(), p.name.clone(), p.data.clone());

    let message = format!(
        "ConfigMap '{}' created in namespace '{}' with {} keys",
        config_map.name,
        namespace.name,
        config_map.data.len()
    );
    let change = Change::new("configmap", message, &p.cluster_id).in_namespace(&namespace.id);
    namespace.config_maps.push(config_map);
    namespace.touch();
    Ok(change)
}

/// Cordon and uncordon are idempotent: repeating one leaves the taints alone
/// and records a no-change event instead of a second transition.
fn set_cordon(state: &mut PlatformState, p: &NodeRef, cordon: bool) -> ControlPlaneResult<Change> {
    let cluster = cluster_mut(state, &p.cluster_id)?;
    let node = cluster
        .node_mut(&p.node_id)
        .ok_or_else(|| ControlPlaneError::node_not_found(&p.node_id))?;

    let changed = if cordon {
        node.taints.insert(UNSCHEDULABLE_TAINT.to_string())
    } else {
        node.taints.remove(UNSCHEDULABLE_TAINT)
    };

    let message = match (cordon, changed) {
        (true, true) => format!("Node '{}' cordoned", node.name),
        (true, false) => format!("Node '{}' is already cordoned", node.name),
        (false, true) => format!("Node '{}' uncordoned", node.name),
        (false, false) => format!("Node '{}' is already schedulable", node.name),
    };

    if changed {
        cluster.touch();
    }
    Ok(Change::new("node", message, &p.cluster_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{Container, HealthStatus, ResourceQuota};

    fn run(config: &EngineConfig, state: &PlatformState, request: ActionRequest) -> ControlPlaneResult<Applied> {
        ActionExecutor::new(config).execute(state, &request)
    }

    fn with_cluster(config: &EngineConfig) -> PlatformState {
        let state = PlatformState::new(config.audit_capacity);
        run(
            config,
            &state,
            ActionRequest::CreateCluster(CreateClusterPayload {
                name: "edge-1".to_string(),
                distribution: Distribution::K3s,
                version: Some("v1.30.5".to_string()),
                ..CreateClusterPayload::default()
            }),
        )
        .unwrap()
        .state
    }

    #[test]
    fn test_create_cluster_seeds_nodes_and_metrics() {
        let config = EngineConfig::default();
        let state = with_cluster(&config);
        let cluster = &state.clusters[0];

        assert_eq!(cluster.status, HealthStatus::Healthy);
        assert_eq!(cluster.nodes.len(), 1 + config.default_worker_nodes as usize);
        assert_eq!(cluster.nodes[0].role, NodeRole::ControlPlane);
        assert_eq!(cluster.network.cni_provider, "flannel");
        assert_eq!(cluster.created_at, cluster.updated_at);
        assert_eq!(cluster.metrics.cpu_capacity, 4000 * cluster.nodes.len() as u64);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_create_namespace_uses_default_quota() {
        let config = EngineConfig::default();
        let state = with_cluster(&config);
        let cluster_id = state.clusters[0].id.clone();

        let applied = run(
            &config,
            &state,
            ActionRequest::CreateNamespace(CreateNamespacePayload {
                cluster_id,
                name: "prod".to_string(),
                ..CreateNamespacePayload::default()
            }),
        )
        .unwrap();

        let namespace = &applied.state.clusters[0].namespaces[0];
        assert_eq!(namespace.resource_quota, ResourceQuota::default());
        assert_eq!(namespace.status, HealthStatus::Healthy);
        assert!(applied.state.clusters[0].updated_at >= state.clusters[0].updated_at);
    }

    #[test]
    fn test_rejected_action_leaves_input_untouched() {
        let config = EngineConfig::default();
        let state = with_cluster(&config);
        let before = state.clone();

        let err = run(
            &config,
            &state,
            ActionRequest::DeleteDeployment(DeploymentRef {
                cluster_id: state.clusters[0].id.clone(),
                namespace_id: "missing".to_string(),
                deployment_id: "missing".to_string(),
            }),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(state, before);
    }

    #[test]
    fn test_deployment_lifecycle_schedules_pods() {
        let config = EngineConfig::default();
        let state = with_cluster(&config);
        let cluster_id = state.clusters[0].id.clone();

        let state = run(
            &config,
            &state,
            ActionRequest::CreateNamespace(CreateNamespacePayload {
                cluster_id: cluster_id.clone(),
                name: "prod".to_string(),
                ..CreateNamespacePayload::default()
            }),
        )
        .unwrap()
        .state;
        let namespace_id = state.clusters[0].namespaces[0].id.clone();

        let state = run(
            &config,
            &state,
            ActionRequest::CreateDeployment(CreateDeploymentPayload {
                cluster_id: cluster_id.clone(),
                namespace_id: namespace_id.clone(),
                name: "api".to_string(),
                replicas: 4,
                containers: vec![Container { image: "ghcr.io/acme/api:2.1".to_string(), ports: vec![8080] }],
                ..CreateDeploymentPayload::default()
            }),
        )
        .unwrap()
        .state;

        let cluster = &state.clusters[0];
        let deployment = &cluster.namespaces[0].deployments[0];
        assert_eq!(deployment.status, HealthStatus::Warning);
        assert_eq!(deployment.available_replicas, 0);
        assert_eq!(deployment.scheduled_replicas(), 4);
        assert_eq!(cluster.metrics.pod_count, 4);

        let deployment_id = deployment.id.clone();
        let state = run(
            &config,
            &state,
            ActionRequest::DeleteDeployment(DeploymentRef {
                cluster_id,
                namespace_id,
                deployment_id,
            }),
        )
        .unwrap()
        .state;

        let cluster = &state.clusters[0];
        assert!(cluster.namespaces[0].deployments.is_empty());
        assert_eq!(cluster.metrics.pod_count, 0);
        assert!(cluster.nodes.iter().all(|n| n.metrics.pod_count == 0));
    }

    #[test]
    fn test_cordon_twice_records_no_second_transition() {
        let config = EngineConfig::default();
        let state = with_cluster(&config);
        let node = NodeRef {
            cluster_id: state.clusters[0].id.clone(),
            node_id: state.clusters[0].nodes[1].id.clone(),
        };

        let first = run(&config, &state, ActionRequest::CordonNode(node.clone())).unwrap();
        let second = run(&config, &first.state, ActionRequest::CordonNode(node)).unwrap();

        assert_eq!(first.state.clusters[0].nodes[1].taints, second.state.clusters[0].nodes[1].taints);
        assert_eq!(first.state.clusters[0].updated_at, second.state.clusters[0].updated_at);
        assert!(second.message.contains("already cordoned"));
        let cordoned = second.state.events.iter().filter(|e| e.message.ends_with("cordoned") && !e.message.contains("already")).count();
        assert_eq!(cordoned, 1);
    }

    #[test]
    fn test_delete_cluster_removes_subtree() {
        let config = EngineConfig::default();
        let state = with_cluster(&config);
        let cluster_id = state.clusters[0].id.clone();

        let applied = run(&config, &state, ActionRequest::DeleteCluster(ClusterRef { cluster_id: cluster_id.clone() })).unwrap();
        assert!(applied.state.clusters.is_empty());
        assert_eq!(applied.state.events.latest().and_then(|e| e.cluster_id.clone()), Some(cluster_id));
    }
}
