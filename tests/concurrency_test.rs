mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use common::*;
use kubeboard::controllers::action::*;
use kubeboard::ActionRequest;

#[test]
fn test_concurrent_writers_and_readers() {
    let f = fixture(10);
    for i in 0..4 {
        assert!(create_deployment(&f.storage, &f.cluster_id, &f.namespace_id, &format!("app-{}", i), 1).success);
    }
    let ids: Vec<String> = (0..4)
        .filter_map(|i| find_deployment(&f.storage, &f.cluster_id, &f.namespace_id, &format!("app-{}", i)))
        .map(|d| d.id)
        .collect();
    let baseline_events = f.storage.get_state().events.len();

    let done = Arc::new(AtomicBool::new(false));
    let mut readers = Vec::new();
    for _ in 0..4 {
        let storage = f.storage.clone();
        let done = Arc::clone(&done);
        readers.push(thread::spawn(move || {
            let mut observed = 0usize;
            loop {
                let stop = done.load(Ordering::Acquire);
                let state = storage.get_state();
                for cluster in &state.clusters {
                    let mut replicas = 0u64;
                    for namespace in &cluster.namespaces {
                        assert!(namespace.deployments.len() <= namespace.resource_quota.pods as usize);
                        for deployment in &namespace.deployments {
                            assert!(deployment.available_replicas <= deployment.replicas);
                            replicas += u64::from(deployment.replicas);
                        }
                    }
                    assert_eq!(cluster.metrics.pod_count, replicas);
                }
                observed += 1;
                if stop {
                    break;
                }
            }
            observed
        }));
    }

    let mut writers = Vec::new();
    for (n, id) in ids.iter().enumerate() {
        let storage = f.storage.clone();
        let cluster_id = f.cluster_id.clone();
        let namespace_id = f.namespace_id.clone();
        let id = id.clone();
        writers.push(thread::spawn(move || {
            let mut accepted = 0usize;
            for round in 0..50i64 {
                let request = if round % 5 == 4 {
                    ActionRequest::RestartDeployment(deployment_ref(&cluster_id, &namespace_id, &id))
                } else {
                    ActionRequest::ScaleDeployment(ScaleDeploymentPayload {
                        cluster_id: cluster_id.clone(),
                        namespace_id: namespace_id.clone(),
                        deployment_id: id.clone(),
                        replicas: (round + n as i64) % 7,
                    })
                };
                if storage.execute_action(request).success {
                    accepted += 1;
                }
                if round % 10 == 0 {
                    storage.reconcile();
                }
            }
            accepted
        }));
    }

    let accepted: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();
    done.store(true, Ordering::Release);
    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }

    assert_eq!(accepted, 4 * 50);
    let state = f.storage.get_state();
    let action_events = state.events.iter().filter(|e| e.source == "deployment").count();
    assert_eq!(action_events, 4 + accepted);
    assert!(state.events.len() >= baseline_events + accepted);
}

#[test]
fn test_concurrent_creates_respect_quota() {
    let f = fixture(3);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let storage = f.storage.clone();
            let cluster_id = f.cluster_id.clone();
            let namespace_id = f.namespace_id.clone();
            thread::spawn(move || create_deployment(&storage, &cluster_id, &namespace_id, &format!("svc-{}", i), 2))
        })
        .collect();

    let responses: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted = responses.iter().filter(|r| r.success).count();

    assert_eq!(accepted, 3);
    let cluster = f.storage.cluster(&f.cluster_id).unwrap();
    assert_eq!(cluster.namespace(&f.namespace_id).unwrap().deployments.len(), 3);
    assert_eq!(cluster.metrics.pod_count, 6);
}

#[test]
fn test_snapshot_held_across_writes_is_stable() {
    let f = fixture(5);
    create_deployment(&f.storage, &f.cluster_id, &f.namespace_id, "api", 2);
    let held = f.storage.get_state();
    let serialized = serde_json::to_string(&*held).unwrap();

    let storage = f.storage.clone();
    let cluster_id = f.cluster_id.clone();
    let namespace_id = f.namespace_id.clone();
    thread::spawn(move || {
        for i in 0..3 {
            create_deployment(&storage, &cluster_id, &namespace_id, &format!("extra-{}", i), 1);
        }
        storage.reconcile();
    })
    .join()
    .unwrap();

    assert_eq!(serde_json::to_string(&*held).unwrap(), serialized);
    assert_ne!(f.storage.get_state().events.len(), held.events.len());
}
