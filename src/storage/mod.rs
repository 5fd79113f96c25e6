pub mod audit_log;

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::controllers::deployment_controller::advance_rollouts;
use crate::controllers::executor::ActionExecutor;
use crate::controllers::{ActionRequest, ActionResponse};
use crate::error::ControlPlaneResult;
use crate::models::{Cluster, Event, PlatformState};

pub use audit_log::AuditLog;

/// Point-in-time, read-only view of the platform.
pub type Snapshot = Arc<PlatformState>;

/// Accepted action: summary message plus the state it produced.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub message: String,
    pub state: Snapshot,
}

/// Owned handle to the control-plane state.
///
/// Cloning the handle shares the same state. Writers are serialized by
/// `writer` and publish a whole new root; readers only clone the current
/// `Arc`, so they see either the old or the new root, never a mix.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<Inner>,
}

struct Inner {
    current: RwLock<Snapshot>,
    writer: Mutex<()>,
    config: EngineConfig,
}

impl Storage {
    pub fn new(config: EngineConfig) -> Self {
        let state = PlatformState::new(config.audit_capacity);
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(Arc::new(state)),
                writer: Mutex::new(()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn get_state(&self) -> Snapshot {
        // A poisoned lock still guards a whole root: swaps are a single store.
        let current = self.inner.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current)
    }

    pub fn cluster(&self, cluster_id: &str) -> Option<Cluster> {
        self.get_state().cluster(cluster_id).cloned()
    }

    /// Newest first.
    pub fn events(&self, limit: usize) -> Vec<Event> {
        self.get_state().events.recent(limit)
    }

    /// Single write entry point. Rejections leave the state untouched.
    pub fn execute_action(&self, request: ActionRequest) -> ActionResponse {
        match self.try_execute(&request) {
            Ok(outcome) => ActionResponse::accepted(outcome.message, outcome.state),
            Err(err) => ActionResponse::rejected(&err),
        }
    }

    /// Decodes a raw `{ action, payload }` document and executes it.
    pub fn execute_json(&self, request: serde_json::Value) -> ActionResponse {
        match ActionRequest::from_json(request) {
            Ok(request) => self.execute_action(request),
            Err(err) => {
                warn!(error = %err, "Rejected malformed action request");
                ActionResponse::rejected(&err)
            }
        }
    }

    pub fn try_execute(&self, request: &ActionRequest) -> ControlPlaneResult<ActionOutcome> {
        let _guard = self.lock_writer();
        let current = self.get_state();

        match ActionExecutor::new(&self.inner.config).execute(&current, request) {
            Ok(applied) => {
                let state = self.publish(applied.state);
                info!(action = request.kind(), "{}", applied.message);
                Ok(ActionOutcome {
                    message: applied.message,
                    state,
                })
            }
            Err(err) => {
                warn!(action = request.kind(), error = %err, kind = ?err.kind(), "Rejected action");
                Err(err)
            }
        }
    }

    /// Runs one rollout-convergence tick. Returns how many deployments moved.
    pub fn reconcile(&self) -> usize {
        let _guard = self.lock_writer();
        let current = self.get_state();

        match advance_rollouts(&current, self.inner.config.rollout_step) {
            Some((next, progressed)) => {
                self.publish(next);
                info!("Rollout progressed for {} deployments", progressed);
                progressed
            }
            None => 0,
        }
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.inner.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: PlatformState) -> Snapshot {
        let snapshot = Arc::new(state);
        let mut current = self.inner.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::clone(&snapshot);
        snapshot
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
