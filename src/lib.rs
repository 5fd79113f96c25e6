//! In-memory control-plane state engine behind the kubeboard dashboard.
//!
//! [`Storage`] owns the platform state. Reads return immutable snapshots;
//! every write goes through [`Storage::execute_action`], which validates the
//! command, applies it to a copy of the state, recomputes derived metrics,
//! appends an audit event and publishes the new root atomically.

pub mod api;
pub mod config;
pub mod controllers;
pub mod error;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod storage;

pub use controllers::{ActionRequest, ActionResponse};
pub use error::{ControlPlaneError, ErrorKind};
pub use storage::{Snapshot, Storage};
