use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::error::ApiError;
use super::server::AppState;
use crate::controllers::ActionResponse;
use crate::error::ControlPlaneError;
use crate::models::{Cluster, Event};
use crate::storage::Snapshot;

const DEFAULT_EVENT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct EventParams {
    limit: Option<usize>,
}

pub async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.storage.get_state())
}

pub async fn list_clusters(State(state): State<AppState>) -> Json<Vec<Cluster>> {
    Json(state.storage.get_state().clusters.clone())
}

pub async fn get_cluster(
    State(state): State<AppState>,
    Path(cluster_id): Path<String>,
) -> Result<Json<Cluster>, ApiError> {
    state
        .storage
        .cluster(&cluster_id)
        .map(Json)
        .ok_or_else(|| ApiError(ControlPlaneError::cluster_not_found(&cluster_id)))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Json<Vec<Event>> {
    Json(state.storage.events(params.limit.unwrap_or(DEFAULT_EVENT_LIMIT)))
}

pub async fn execute_action(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ActionResponse {
    match body {
        Ok(Json(request)) => state.storage.execute_json(request),
        Err(rejection) => {
            tracing::warn!("Rejected unreadable action body: {}", rejection.body_text());
            let err = ControlPlaneError::InvalidArgument(format!(
                "Invalid action request: {}",
                rejection.body_text()
            ));
            ActionResponse::rejected(&err)
        }
    }
}
