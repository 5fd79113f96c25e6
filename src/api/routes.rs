use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::server::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/clusters", get(handlers::list_clusters))
        .route("/clusters/:cluster_id", get(handlers::get_cluster))
        .route("/events", get(handlers::list_events))
        .route("/actions", post(handlers::execute_action))
}
