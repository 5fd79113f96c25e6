//! HTTP mapping for control-plane errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::controllers::ActionResponse;
use crate::error::{ControlPlaneError, ErrorKind};

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        // Same status the Kubernetes API server uses for exceeded quota.
        ErrorKind::QuotaExceeded => StatusCode::FORBIDDEN,
    }
}

/// Error returned by read handlers; renders as `{ success: false, message, error }`.
#[derive(Debug)]
pub struct ApiError(pub ControlPlaneError);

impl From<ControlPlaneError> for ApiError {
    fn from(err: ControlPlaneError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        (status, Json(ActionResponse::rejected(&self.0))).into_response()
    }
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        let status = match self.error {
            Some(kind) => status_for(kind),
            None => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}
