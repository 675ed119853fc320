//! API error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Per-field request validation messages.
    #[error("invalid request")]
    Validation(BTreeMap<&'static str, String>),
    #[error("Invalid start or destination address.")]
    InvalidAddress,
    #[error("Unable to retrieve route.")]
    RouteUnavailable,
    #[error("Invalid geometry format from routing provider.")]
    InvalidGeometry,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl From<RouteError> for ApiError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::Unavailable(_) => ApiError::RouteUnavailable,
            RouteError::InvalidGeometry => ApiError::InvalidGeometry,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(fields) => json!(fields),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
