//! REST API routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::request_id::{propagate_request_id, RequestId};
use crate::error::ApiError;
use crate::optimize::{optimize_route, OptimizeRequest, OptimizeResponse};
use crate::state::AppState;

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/optimize-route", post(optimize))
        .route("/api/optimize-route/", post(optimize))
        .route("/api/stations/summary", get(stations_summary))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(propagate_request_id))
        .layer(CorsLayer::permissive())
}

async fn optimize(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!("rejected request body: {}", rejection.body_text());
        let mut fields = BTreeMap::new();
        fields.insert("body", rejection.body_text());
        ApiError::Validation(fields)
    })?;
    let request = OptimizeRequest::from_json(&body)?;
    let response = optimize_route(&state, &request_id, request).await?;
    Ok(Json(response))
}

async fn stations_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let catalog = state.catalog();
    Json(json!({
        "stations": catalog.len(),
        "ingest": catalog.stats(),
        "grid_cell_deg": catalog.grid().cell_deg,
        "planner": state.planner(),
    }))
}
