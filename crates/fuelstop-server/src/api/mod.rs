//! HTTP surface of the fuel-stop service.

pub mod request_id;
mod routes;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// The full application router with state applied.
pub fn app(state: Arc<AppState>) -> Router {
    routes::create_router().with_state(state)
}
