//! Common routes: health, version, and the synthesized route listing.

use crate::routes::entity::RouteRegistration;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn routes(State(registrations): State<Arc<Vec<RouteRegistration>>>) -> Json<Vec<RouteRegistration>> {
    Json(registrations.as_ref().clone())
}

/// GET /health, GET /version, GET /routes.
pub fn common_routes(registrations: Vec<RouteRegistration>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/routes", get(routes))
        .with_state(Arc::new(registrations))
}
