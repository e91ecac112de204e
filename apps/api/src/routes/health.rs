//! Health check HTTP route handlers
//!
//! Provides endpoints for checking the health of the API and its datastore:
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/live` - Kubernetes-style liveness probe
//! - `GET /health/ready` - Readiness check (verifies the datastore answers)

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use crate::datastore::Datastore;

/// Shared application state for health check handlers
#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<dyn Datastore>,
}

impl HealthState {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(simple_health))
        .route("/live", get(liveness_probe))
        .route("/ready", get(readiness_probe))
        .with_state(state)
}

/// Simple health check - always returns OK if the server is running
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness probe for Kubernetes
///
/// This should NOT check the datastore - that's what readiness is for.
async fn liveness_probe() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe
///
/// Reads the seeded member types as a cheap round trip to the datastore.
///
/// # Response
/// - 200 OK if the datastore answers
/// - 503 Service Unavailable otherwise
async fn readiness_probe(State(state): State<HealthState>) -> impl IntoResponse {
    match state.store.member_types().await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "datastore": "up" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable", "datastore": "down" })),
            )
        }
    }
}
