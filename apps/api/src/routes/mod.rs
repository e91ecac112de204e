//! HTTP route handlers for the Circle API
//!
//! This module contains all HTTP endpoint handlers:
//! - The GraphQL endpoint and playground
//! - Health check and readiness endpoints

pub mod graphql;
pub mod health;

pub use graphql::graphql_router;
pub use health::{health_router, HealthState};

use axum::Router;

use crate::graphql::RequestExecutor;

/// Assemble every route of the API
///
/// Tracing and CORS layers are added by the binary.
pub fn app_router(executor: RequestExecutor) -> Router {
    let health_state = HealthState::new(executor.store().clone());

    Router::new()
        .route("/", axum::routing::get(root))
        // GraphQL endpoints: /graphql, /graphql/playground
        .nest("/graphql", graphql_router(executor))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(health_state))
}

async fn root() -> &'static str {
    "Welcome to Circle - GraphQL API"
}
