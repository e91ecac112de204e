//! GraphQL HTTP route handlers
//!
//! - `POST /graphql` - Execute an operation (`{query, variables?, operationName?}`)
//! - `GET /graphql/playground` - Interactive playground for development

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::Extension,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};

use crate::graphql::RequestExecutor;

/// Create the GraphQL router
pub fn graphql_router(executor: RequestExecutor) -> Router {
    Router::new()
        .route("/", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .layer(Extension(executor))
}

/// GraphQL handler that executes one operation with a fresh request context
async fn graphql_handler(
    Extension(executor): Extension<RequestExecutor>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    executor.execute(req.into_inner()).await.into()
}

/// GraphQL Playground handler for development
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}
