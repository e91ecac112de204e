//! Per-request execution
//!
//! [`RequestExecutor`] is the only way operations reach the schema. It pairs
//! each incoming request with a brand new [`RequestContext`], so loader
//! memoization is scoped to exactly one operation.

use std::sync::Arc;

use async_graphql::{Request, Response, Value};

use super::context::RequestContext;
use super::schema::{build_schema, CircleSchema};
use crate::datastore::Datastore;

/// Executes GraphQL requests against the Circle schema
#[derive(Clone)]
pub struct RequestExecutor {
    schema: CircleSchema,
    store: Arc<dyn Datastore>,
}

impl RequestExecutor {
    /// Build the schema and bind it to a datastore
    pub fn new(store: Arc<dyn Datastore>, max_depth: usize) -> Self {
        Self {
            schema: build_schema(max_depth),
            store,
        }
    }

    /// Parse, validate, and execute one operation
    ///
    /// Parse and validation failures (including the depth guard) produce a
    /// response with errors and no data. A failed field becomes null at its
    /// nearest nullable position, or nulls all of `data` when there is none.
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let context = RequestContext::new(self.store.clone());
        let failures = Arc::clone(context.failures());
        let mut response = self.schema.execute(request.into().data(context)).await;

        if failures.reached_root() {
            response.data = Value::Null;
        }
        response.errors.extend(failures.errors());

        if response.is_err() {
            tracing::debug!(errors = response.errors.len(), "Operation completed with errors");
        }
        response
    }

    pub fn store(&self) -> &Arc<dyn Datastore> {
        &self.store
    }
}
