//! Test helper functions for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use async_graphql::{Request, Response, Variables};
use circle_api::graphql::DEFAULT_MAX_DEPTH;
use circle_api::{MemoryDatastore, RequestExecutor};
use serde_json::Value;

/// A memory-backed executor plus direct access to its datastore
pub struct TestApp {
    pub store: Arc<MemoryDatastore>,
    pub executor: RequestExecutor,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        let store = Arc::new(MemoryDatastore::new());
        let executor = RequestExecutor::new(store.clone(), max_depth);
        Self { store, executor }
    }

    pub async fn execute(&self, query: &str) -> Response {
        self.executor.execute(query).await
    }

    pub async fn execute_with(&self, query: &str, variables: Value) -> Response {
        let request = Request::new(query).variables(Variables::from_json(variables));
        self.executor.execute(request).await
    }
}

/// The response's `data` as JSON
pub fn data(response: &Response) -> Value {
    response
        .data
        .clone()
        .into_json()
        .expect("response data is valid JSON")
}

/// `extensions.code` of every error in the response
pub fn error_codes(response: &Response) -> Vec<String> {
    response
        .errors
        .iter()
        .map(|error| {
            let json = serde_json::to_value(error).expect("error serializes");
            json["extensions"]["code"]
                .as_str()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Assert a response carries no errors, printing them otherwise
pub fn assert_ok(response: &Response) {
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
}
