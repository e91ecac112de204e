//! Circle API library
//!
//! This module exposes the core API components for use in integration tests
//! and as a library.

pub mod config;
pub mod datastore;
pub mod error;
pub mod graphql;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use datastore::{Datastore, MemoryDatastore, PgDatastore, StoreError};
pub use error::ApiError;
pub use graphql::{build_schema, CircleSchema, RequestExecutor};
