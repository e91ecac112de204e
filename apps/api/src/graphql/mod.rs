//! GraphQL schema and resolvers for Circle
//!
//! This module contains the async-graphql schema including:
//! - Root queries and mutations, organized by entity
//! - Object types whose relational fields resolve through batched loaders
//! - The query depth guard and null propagation for failed fields
//! - The per-request executor and resolver context

pub mod context;
pub mod executor;
pub mod guards;
pub mod loaders;
pub mod mutation;
pub mod null_propagation;
pub mod query;
pub mod schema;
pub mod types;

pub use context::{request_context, RequestContext};
pub use executor::RequestExecutor;
pub use guards::{DepthGuard, DEFAULT_MAX_DEPTH};
pub use null_propagation::NullPropagation;
pub use schema::{build_schema, CircleSchema, SchemaBuilder};
