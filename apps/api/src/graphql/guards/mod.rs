//! Validation guards for the Circle GraphQL API
//!
//! Guards run after a query is parsed and before it executes; a rejected
//! query produces an error-only response with no data.

mod depth;

pub use depth::{operation_depth, DepthGuard, DEFAULT_MAX_DEPTH};
