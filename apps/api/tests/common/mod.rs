//! Common test utilities for API integration tests
//!
//! Every test runs against a fresh [`MemoryDatastore`](circle_api::MemoryDatastore),
//! so tests are independent and need no database.

#![allow(unused_imports)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
