//! Typed per-request resolver context
//!
//! Resolvers never reach into the schema's global data. Everything they need
//! lives in one [`RequestContext`] built by the request executor for each
//! operation and attached as request data.

use std::sync::Arc;

use async_graphql::Context;

use super::loaders::Loaders;
use super::null_propagation::FieldFailures;
use crate::datastore::Datastore;

/// Datastore handle, the request's loader registry and its failed fields
pub struct RequestContext {
    store: Arc<dyn Datastore>,
    loaders: Loaders,
    failures: Arc<FieldFailures>,
}

impl RequestContext {
    /// Build a context with a fresh, empty set of loaders
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        let loaders = Loaders::new(store.clone());
        Self {
            store,
            loaders,
            failures: Arc::default(),
        }
    }

    /// Direct datastore access, for root queries and mutations
    pub fn store(&self) -> &dyn Datastore {
        self.store.as_ref()
    }

    /// Batched relation access, for relational fields
    pub fn loaders(&self) -> &Loaders {
        &self.loaders
    }

    /// Failed fields recorded while the operation executes
    pub fn failures(&self) -> &Arc<FieldFailures> {
        &self.failures
    }
}

/// Borrow the request context from a resolver's GraphQL context
pub fn request_context<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a RequestContext> {
    ctx.data::<RequestContext>()
}
