//! Null propagation for failed fields
//!
//! A failed field resolves to `null` and its error is reported at the
//! field's own path. When the failed field is declared non-null, the `null`
//! moves up to the nearest nullable ancestor instead, and when no ancestor is
//! nullable the whole `data` of the response becomes `null`.
//!
//! Failures are collected in a per-request [`FieldFailures`] ledger held by
//! the request context. The [`NullPropagation`] extension wraps every field
//! and list item resolution: a failure is recorded as *pending* while it
//! still has to bubble, and the first nullable ancestor to finish settles it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextResolve, ResolveInfo,
};
use async_graphql::{
    PathSegment, QueryPathNode, QueryPathSegment, ServerError, ServerResult, Value,
};

use super::context::RequestContext;

struct FieldFailure {
    path: Vec<PathSegment>,
    error: ServerError,
    pending: bool,
}

/// Failed fields of one request, in the order they failed
#[derive(Default)]
pub struct FieldFailures {
    entries: Mutex<Vec<FieldFailure>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn is_under(path: &[PathSegment], ancestor: &[PathSegment]) -> bool {
    path.len() > ancestor.len() && path.starts_with(ancestor)
}

impl FieldFailures {
    fn record(&self, path: Vec<PathSegment>, error: ServerError, pending: bool) {
        lock(&self.entries).push(FieldFailure {
            path,
            error,
            pending,
        });
    }

    /// Settle every pending failure below `path`, returning whether there was one
    fn settle_under(&self, path: &[PathSegment]) -> bool {
        let mut settled = false;
        for failure in lock(&self.entries).iter_mut() {
            if failure.pending && is_under(&failure.path, path) {
                failure.pending = false;
                settled = true;
            }
        }
        settled
    }

    /// Whether a non-null failure bubbled past every field up to the root
    pub fn reached_root(&self) -> bool {
        lock(&self.entries).iter().any(|failure| failure.pending)
    }

    /// Errors of every failed field, with their paths
    pub fn errors(&self) -> Vec<ServerError> {
        lock(&self.entries)
            .iter()
            .map(|failure| failure.error.clone())
            .collect()
    }
}

/// Response path of a field or list item
fn response_path(node: &QueryPathNode<'_>) -> Vec<PathSegment> {
    let mut path = Vec::new();
    let mut current = Some(node);
    while let Some(node) = current {
        path.push(match &node.segment {
            QueryPathSegment::Name(name) => PathSegment::Field(name.to_string()),
            QueryPathSegment::Index(index) => PathSegment::Index(*index),
        });
        current = node.parent;
    }
    path.reverse();
    path
}

/// Extension applying null propagation to every resolved field
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPropagation;

impl ExtensionFactory for NullPropagation {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(NullPropagation)
    }
}

#[async_trait::async_trait]
impl Extension for NullPropagation {
    async fn resolve(
        &self,
        ctx: &ExtensionContext<'_>,
        info: ResolveInfo<'_>,
        next: NextResolve<'_>,
    ) -> ServerResult<Option<Value>> {
        let failures = match ctx.data_opt::<RequestContext>() {
            Some(request) if !info.is_for_introspection => request.failures().as_ref(),
            _ => return next.run(ctx, info).await,
        };
        let nullable = !info.return_type.ends_with('!');
        let path = response_path(info.path_node);

        match next.run(ctx, info).await {
            Ok(value) => {
                // A non-null position keeps bubbling until an ancestor replaces it
                if nullable && failures.settle_under(&path) {
                    Ok(Some(Value::Null))
                } else {
                    Ok(value)
                }
            }
            Err(mut error) => {
                if error.path.is_empty() {
                    error.path = path.clone();
                }
                // Anything still pending below is subsumed by this failure
                failures.settle_under(&path);
                failures.record(path, error, !nullable);
                Ok(Some(Value::Null))
            }
        }
    }
}
