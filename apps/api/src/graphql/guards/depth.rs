//! Query depth guard
//!
//! Rejects operations whose selection sets nest deeper than a fixed bound.
//! The self-referential `User` graph (subscribers of subscribers of ...)
//! would otherwise let a single query fan out without limit.
//!
//! Depth counting: top-level fields sit at depth 0 and every nested selection
//! set adds one. Fragment spreads and inline fragments are transparent, and
//! introspection fields (`__schema`, `__typename`, ...) are not counted.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::extensions::{Extension, ExtensionContext, ExtensionFactory, NextParseQuery};
use async_graphql::parser::types::{ExecutableDocument, FragmentDefinition, Selection, SelectionSet};
use async_graphql::{ErrorExtensionValues, Name, Positioned, ServerError, ServerResult, Variables};

/// Maximum nesting depth when none is configured
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Extension rejecting over-deep operations before validation and execution
#[derive(Debug, Clone, Copy)]
pub struct DepthGuard {
    max_depth: usize,
}

impl DepthGuard {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Check every operation of a parsed document against the bound
    pub fn check(&self, document: &ExecutableDocument) -> ServerResult<()> {
        for (name, operation) in document.operations.iter() {
            let depth = selection_depth(
                &operation.node.selection_set.node,
                &document.fragments,
                0,
                &mut Vec::new(),
            );
            if depth > self.max_depth {
                let name = name.map(Name::as_str).unwrap_or("anonymous");
                tracing::debug!(
                    operation = name,
                    depth,
                    max_depth = self.max_depth,
                    "Rejected query exceeding depth limit"
                );

                let mut error = ServerError::new(
                    format!(
                        "Operation '{}' has depth {} which exceeds the maximum depth of {}",
                        name, depth, self.max_depth
                    ),
                    Some(operation.pos),
                );
                let mut extensions = ErrorExtensionValues::default();
                extensions.set("code", "DEPTH_LIMIT_EXCEEDED");
                error.extensions = Some(extensions);
                return Err(error);
            }
        }
        Ok(())
    }
}

impl Default for DepthGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl ExtensionFactory for DepthGuard {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(*self)
    }
}

#[async_trait::async_trait]
impl Extension for DepthGuard {
    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        let document = next.run(ctx, query, variables).await?;
        self.check(&document)?;
        Ok(document)
    }
}

/// Depth of the deepest operation in a parsed document
pub fn operation_depth(document: &ExecutableDocument) -> usize {
    document
        .operations
        .iter()
        .map(|(_, operation)| {
            selection_depth(
                &operation.node.selection_set.node,
                &document.fragments,
                0,
                &mut Vec::new(),
            )
        })
        .max()
        .unwrap_or(0)
}

fn selection_depth<'a>(
    set: &'a SelectionSet,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    depth: usize,
    visiting: &mut Vec<&'a Name>,
) -> usize {
    let mut deepest = depth;
    for selection in &set.items {
        let reached = match &selection.node {
            Selection::Field(field) => {
                let field = &field.node;
                if field.name.node.as_str().starts_with("__")
                    || field.selection_set.node.items.is_empty()
                {
                    depth
                } else {
                    selection_depth(&field.selection_set.node, fragments, depth + 1, visiting)
                }
            }
            Selection::FragmentSpread(spread) => {
                let name = &spread.node.fragment_name.node;
                // Cycles and unknown fragments are left to standard validation
                match fragments.get(name) {
                    Some(fragment) if !visiting.contains(&name) => {
                        visiting.push(name);
                        let reached = selection_depth(
                            &fragment.node.selection_set.node,
                            fragments,
                            depth,
                            visiting,
                        );
                        visiting.pop();
                        reached
                    }
                    _ => depth,
                }
            }
            Selection::InlineFragment(inline) => {
                selection_depth(&inline.node.selection_set.node, fragments, depth, visiting)
            }
        };
        deepest = deepest.max(reached);
    }
    deepest
}
