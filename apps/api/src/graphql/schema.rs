//! GraphQL schema builder for Circle
//!
//! The schema itself holds no data. Everything a resolver needs arrives per
//! request through [`RequestContext`](super::context::RequestContext), which
//! the [`RequestExecutor`](super::executor::RequestExecutor) attaches.

use async_graphql::{EmptySubscription, Schema};

use super::guards::{DepthGuard, DEFAULT_MAX_DEPTH};
use super::mutation::Mutation;
use super::null_propagation::NullPropagation;
use super::query::Query;

/// The Circle GraphQL schema type
pub type CircleSchema = Schema<Query, Mutation, EmptySubscription>;

/// Builder for constructing the GraphQL schema
pub struct SchemaBuilder {
    max_depth: usize,
}

impl SchemaBuilder {
    /// Create a new schema builder with the default depth bound
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum selection nesting depth
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the schema with the depth guard and null propagation installed
    pub fn build(self) -> CircleSchema {
        Schema::build(Query::default(), Mutation::default(), EmptySubscription)
            .extension(DepthGuard::new(self.max_depth))
            .extension(NullPropagation)
            .finish()
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new GraphQL schema rejecting operations deeper than `max_depth`
pub fn build_schema(max_depth: usize) -> CircleSchema {
    SchemaBuilder::new().max_depth(max_depth).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder_default() {
        let builder = SchemaBuilder::default();
        assert_eq!(builder.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_sdl_exposes_relations() {
        let sdl = build_schema(DEFAULT_MAX_DEPTH).sdl();
        assert!(sdl.contains("userSubscribedTo: [User!]!"));
        assert!(sdl.contains("subscribedToUser: [User!]!"));
        assert!(sdl.contains("profile: Profile"));
        assert!(sdl.contains("memberType: MemberType!"));
        assert!(sdl.contains("enum MemberTypeId"));
        assert!(sdl.contains("deleteUser(id: UUID!): String!"));
    }
}
