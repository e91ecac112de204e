//! Membership tier queries for Circle GraphQL API

use async_graphql::{Context, Object, Result};

use crate::error::to_graphql_error;
use crate::graphql::context::request_context;
use crate::graphql::types::{MemberType, MemberTypeId};

/// Membership tier queries
#[derive(Default)]
pub struct MemberTypeQuery;

#[Object]
impl MemberTypeQuery {
    /// List all membership tiers
    async fn member_types(&self, ctx: &Context<'_>) -> Result<Vec<MemberType>> {
        let member_types = request_context(ctx)?
            .store()
            .member_types()
            .await
            .map_err(to_graphql_error)?;
        Ok(member_types.into_iter().map(MemberType::from).collect())
    }

    /// Get a membership tier by ID
    async fn member_type(&self, ctx: &Context<'_>, id: MemberTypeId) -> Result<Option<MemberType>> {
        let member_type = request_context(ctx)?
            .store()
            .member_type(id.into())
            .await
            .map_err(to_graphql_error)?;
        Ok(member_type.map(MemberType::from))
    }
}
