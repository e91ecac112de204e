//! Profile queries for Circle GraphQL API

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::error::to_graphql_error;
use crate::graphql::context::request_context;
use crate::graphql::types::Profile;

/// Profile-related queries
#[derive(Default)]
pub struct ProfileQuery;

#[Object]
impl ProfileQuery {
    /// List all profiles
    async fn profiles(&self, ctx: &Context<'_>) -> Result<Vec<Profile>> {
        let profiles = request_context(ctx)?
            .store()
            .profiles()
            .await
            .map_err(to_graphql_error)?;
        Ok(profiles.into_iter().map(Profile::from).collect())
    }

    /// Get a profile by ID
    async fn profile(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Profile>> {
        let profile = request_context(ctx)?
            .store()
            .profile(id)
            .await
            .map_err(to_graphql_error)?;
        Ok(profile.map(Profile::from))
    }
}
