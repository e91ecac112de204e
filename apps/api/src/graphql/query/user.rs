//! User queries for Circle GraphQL API
//!
//! - users: List every user
//! - user: Look up one user by ID

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::error::to_graphql_error;
use crate::graphql::context::request_context;
use crate::graphql::types::User;

/// User-related queries
#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// List all users
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let users = request_context(ctx)?
            .store()
            .users()
            .await
            .map_err(to_graphql_error)?;
        Ok(users.into_iter().map(User::from).collect())
    }

    /// Get a user by ID
    ///
    /// Returns null when no user has this ID.
    async fn user(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<User>> {
        let user = request_context(ctx)?
            .store()
            .user(id)
            .await
            .map_err(to_graphql_error)?;
        Ok(user.map(User::from))
    }
}
