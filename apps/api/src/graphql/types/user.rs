//! User GraphQL type
//!
//! `User` is self-referential through the subscription graph:
//! `userSubscribedTo` and `subscribedToUser` both return users, so a query
//! can walk subscriber/author edges as deep as the depth guard allows.

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::error::to_graphql_error;
use crate::graphql::context::request_context;
use crate::models::User as DbUser;

use super::post::Post;
use super::profile::Profile;

/// User account exposed via GraphQL
pub struct User {
    inner: DbUser,
}

impl User {
    /// Create a new GraphQL User from a database User
    pub fn new(user: DbUser) -> Self {
        Self { inner: user }
    }
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self::new(user)
    }
}

#[Object]
impl User {
    /// Unique user identifier
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Display name
    async fn name(&self) -> &str {
        &self.inner.name
    }

    /// Account balance
    async fn balance(&self) -> f64 {
        self.inner.balance
    }

    // Relationship resolvers

    /// The user's profile, if one was created
    async fn profile(&self, ctx: &Context<'_>) -> Result<Option<Profile>> {
        let profile = request_context(ctx)?
            .loaders()
            .profile_by_user_id
            .load(self.inner.id)
            .await
            .map_err(to_graphql_error)?;
        Ok((*profile).clone().map(Profile::from))
    }

    /// Posts written by this user
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let posts = request_context(ctx)?
            .loaders()
            .posts_by_author_id
            .load(self.inner.id)
            .await
            .map_err(to_graphql_error)?;
        Ok(posts.iter().cloned().map(Post::from).collect())
    }

    /// Authors this user is subscribed to
    async fn user_subscribed_to(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let authors = request_context(ctx)?
            .loaders()
            .users_by_subscriber_id
            .load(self.inner.id)
            .await
            .map_err(to_graphql_error)?;
        Ok(authors.iter().cloned().map(User::from).collect())
    }

    /// Users subscribed to this user
    async fn subscribed_to_user(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let subscribers = request_context(ctx)?
            .loaders()
            .users_by_author_id
            .load(self.inner.id)
            .await
            .map_err(to_graphql_error)?;
        Ok(subscribers.iter().cloned().map(User::from).collect())
    }
}
