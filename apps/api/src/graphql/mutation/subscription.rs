//! Subscription edge mutations for Circle GraphQL API
//!
//! An edge `(userId, authorId)` means `userId` follows `authorId`. It shows
//! up in the follower's `userSubscribedTo` and in the author's
//! `subscribedToUser`.

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::error::to_graphql_error;
use crate::graphql::context::request_context;
use crate::models::Subscription;

/// Subscription edge mutations
#[derive(Default)]
pub struct SubscriptionMutation;

#[Object]
impl SubscriptionMutation {
    /// Subscribe `userId` to `authorId`
    async fn subscribe_to(&self, ctx: &Context<'_>, user_id: Uuid, author_id: Uuid) -> Result<String> {
        let edge = Subscription {
            subscriber_id: user_id,
            author_id,
        };
        request_context(ctx)?
            .store()
            .create_subscription(edge)
            .await
            .map_err(to_graphql_error)?;

        tracing::debug!(subscriber_id = %user_id, author_id = %author_id, "Subscription created");
        Ok("Subscribed successfully".to_string())
    }

    /// Remove the edge from `userId` to `authorId`
    async fn unsubscribe_from(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        author_id: Uuid,
    ) -> Result<String> {
        let edge = Subscription {
            subscriber_id: user_id,
            author_id,
        };
        request_context(ctx)?
            .store()
            .delete_subscription(edge)
            .await
            .map_err(to_graphql_error)?;
        Ok("Unsubscribed successfully".to_string())
    }
}
