//! Post mutations for Circle GraphQL API

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::error::to_graphql_error;
use crate::graphql::context::request_context;
use crate::graphql::types::Post;
use crate::models::{NewPost, PostChanges};

/// Input for creating a post
#[derive(Debug, Clone, InputObject)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

impl From<CreatePostInput> for NewPost {
    fn from(input: CreatePostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            author_id: input.author_id,
        }
    }
}

/// Input for changing a post
#[derive(Debug, Clone, Default, InputObject)]
pub struct ChangePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<ChangePostInput> for PostChanges {
    fn from(input: ChangePostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
        }
    }
}

/// Post mutations
#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    /// Publish a new post
    async fn create_post(&self, ctx: &Context<'_>, dto: CreatePostInput) -> Result<Post> {
        let post = request_context(ctx)?
            .store()
            .create_post(dto.into())
            .await
            .map_err(to_graphql_error)?;

        tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post created");
        Ok(Post::from(post))
    }

    /// Change an existing post
    async fn change_post(&self, ctx: &Context<'_>, id: Uuid, dto: ChangePostInput) -> Result<Post> {
        let post = request_context(ctx)?
            .store()
            .update_post(id, dto.into())
            .await
            .map_err(to_graphql_error)?;
        Ok(Post::from(post))
    }

    /// Delete a post
    async fn delete_post(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        request_context(ctx)?
            .store()
            .delete_post(id)
            .await
            .map_err(to_graphql_error)?;
        Ok("Post deleted successfully".to_string())
    }
}
