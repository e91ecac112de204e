//! Post GraphQL type

use async_graphql::Object;
use uuid::Uuid;

use crate::models::Post as DbPost;

/// Post exposed via GraphQL
pub struct Post {
    inner: DbPost,
}

impl From<DbPost> for Post {
    fn from(post: DbPost) -> Self {
        Self { inner: post }
    }
}

#[Object]
impl Post {
    /// Unique post identifier
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    async fn title(&self) -> &str {
        &self.inner.title
    }

    async fn content(&self) -> &str {
        &self.inner.content
    }

    /// Author's user ID
    async fn author_id(&self) -> Uuid {
        self.inner.author_id
    }
}
