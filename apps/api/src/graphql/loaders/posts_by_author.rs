//! Posts-by-Author loader
//!
//! Batches post lookups for many users into one `posts_by_author_ids` call,
//! returning every post per author. Authors without posts get an empty list.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::BatchFn;
use crate::datastore::{Datastore, StoreError};
use crate::models::Post;

/// Bulk fetch for `User.posts`
#[derive(Clone)]
pub struct PostsByAuthorIdLoader {
    store: Arc<dyn Datastore>,
}

impl PostsByAuthorIdLoader {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }
}

impl BatchFn<Uuid> for PostsByAuthorIdLoader {
    type Value = Vec<Post>;
    type Error = StoreError;

    const RELATION: &'static str = "postsByAuthorId";

    async fn load(&self, keys: &[Uuid]) -> Result<Vec<Self::Value>, Self::Error> {
        let posts = self.store.posts_by_author_ids(keys).await?;

        // Group posts by author_id
        let mut by_author: HashMap<Uuid, Vec<Post>> = HashMap::new();
        for post in posts {
            by_author.entry(post.author_id).or_default().push(post);
        }

        Ok(keys
            .iter()
            .map(|id| by_author.remove(id).unwrap_or_default())
            .collect())
    }
}
