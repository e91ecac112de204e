//! Users-by-Author loader
//!
//! Resolves `User.subscribedToUser`: for each author id, the users that
//! follow that author. Mirror image of the subscriber loader.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::BatchFn;
use crate::datastore::{Datastore, StoreError};
use crate::models::User;

/// Bulk fetch for `User.subscribedToUser`
#[derive(Clone)]
pub struct UsersByAuthorIdLoader {
    store: Arc<dyn Datastore>,
}

impl UsersByAuthorIdLoader {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }
}

impl BatchFn<Uuid> for UsersByAuthorIdLoader {
    type Value = Vec<User>;
    type Error = StoreError;

    const RELATION: &'static str = "usersByAuthorId";

    async fn load(&self, keys: &[Uuid]) -> Result<Vec<Self::Value>, Self::Error> {
        let edges = self.store.subscribers_by_author_ids(keys).await?;

        let mut subscribers: HashMap<Uuid, Vec<User>> = HashMap::new();
        for edge in edges {
            subscribers.entry(edge.link_id).or_default().push(edge.user);
        }

        Ok(keys
            .iter()
            .map(|id| subscribers.remove(id).unwrap_or_default())
            .collect())
    }
}
