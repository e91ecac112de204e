//! Users-by-Subscriber loader
//!
//! Resolves `User.userSubscribedTo`: for each subscriber id, the authors that
//! user follows. One `authors_by_subscriber_ids` call covers the batch.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::BatchFn;
use crate::datastore::{Datastore, StoreError};
use crate::models::User;

/// Bulk fetch for `User.userSubscribedTo`
#[derive(Clone)]
pub struct UsersBySubscriberIdLoader {
    store: Arc<dyn Datastore>,
}

impl UsersBySubscriberIdLoader {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }
}

impl BatchFn<Uuid> for UsersBySubscriberIdLoader {
    type Value = Vec<User>;
    type Error = StoreError;

    const RELATION: &'static str = "usersBySubscriberId";

    async fn load(&self, keys: &[Uuid]) -> Result<Vec<Self::Value>, Self::Error> {
        let edges = self.store.authors_by_subscriber_ids(keys).await?;

        let mut authors: HashMap<Uuid, Vec<User>> = HashMap::new();
        for edge in edges {
            authors.entry(edge.link_id).or_default().push(edge.user);
        }

        Ok(keys
            .iter()
            .map(|id| authors.remove(id).unwrap_or_default())
            .collect())
    }
}
