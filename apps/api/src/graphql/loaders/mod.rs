//! Batched relation loading for GraphQL
//!
//! Every relational field on the schema resolves through exactly one loader
//! in this module, never through the raw datastore. Combined with the
//! round-based batching in [`BatchLoader`], N sibling entities asking for the
//! same relation cost at most one datastore call per resolution round.
//!
//! There are two shapes of loader:
//! - Single-entity loaders: `Option<T>` per key (profile, member type)
//! - Collection loaders: `Vec<T>` per key, empty when nothing matches
//!   (posts, subscription edges in both directions)

mod batch;
mod member_type;
mod posts_by_author;
mod profile_by_user;
mod users_by_author;
mod users_by_subscriber;

pub use batch::{BatchError, BatchFn, BatchLoader};
pub use member_type::MemberTypeByIdLoader;
pub use posts_by_author::PostsByAuthorIdLoader;
pub use profile_by_user::ProfileByUserIdLoader;
pub use users_by_author::UsersByAuthorIdLoader;
pub use users_by_subscriber::UsersBySubscriberIdLoader;

use std::sync::Arc;

use uuid::Uuid;

use crate::datastore::Datastore;
use crate::models::MemberTypeId;

/// The per-request loader registry
///
/// A fresh registry is built for every incoming operation, so cached results
/// never leak between requests and no locking is needed across them.
pub struct Loaders {
    pub profile_by_user_id: BatchLoader<Uuid, ProfileByUserIdLoader>,
    pub posts_by_author_id: BatchLoader<Uuid, PostsByAuthorIdLoader>,
    pub member_type_by_id: BatchLoader<MemberTypeId, MemberTypeByIdLoader>,
    pub users_by_subscriber_id: BatchLoader<Uuid, UsersBySubscriberIdLoader>,
    pub users_by_author_id: BatchLoader<Uuid, UsersByAuthorIdLoader>,
}

impl Loaders {
    /// Create all loaders, each wired to the datastore's bulk lookups
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            profile_by_user_id: BatchLoader::new(ProfileByUserIdLoader::new(store.clone())),
            posts_by_author_id: BatchLoader::new(PostsByAuthorIdLoader::new(store.clone())),
            member_type_by_id: BatchLoader::new(MemberTypeByIdLoader::new(store.clone())),
            users_by_subscriber_id: BatchLoader::new(UsersBySubscriberIdLoader::new(
                store.clone(),
            )),
            users_by_author_id: BatchLoader::new(UsersByAuthorIdLoader::new(store)),
        }
    }
}
