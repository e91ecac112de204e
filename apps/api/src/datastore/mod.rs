//! Datastore collaborator for Circle
//!
//! The GraphQL layer never talks SQL directly. It consumes the [`Datastore`]
//! trait, whose operations are restricted to primary-key / foreign-key
//! equality and set membership: point lookup, bulk lookup by key set,
//! create, update and delete.
//!
//! Two implementations ship with the crate:
//! - [`PgDatastore`]: PostgreSQL through `sqlx`
//! - [`MemoryDatastore`]: in-process tables with the same constraints, used
//!   for local runs and as the test collaborator

mod memory;
mod postgres;

pub use memory::MemoryDatastore;
pub use postgres::PgDatastore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    LinkedUser, MemberType, MemberTypeId, NewPost, NewProfile, NewUser, Post, PostChanges,
    Profile, ProfileChanges, Subscription, User, UserChanges,
};

/// Errors surfaced by a datastore implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row matched the primary key of an update or delete
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A unique constraint rejected the write
    #[error("{entity} already exists: {key}")]
    Conflict { entity: &'static str, key: String },

    /// A foreign key pointed at a missing row
    #[error("{entity} references a missing {target}: {id}")]
    ForeignKey {
        entity: &'static str,
        target: &'static str,
        id: String,
    },

    /// Driver, connection or timeout failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, key: impl ToString) -> Self {
        Self::Conflict {
            entity,
            key: key.to_string(),
        }
    }

    pub fn foreign_key(entity: &'static str, target: &'static str, id: impl ToString) -> Self {
        Self::ForeignKey {
            entity,
            target,
            id: id.to_string(),
        }
    }
}

/// Result type for datastore operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage capability consumed by resolvers and loaders
///
/// Deleting a user cascades to the user's profile, posts and every
/// subscription edge touching the user.
#[async_trait]
pub trait Datastore: Send + Sync {
    // Users
    async fn users(&self) -> StoreResult<Vec<User>>;
    async fn user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    // Membership tiers (read-only reference data)
    async fn member_types(&self) -> StoreResult<Vec<MemberType>>;
    async fn member_type(&self, id: MemberTypeId) -> StoreResult<Option<MemberType>>;
    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>>;

    // Profiles
    async fn profiles(&self) -> StoreResult<Vec<Profile>>;
    async fn profile(&self, id: Uuid) -> StoreResult<Option<Profile>>;
    async fn profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>>;
    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> StoreResult<Profile>;
    async fn delete_profile(&self, id: Uuid) -> StoreResult<()>;

    // Posts
    async fn posts(&self) -> StoreResult<Vec<Post>>;
    async fn post(&self, id: Uuid) -> StoreResult<Option<Post>>;
    async fn posts_by_author_ids(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>>;
    async fn create_post(&self, post: NewPost) -> StoreResult<Post>;
    async fn update_post(&self, id: Uuid, changes: PostChanges) -> StoreResult<Post>;
    async fn delete_post(&self, id: Uuid) -> StoreResult<()>;

    // Subscription edges
    async fn create_subscription(&self, edge: Subscription) -> StoreResult<()>;
    async fn delete_subscription(&self, edge: Subscription) -> StoreResult<()>;
    /// Authors followed by each subscriber; `link_id` is the subscriber
    async fn authors_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<LinkedUser>>;
    /// Followers of each author; `link_id` is the author
    async fn subscribers_by_author_ids(&self, author_ids: &[Uuid])
        -> StoreResult<Vec<LinkedUser>>;
}
