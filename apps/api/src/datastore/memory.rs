//! In-memory datastore
//!
//! Mirrors the PostgreSQL schema's constraints (unique profile per user,
//! foreign keys, cascading user deletes) so behavior observed through the API
//! is the same for both backends. Every operation is counted, and individual
//! operations can be switched to fail, which lets tests assert batching and
//! error propagation without a database.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{Datastore, StoreError, StoreResult};
use crate::models::{
    LinkedUser, MemberType, MemberTypeId, NewPost, NewProfile, NewUser, Post, PostChanges,
    Profile, ProfileChanges, Subscription, User, UserChanges,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    member_types: Vec<MemberType>,
    profiles: Vec<Profile>,
    posts: Vec<Post>,
    subscriptions: Vec<Subscription>,
}

impl Tables {
    fn has_user(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn has_member_type(&self, id: MemberTypeId) -> bool {
        self.member_types.iter().any(|m| m.id == id)
    }

    fn user_by_id(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Process-local datastore with call accounting
#[derive(Debug)]
pub struct MemoryDatastore {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryDatastore {
    /// Create an empty datastore with the membership tiers seeded
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                member_types: MemberType::seed(),
                ..Tables::default()
            }),
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// How many times the named operation has been invoked
    ///
    /// Operation names match the [`Datastore`] method names.
    pub fn call_count(&self, operation: &str) -> usize {
        lock(&self.calls).get(operation).copied().unwrap_or(0)
    }

    /// Forget all recorded calls
    pub fn reset_call_counts(&self) {
        lock(&self.calls).clear();
    }

    /// Make every later call of `operation` fail with a pool timeout
    pub fn fail_operation(&self, operation: &'static str) {
        lock(&self.failing).insert(operation);
    }

    /// Undo [`MemoryDatastore::fail_operation`]
    pub fn restore_operation(&self, operation: &'static str) {
        lock(&self.failing).remove(operation);
    }

    fn enter(&self, operation: &'static str) -> StoreResult<()> {
        *lock(&self.calls).entry(operation).or_default() += 1;
        if lock(&self.failing).contains(operation) {
            tracing::debug!(operation, "Injected datastore failure");
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl Default for MemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn users(&self) -> StoreResult<Vec<User>> {
        self.enter("users")?;
        Ok(lock(&self.tables).users.clone())
    }

    async fn user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.enter("user")?;
        Ok(lock(&self.tables).user_by_id(id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.enter("create_user")?;
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            balance: user.balance,
        };
        lock(&self.tables).users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User> {
        self.enter("update_user")?;
        let mut tables = lock(&self.tables);
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        changes.apply(user);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.enter("delete_user")?;
        let mut tables = lock(&self.tables);
        if !tables.has_user(id) {
            return Err(StoreError::not_found("user", id));
        }
        tables.users.retain(|u| u.id != id);
        tables.profiles.retain(|p| p.user_id != id);
        tables.posts.retain(|p| p.author_id != id);
        tables
            .subscriptions
            .retain(|s| s.subscriber_id != id && s.author_id != id);
        Ok(())
    }

    async fn member_types(&self) -> StoreResult<Vec<MemberType>> {
        self.enter("member_types")?;
        Ok(lock(&self.tables).member_types.clone())
    }

    async fn member_type(&self, id: MemberTypeId) -> StoreResult<Option<MemberType>> {
        self.enter("member_type")?;
        Ok(lock(&self.tables)
            .member_types
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>> {
        self.enter("member_types_by_ids")?;
        Ok(lock(&self.tables)
            .member_types
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn profiles(&self) -> StoreResult<Vec<Profile>> {
        self.enter("profiles")?;
        Ok(lock(&self.tables).profiles.clone())
    }

    async fn profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        self.enter("profile")?;
        Ok(lock(&self.tables)
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        self.enter("profiles_by_user_ids")?;
        Ok(lock(&self.tables)
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile> {
        self.enter("create_profile")?;
        let mut tables = lock(&self.tables);
        if !tables.has_user(profile.user_id) {
            return Err(StoreError::foreign_key("profile", "user", profile.user_id));
        }
        if !tables.has_member_type(profile.member_type_id) {
            return Err(StoreError::foreign_key(
                "profile",
                "member type",
                profile.member_type_id,
            ));
        }
        if tables.profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(StoreError::conflict("profile", profile.user_id));
        }
        let profile = Profile {
            id: Uuid::new_v4(),
            is_male: profile.is_male,
            year_of_birth: profile.year_of_birth,
            user_id: profile.user_id,
            member_type_id: profile.member_type_id,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> StoreResult<Profile> {
        self.enter("update_profile")?;
        let mut tables = lock(&self.tables);
        if let Some(member_type_id) = changes.member_type_id {
            if !tables.has_member_type(member_type_id) {
                return Err(StoreError::foreign_key("profile", "member type", member_type_id));
            }
        }
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("profile", id))?;
        changes.apply(profile);
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()> {
        self.enter("delete_profile")?;
        let mut tables = lock(&self.tables);
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.id != id);
        if tables.profiles.len() == before {
            return Err(StoreError::not_found("profile", id));
        }
        Ok(())
    }

    async fn posts(&self) -> StoreResult<Vec<Post>> {
        self.enter("posts")?;
        Ok(lock(&self.tables).posts.clone())
    }

    async fn post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        self.enter("post")?;
        Ok(lock(&self.tables).posts.iter().find(|p| p.id == id).cloned())
    }

    async fn posts_by_author_ids(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        self.enter("posts_by_author_ids")?;
        Ok(lock(&self.tables)
            .posts
            .iter()
            .filter(|p| author_ids.contains(&p.author_id))
            .cloned()
            .collect())
    }

    async fn create_post(&self, post: NewPost) -> StoreResult<Post> {
        self.enter("create_post")?;
        let mut tables = lock(&self.tables);
        if !tables.has_user(post.author_id) {
            return Err(StoreError::foreign_key("post", "author", post.author_id));
        }
        let post = Post {
            id: Uuid::new_v4(),
            title: post.title,
            content: post.content,
            author_id: post.author_id,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, changes: PostChanges) -> StoreResult<Post> {
        self.enter("update_post")?;
        let mut tables = lock(&self.tables);
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("post", id))?;
        changes.apply(post);
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        self.enter("delete_post")?;
        let mut tables = lock(&self.tables);
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(StoreError::not_found("post", id));
        }
        Ok(())
    }

    async fn create_subscription(&self, edge: Subscription) -> StoreResult<()> {
        self.enter("create_subscription")?;
        let mut tables = lock(&self.tables);
        let key = format!("{} -> {}", edge.subscriber_id, edge.author_id);
        if !tables.has_user(edge.subscriber_id) {
            return Err(StoreError::foreign_key("subscription", "subscriber", key));
        }
        if !tables.has_user(edge.author_id) {
            return Err(StoreError::foreign_key("subscription", "author", key));
        }
        if tables.subscriptions.contains(&edge) {
            return Err(StoreError::conflict("subscription", key));
        }
        tables.subscriptions.push(edge);
        Ok(())
    }

    async fn delete_subscription(&self, edge: Subscription) -> StoreResult<()> {
        self.enter("delete_subscription")?;
        let mut tables = lock(&self.tables);
        let before = tables.subscriptions.len();
        tables.subscriptions.retain(|s| *s != edge);
        if tables.subscriptions.len() == before {
            return Err(StoreError::not_found(
                "subscription",
                format!("{} -> {}", edge.subscriber_id, edge.author_id),
            ));
        }
        Ok(())
    }

    async fn authors_by_subscriber_ids(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<LinkedUser>> {
        self.enter("authors_by_subscriber_ids")?;
        let tables = lock(&self.tables);
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| subscriber_ids.contains(&s.subscriber_id))
            .filter_map(|s| {
                tables.user_by_id(s.author_id).map(|author| LinkedUser {
                    link_id: s.subscriber_id,
                    user: author.clone(),
                })
            })
            .collect())
    }

    async fn subscribers_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> StoreResult<Vec<LinkedUser>> {
        self.enter("subscribers_by_author_ids")?;
        let tables = lock(&self.tables);
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| author_ids.contains(&s.author_id))
            .filter_map(|s| {
                tables.user_by_id(s.subscriber_id).map(|subscriber| LinkedUser {
                    link_id: s.author_id,
                    user: subscriber.clone(),
                })
            })
            .collect())
    }
}
