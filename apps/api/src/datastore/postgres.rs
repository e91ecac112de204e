//! PostgreSQL datastore
//!
//! Every bulk lookup is a single `= ANY($1)` query, so a loader batch costs
//! exactly one round trip regardless of how many keys it carries.

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Datastore, StoreError, StoreResult};
use crate::models::{
    LinkedUser, MemberType, MemberTypeId, NewPost, NewProfile, NewUser, Post, PostChanges,
    Profile, ProfileChanges, Subscription, User, UserChanges,
};

const USER_COLUMNS: &str = "id, name, balance";
const PROFILE_COLUMNS: &str = "id, is_male, year_of_birth, user_id, member_type_id";
const POST_COLUMNS: &str = "id, title, content, author_id";
const MEMBER_TYPE_COLUMNS: &str = "id, discount, posts_limit_per_month";

/// Datastore backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgDatastore {
    pool: PgPool,
}

impl PgDatastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into typed store errors
fn classify(entity: &'static str, key: impl ToString, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.kind() {
            ErrorKind::UniqueViolation => return StoreError::conflict(entity, key.to_string()),
            ErrorKind::ForeignKeyViolation => {
                let target = referenced_entity(db_err.constraint().unwrap_or_default());
                return StoreError::foreign_key(entity, target, key.to_string());
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

/// Name the referenced table from PostgreSQL's default `<table>_<column>_fkey`
fn referenced_entity(constraint: &str) -> &'static str {
    if constraint.contains("member_type") {
        "member type"
    } else if constraint.contains("subscriber") {
        "subscriber"
    } else if constraint.contains("author") {
        "author"
    } else {
        "user"
    }
}

#[async_trait]
impl Datastore for PgDatastore {
    async fn users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (name, balance) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(user.balance)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify("user", &user.name, e))
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                balance = COALESCE($3, balance)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.balance)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        // Profile, posts and subscription edges go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user", id));
        }
        Ok(())
    }

    async fn member_types(&self) -> StoreResult<Vec<MemberType>> {
        let sql = format!("SELECT {} FROM member_types ORDER BY id", MEMBER_TYPE_COLUMNS);
        Ok(sqlx::query_as::<_, MemberType>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn member_type(&self, id: MemberTypeId) -> StoreResult<Option<MemberType>> {
        let sql = format!("SELECT {} FROM member_types WHERE id = $1", MEMBER_TYPE_COLUMNS);
        Ok(sqlx::query_as::<_, MemberType>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>> {
        let labels: Vec<&str> = ids.iter().map(MemberTypeId::as_str).collect();
        let sql = format!(
            "SELECT {} FROM member_types WHERE id::text = ANY($1)",
            MEMBER_TYPE_COLUMNS
        );
        Ok(sqlx::query_as::<_, MemberType>(&sql)
            .bind(labels)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn profiles(&self) -> StoreResult<Vec<Profile>> {
        let sql = format!("SELECT {} FROM profiles", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn profiles_by_user_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        let sql = format!(
            "SELECT {} FROM profiles WHERE user_id = ANY($1)",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile> {
        let sql = format!(
            r#"
            INSERT INTO profiles (is_male, year_of_birth, user_id, member_type_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(profile.is_male)
            .bind(profile.year_of_birth)
            .bind(profile.user_id)
            .bind(profile.member_type_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify("profile", profile.user_id, e))
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> StoreResult<Profile> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET is_male = COALESCE($2, is_male),
                year_of_birth = COALESCE($3, year_of_birth),
                member_type_id = COALESCE($4, member_type_id)
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(changes.is_male)
            .bind(changes.year_of_birth)
            .bind(changes.member_type_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("profile", id, e))?
            .ok_or_else(|| StoreError::not_found("profile", id))
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("profile", id));
        }
        Ok(())
    }

    async fn posts(&self) -> StoreResult<Vec<Post>> {
        let sql = format!("SELECT {} FROM posts", POST_COLUMNS);
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn posts_by_author_ids(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        let sql = format!("SELECT {} FROM posts WHERE author_id = ANY($1)", POST_COLUMNS);
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(author_ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_post(&self, post: NewPost) -> StoreResult<Post> {
        let sql = format!(
            "INSERT INTO posts (title, content, author_id) VALUES ($1, $2, $3) RETURNING {}",
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify("post", post.author_id, e))
    }

    async fn update_post(&self, id: Uuid, changes: PostChanges) -> StoreResult<Post> {
        let sql = format!(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content)
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.content)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("post", id))
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("post", id));
        }
        Ok(())
    }

    async fn create_subscription(&self, edge: Subscription) -> StoreResult<()> {
        let key = format!("{} -> {}", edge.subscriber_id, edge.author_id);
        sqlx::query("INSERT INTO subscriptions (subscriber_id, author_id) VALUES ($1, $2)")
            .bind(edge.subscriber_id)
            .bind(edge.author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("subscription", key, e))?;
        Ok(())
    }

    async fn delete_subscription(&self, edge: Subscription) -> StoreResult<()> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND author_id = $2")
                .bind(edge.subscriber_id)
                .bind(edge.author_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
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
        Ok(sqlx::query_as::<_, LinkedUser>(
            r#"
            SELECT s.subscriber_id AS link_id, u.id, u.name, u.balance
            FROM subscriptions s
            JOIN users u ON u.id = s.author_id
            WHERE s.subscriber_id = ANY($1)
            "#,
        )
        .bind(subscriber_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn subscribers_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> StoreResult<Vec<LinkedUser>> {
        Ok(sqlx::query_as::<_, LinkedUser>(
            r#"
            SELECT s.author_id AS link_id, u.id, u.name, u.balance
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.author_id = ANY($1)
            "#,
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?)
    }
}
