//! Profile GraphQL type

use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::error::{to_graphql_error, ApiError};
use crate::graphql::context::request_context;
use crate::models::Profile as DbProfile;

use super::member_type::{MemberType, MemberTypeId};

/// Profile exposed via GraphQL
pub struct Profile {
    inner: DbProfile,
}

impl From<DbProfile> for Profile {
    fn from(profile: DbProfile) -> Self {
        Self { inner: profile }
    }
}

#[Object]
impl Profile {
    /// Unique profile identifier
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    async fn is_male(&self) -> bool {
        self.inner.is_male
    }

    async fn year_of_birth(&self) -> i32 {
        self.inner.year_of_birth
    }

    /// Owning user's ID
    async fn user_id(&self) -> Uuid {
        self.inner.user_id
    }

    async fn member_type_id(&self) -> MemberTypeId {
        self.inner.member_type_id.into()
    }

    /// Membership tier (uses the member type loader for batched fetching)
    async fn member_type(&self, ctx: &Context<'_>) -> Result<MemberType> {
        let member_type = request_context(ctx)?
            .loaders()
            .member_type_by_id
            .load(self.inner.member_type_id)
            .await
            .map_err(to_graphql_error)?;

        // The foreign key guarantees the tier exists
        (*member_type)
            .clone()
            .map(MemberType::from)
            .ok_or_else(|| {
                to_graphql_error(ApiError::not_found(
                    "member type",
                    self.inner.member_type_id.to_string(),
                ))
            })
    }
}
