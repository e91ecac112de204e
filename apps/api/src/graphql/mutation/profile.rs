//! Profile mutations for Circle GraphQL API

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::error::to_graphql_error;
use crate::graphql::context::request_context;
use crate::graphql::types::{MemberTypeId, Profile};
use crate::models::{NewProfile, ProfileChanges};

/// Input for creating a profile
#[derive(Debug, Clone, InputObject)]
pub struct CreateProfileInput {
    pub is_male: bool,
    pub year_of_birth: i32,
    /// Owning user; a user can have at most one profile
    pub user_id: Uuid,
    pub member_type_id: MemberTypeId,
}

impl From<CreateProfileInput> for NewProfile {
    fn from(input: CreateProfileInput) -> Self {
        Self {
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            user_id: input.user_id,
            member_type_id: input.member_type_id.into(),
        }
    }
}

/// Input for changing a profile
#[derive(Debug, Clone, Default, InputObject)]
pub struct ChangeProfileInput {
    pub is_male: Option<bool>,
    pub year_of_birth: Option<i32>,
    pub member_type_id: Option<MemberTypeId>,
}

impl From<ChangeProfileInput> for ProfileChanges {
    fn from(input: ChangeProfileInput) -> Self {
        Self {
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            member_type_id: input.member_type_id.map(Into::into),
        }
    }
}

/// Profile mutations
#[derive(Default)]
pub struct ProfileMutation;

#[Object]
impl ProfileMutation {
    /// Create a profile for an existing user
    async fn create_profile(&self, ctx: &Context<'_>, dto: CreateProfileInput) -> Result<Profile> {
        let profile = request_context(ctx)?
            .store()
            .create_profile(dto.into())
            .await
            .map_err(to_graphql_error)?;

        tracing::info!(profile_id = %profile.id, user_id = %profile.user_id, "Profile created");
        Ok(Profile::from(profile))
    }

    /// Change an existing profile
    async fn change_profile(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        dto: ChangeProfileInput,
    ) -> Result<Profile> {
        let profile = request_context(ctx)?
            .store()
            .update_profile(id, dto.into())
            .await
            .map_err(to_graphql_error)?;
        Ok(Profile::from(profile))
    }

    /// Delete a profile
    async fn delete_profile(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        request_context(ctx)?
            .store()
            .delete_profile(id)
            .await
            .map_err(to_graphql_error)?;
        Ok("Profile deleted successfully".to_string())
    }
}
