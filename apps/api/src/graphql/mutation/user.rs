//! User mutations for Circle GraphQL API
//!
//! - createUser: Register a new user
//! - changeUser: Update name and/or balance
//! - deleteUser: Remove a user together with everything they own

use async_graphql::{Context, InputObject, Object, Result};
use uuid::Uuid;

use crate::error::to_graphql_error;
use crate::graphql::context::request_context;
use crate::graphql::types::User;
use crate::models::{NewUser, UserChanges};

/// Input for creating a user
#[derive(Debug, Clone, InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub balance: f64,
}

impl From<CreateUserInput> for NewUser {
    fn from(input: CreateUserInput) -> Self {
        Self {
            name: input.name,
            balance: input.balance,
        }
    }
}

/// Input for changing a user; omitted fields keep their value
#[derive(Debug, Clone, Default, InputObject)]
pub struct ChangeUserInput {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

impl From<ChangeUserInput> for UserChanges {
    fn from(input: ChangeUserInput) -> Self {
        Self {
            name: input.name,
            balance: input.balance,
        }
    }
}

/// User mutations
#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Create a new user
    async fn create_user(&self, ctx: &Context<'_>, dto: CreateUserInput) -> Result<User> {
        let user = request_context(ctx)?
            .store()
            .create_user(dto.into())
            .await
            .map_err(to_graphql_error)?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(User::from(user))
    }

    /// Change an existing user
    async fn change_user(&self, ctx: &Context<'_>, id: Uuid, dto: ChangeUserInput) -> Result<User> {
        let user = request_context(ctx)?
            .store()
            .update_user(id, dto.into())
            .await
            .map_err(to_graphql_error)?;
        Ok(User::from(user))
    }

    /// Delete a user
    ///
    /// The user's profile, posts, and subscription edges go with it.
    async fn delete_user(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        request_context(ctx)?
            .store()
            .delete_user(id)
            .await
            .map_err(to_graphql_error)?;

        tracing::info!(user_id = %id, "User deleted");
        Ok("User deleted successfully".to_string())
    }
}
