//! GraphQL mutations for Circle
//!
//! This module contains all mutation resolvers, organized by entity.

mod post;
mod profile;
mod subscription;
mod user;

pub use post::{ChangePostInput, CreatePostInput, PostMutation};
pub use profile::{ChangeProfileInput, CreateProfileInput, ProfileMutation};
pub use subscription::SubscriptionMutation;
pub use user::{ChangeUserInput, CreateUserInput, UserMutation};

use async_graphql::MergedObject;

/// Root mutation type combining all mutation domains
#[derive(MergedObject, Default)]
pub struct Mutation(UserMutation, ProfileMutation, PostMutation, SubscriptionMutation);
