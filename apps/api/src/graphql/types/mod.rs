//! GraphQL type definitions for Circle
//!
//! Scalar fields resolve straight from the wrapped database row. Relational
//! fields go through the request's loader registry, one loader per field.

mod member_type;
mod post;
mod profile;
mod user;

pub use member_type::{MemberType, MemberTypeId};
pub use post::Post;
pub use profile::Profile;
pub use user::User;
