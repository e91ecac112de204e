//! Database models for Circle
//!
//! Row types mirror the PostgreSQL tables one-to-one and double as the
//! values held by the in-memory datastore and the request-scoped loaders.

pub mod member_type;
pub mod post;
pub mod profile;
pub mod user;

pub use member_type::{MemberType, MemberTypeId};
pub use post::{NewPost, Post, PostChanges};
pub use profile::{NewProfile, Profile, ProfileChanges};
pub use user::{LinkedUser, NewUser, Subscription, User, UserChanges};
